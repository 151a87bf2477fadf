use credit_approval::lending::{
    Customer, CustomerId, CustomerRepository, Loan, LoanId, LoanRepository, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Unavailable("repository mutex poisoned".to_string())
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCustomerRepository {
    records: Arc<Mutex<HashMap<CustomerId, Customer>>>,
}

impl CustomerRepository for InMemoryCustomerRepository {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        let phone_taken = guard
            .values()
            .any(|existing| existing.phone_number == customer.phone_number);
        if phone_taken || guard.contains_key(&customer.customer_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(customer.customer_id, customer.clone());
        Ok(customer)
    }

    fn update(&self, customer: Customer) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        match guard.get_mut(&customer.customer_id) {
            Some(existing) => {
                *existing = customer;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    fn find_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard
            .values()
            .find(|customer| customer.phone_number == phone_number)
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLoanRepository {
    records: Arc<Mutex<HashMap<LoanId, Loan>>>,
}

impl LoanRepository for InMemoryLoanRepository {
    fn insert(&self, loan: Loan) -> Result<Loan, RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&loan.loan_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(loan.loan_id, loan.clone());
        Ok(loan)
    }

    fn fetch(&self, id: LoanId) -> Result<Option<Loan>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    fn for_customer(&self, customer_id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        let mut loans: Vec<Loan> = guard
            .values()
            .filter(|loan| loan.customer_id == customer_id)
            .cloned()
            .collect();
        loans.sort_by_key(|loan| loan.loan_id);
        Ok(loans)
    }
}
