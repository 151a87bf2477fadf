use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::LendingConfig;
use crate::lending::domain::{
    Customer, CustomerId, CustomerProfile, CustomerRegistration, ExistingLoan, Loan,
    LoanApplication, LoanId, LoanRequest,
};
use crate::lending::repository::{CustomerRepository, LoanRepository, RepositoryError};
use crate::lending::{lending_router, LendingService};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn profile(approved_limit: f64, current_debt: f64, monthly_salary: f64) -> CustomerProfile {
    CustomerProfile {
        approved_limit,
        current_debt,
        monthly_salary,
    }
}

/// Healthy applicant with no history: 1.8M limit, no debt, 50k salary.
pub(super) fn prime_profile() -> CustomerProfile {
    profile(1_800_000.0, 0.0, 50_000.0)
}

pub(super) fn request(loan_amount: f64, interest_rate: f64, tenure: i32) -> LoanRequest {
    LoanRequest {
        loan_amount,
        interest_rate,
        tenure,
    }
}

pub(super) fn existing_loan(
    loan_amount: f64,
    monthly_payment: f64,
    tenure: u32,
    emis_paid_on_time: u32,
    start_date: NaiveDate,
) -> ExistingLoan {
    ExistingLoan {
        loan_amount,
        monthly_payment,
        tenure,
        emis_paid_on_time,
        start_date,
    }
}

pub(super) fn registration(phone_number: &str, monthly_salary: f64) -> CustomerRegistration {
    CustomerRegistration {
        first_name: "Aaron".to_string(),
        last_name: "Garcia".to_string(),
        age: 30,
        phone_number: phone_number.to_string(),
        monthly_salary,
    }
}

pub(super) fn application(
    customer_id: CustomerId,
    loan_amount: f64,
    interest_rate: f64,
    tenure: i32,
) -> LoanApplication {
    LoanApplication {
        customer_id: customer_id.0,
        loan_amount,
        interest_rate,
        tenure,
        today: Some(today()),
    }
}

pub(super) fn booked_loan(
    loan_id: u64,
    customer_id: CustomerId,
    tenure: u32,
    emis_paid_on_time: u32,
) -> Loan {
    Loan {
        loan_id: LoanId(loan_id),
        customer_id,
        loan_amount: 100_000.0,
        tenure,
        interest_rate: 12.0,
        monthly_payment: 8_000.0,
        emis_paid_on_time,
        start_date: date(2024, 1, 1),
        end_date: date(2025, 1, 1),
    }
}

pub(super) type TestService = LendingService<MemoryCustomers, MemoryLoans>;

pub(super) fn build_service() -> (TestService, Arc<MemoryCustomers>, Arc<MemoryLoans>) {
    let customers = Arc::new(MemoryCustomers::default());
    let loans = Arc::new(MemoryLoans::default());
    let service = LendingService::new(customers.clone(), loans.clone(), &LendingConfig::default());
    (service, customers, loans)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    lending_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryCustomers {
    pub(super) records: Arc<Mutex<HashMap<CustomerId, Customer>>>,
}

impl CustomerRepository for MemoryCustomers {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
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
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(customer.customer_id, customer);
        Ok(())
    }

    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn find_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|customer| customer.phone_number == phone_number)
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryLoans {
    pub(super) records: Arc<Mutex<HashMap<LoanId, Loan>>>,
}

impl LoanRepository for MemoryLoans {
    fn insert(&self, loan: Loan) -> Result<Loan, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&loan.loan_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(loan.loan_id, loan.clone());
        Ok(loan)
    }

    fn fetch(&self, id: LoanId) -> Result<Option<Loan>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn for_customer(&self, customer_id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut loans: Vec<Loan> = guard
            .values()
            .filter(|loan| loan.customer_id == customer_id)
            .cloned()
            .collect();
        loans.sort_by_key(|loan| loan.loan_id);
        Ok(loans)
    }
}

pub(super) struct UnavailableCustomers;

impl CustomerRepository for UnavailableCustomers {
    fn insert(&self, _customer: Customer) -> Result<Customer, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _customer: Customer) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_phone(&self, _phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Registry that accepts new customers but cannot persist changes to them.
#[derive(Default)]
pub(super) struct ReadOnlyCustomers {
    pub(super) inner: MemoryCustomers,
}

impl CustomerRepository for ReadOnlyCustomers {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        self.inner.insert(customer)
    }

    fn update(&self, _customer: Customer) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("registry is read-only".to_string()))
    }

    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        self.inner.find_by_phone(phone_number)
    }
}

/// Ledger that lists no loans and refuses to book new ones.
pub(super) struct ClosedLedger;

impl LoanRepository for ClosedLedger {
    fn insert(&self, _loan: Loan) -> Result<Loan, RepositoryError> {
        Err(RepositoryError::Unavailable("ledger closed".to_string()))
    }

    fn fetch(&self, _id: LoanId) -> Result<Option<Loan>, RepositoryError> {
        Ok(None)
    }

    fn for_customer(&self, _customer_id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
