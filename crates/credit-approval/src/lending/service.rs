use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use tracing::{error, info, warn};

use super::domain::{
    Customer, CustomerId, CustomerRegistration, Loan, LoanApplication, LoanId,
};
use super::eligibility::{EligibilityError, EligibilityEvaluator, EligibilityResult, PolicyConfig};
use super::repository::{
    CustomerLoanView, CustomerRepository, LoanDetailView, LoanRepository, RepositoryError,
};
use crate::config::LendingConfig;

const LIMIT_ROUNDING: f64 = 100_000.0;
const DAYS_PER_TENURE_MONTH: i64 = 30;

/// Approved limit granted at registration: salary times `multiplier`, rounded to the nearest
/// 100,000 with ties going to the even multiple.
pub fn approved_limit_for(monthly_salary: f64, multiplier: u32) -> f64 {
    (monthly_salary * f64::from(multiplier) / LIMIT_ROUNDING).round_ties_even() * LIMIT_ROUNDING
}

/// Service composing the customer registry, the loan ledger and the eligibility evaluator.
pub struct LendingService<C, L> {
    customers: Arc<C>,
    loans: Arc<L>,
    evaluator: Arc<EligibilityEvaluator>,
    limit_salary_multiplier: u32,
    customer_sequence: AtomicU64,
    loan_sequence: AtomicU64,
    customer_locks: Mutex<HashMap<CustomerId, Arc<Mutex<()>>>>,
}

impl<C, L> LendingService<C, L>
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
{
    pub fn new(customers: Arc<C>, loans: Arc<L>, config: &LendingConfig) -> Self {
        Self::with_policy(
            customers,
            loans,
            config.policy(),
            config.limit_salary_multiplier,
        )
    }

    pub fn with_policy(
        customers: Arc<C>,
        loans: Arc<L>,
        policy: PolicyConfig,
        limit_salary_multiplier: u32,
    ) -> Self {
        Self {
            customers,
            loans,
            evaluator: Arc::new(EligibilityEvaluator::new(policy)),
            limit_salary_multiplier,
            customer_sequence: AtomicU64::new(1),
            loan_sequence: AtomicU64::new(1),
            customer_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Register a customer with a salary-derived approved limit and no debt.
    pub fn register(
        &self,
        registration: CustomerRegistration,
    ) -> Result<Customer, LendingServiceError> {
        validate_registration(&registration)?;

        if self
            .customers
            .find_by_phone(&registration.phone_number)?
            .is_some()
        {
            return Err(RegistrationError::DuplicatePhone(registration.phone_number).into());
        }

        let customer = Customer {
            customer_id: CustomerId(self.customer_sequence.fetch_add(1, Ordering::Relaxed)),
            approved_limit: approved_limit_for(
                registration.monthly_salary,
                self.limit_salary_multiplier,
            ),
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            age: registration.age,
            phone_number: registration.phone_number.trim().to_string(),
            monthly_salary: registration.monthly_salary,
            current_debt: 0.0,
        };

        let stored = match self.customers.insert(customer) {
            Err(RepositoryError::Conflict) => {
                return Err(RegistrationError::DuplicatePhone(registration.phone_number).into())
            }
            other => other?,
        };

        info!(
            customer_id = %stored.customer_id,
            name = %stored.full_name(),
            approved_limit = stored.approved_limit,
            "customer registered"
        );
        Ok(stored)
    }

    /// Report the decision for a loan application without persisting anything.
    pub fn check_eligibility(
        &self,
        application: &LoanApplication,
        today: NaiveDate,
    ) -> Result<EligibilityResult, LendingServiceError> {
        let customer = self.customer(application.customer_id())?;
        let result = self.decide(&customer, application, today)?;
        Ok(result)
    }

    /// Evaluate and, when approved, book the loan and raise the customer's debt.
    ///
    /// The read-evaluate-write sequence holds the customer's lock so concurrent requests for
    /// the same customer always see each other's loans.
    pub fn create_loan(
        &self,
        application: &LoanApplication,
        today: NaiveDate,
    ) -> Result<LoanCreation, LendingServiceError> {
        let customer_id = application.customer_id();
        let lock = self.customer_lock(customer_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| RepositoryError::Unavailable("customer lock poisoned".to_string()))?;

        let mut customer = self.customer(customer_id)?;
        let decision = self.decide(&customer, application, today)?;

        if !decision.approval {
            let reason = decision
                .decline_reason
                .as_ref()
                .map(|reason| reason.summary())
                .unwrap_or_else(|| "credit constraints".to_string());
            return Ok(LoanCreation {
                loan_id: None,
                customer_id,
                loan_approved: false,
                message: format!("Loan cannot be approved: {reason}."),
                monthly_installment: decision.monthly_installment,
                decision,
            });
        }

        let tenure = u32::try_from(application.tenure)
            .map_err(|_| EligibilityError::NonPositiveTenure(application.tenure))?;
        let end_date = today
            .checked_add_signed(Duration::days(DAYS_PER_TENURE_MONTH * i64::from(tenure)))
            .ok_or(LendingServiceError::TenureOutOfRange(application.tenure))?;

        // Debt is raised before booking; a failed insert restores the previous record.
        let previous = customer.clone();
        customer.current_debt += application.loan_amount;
        self.customers.update(customer)?;

        let booked = self.loans.insert(Loan {
            loan_id: LoanId(self.loan_sequence.fetch_add(1, Ordering::Relaxed)),
            customer_id,
            loan_amount: application.loan_amount,
            tenure,
            interest_rate: decision.corrected_interest_rate,
            monthly_payment: decision.monthly_installment,
            emis_paid_on_time: 0,
            start_date: today,
            end_date,
        });
        let loan = match booked {
            Ok(loan) => loan,
            Err(error) => {
                if let Err(restore) = self.customers.update(previous) {
                    error!(
                        customer_id = %customer_id,
                        error = %restore,
                        "failed to restore debt after loan booking failed"
                    );
                }
                return Err(error.into());
            }
        };

        info!(
            loan_id = %loan.loan_id,
            customer_id = %customer_id,
            amount = loan.loan_amount,
            "loan booked"
        );

        Ok(LoanCreation {
            loan_id: Some(loan.loan_id),
            customer_id,
            loan_approved: true,
            message: "Loan approved successfully.".to_string(),
            monthly_installment: loan.monthly_payment,
            decision,
        })
    }

    pub fn customer(&self, id: CustomerId) -> Result<Customer, LendingServiceError> {
        self.customers
            .fetch(id)?
            .ok_or(LendingServiceError::CustomerNotFound(id))
    }

    pub fn loan(&self, id: LoanId) -> Result<LoanDetailView, LendingServiceError> {
        let loan = self
            .loans
            .fetch(id)?
            .ok_or(LendingServiceError::LoanNotFound(id))?;
        let customer = self.customer(loan.customer_id)?;
        Ok(LoanDetailView::new(&loan, &customer))
    }

    pub fn customer_loans(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<CustomerLoanView>, LendingServiceError> {
        self.customer(customer_id)?;
        let loans = self.loans.for_customer(customer_id)?;
        Ok(loans.iter().map(CustomerLoanView::from).collect())
    }

    /// Insert an imported customer, keeping the id sequence ahead of explicit ids.
    pub fn seed_customer(&self, mut customer: Customer) -> Result<Customer, LendingServiceError> {
        if customer.customer_id.0 == 0 {
            customer.customer_id =
                CustomerId(self.customer_sequence.fetch_add(1, Ordering::Relaxed));
        } else {
            self.customer_sequence
                .fetch_max(customer.customer_id.0 + 1, Ordering::Relaxed);
        }
        Ok(self.customers.insert(customer)?)
    }

    /// Insert an imported loan. Returns `Ok(None)` when the loan id is already booked.
    pub fn seed_loan(&self, loan: Loan) -> Result<Option<Loan>, LendingServiceError> {
        if self.loans.fetch(loan.loan_id)?.is_some() {
            warn!(loan_id = %loan.loan_id, "loan already exists, skipping");
            return Ok(None);
        }
        self.customer(loan.customer_id)?;
        self.loan_sequence
            .fetch_max(loan.loan_id.0 + 1, Ordering::Relaxed);
        Ok(Some(self.loans.insert(loan)?))
    }

    fn decide(
        &self,
        customer: &Customer,
        application: &LoanApplication,
        today: NaiveDate,
    ) -> Result<EligibilityResult, LendingServiceError> {
        let existing: Vec<_> = self
            .loans
            .for_customer(customer.customer_id)?
            .iter()
            .map(Loan::as_existing)
            .collect();

        let result = self.evaluator.evaluate(
            &customer.profile(),
            &application.request(),
            &existing,
            today.year(),
        )?;

        info!(
            customer_id = %customer.customer_id,
            score = result.score,
            approval = result.approval,
            corrected_interest_rate = result.corrected_interest_rate,
            installment_ceiling =
                self.evaluator.config().max_installment_to_salary * customer.monthly_salary,
            "eligibility decided"
        );
        Ok(result)
    }

    fn customer_lock(&self, id: CustomerId) -> Result<Arc<Mutex<()>>, RepositoryError> {
        let mut locks = self
            .customer_locks
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lock table poisoned".to_string()))?;
        Ok(locks.entry(id).or_default().clone())
    }
}

fn validate_registration(registration: &CustomerRegistration) -> Result<(), RegistrationError> {
    for (field, value) in [
        ("first_name", &registration.first_name),
        ("last_name", &registration.last_name),
        ("phone_number", &registration.phone_number),
    ] {
        if value.trim().is_empty() {
            return Err(RegistrationError::MissingField(field));
        }
    }

    if !registration.monthly_salary.is_finite() || registration.monthly_salary <= 0.0 {
        return Err(RegistrationError::InvalidSalary(registration.monthly_salary));
    }

    Ok(())
}

/// Result of a loan-creation attempt. A declined request is a successful outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanCreation {
    pub loan_id: Option<LoanId>,
    pub customer_id: CustomerId,
    pub loan_approved: bool,
    pub message: String,
    pub monthly_installment: f64,
    #[serde(skip)]
    pub decision: EligibilityResult,
}

/// Invalid registration payloads.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("monthly salary must be a positive number (found {0})")]
    InvalidSalary(f64),
    #[error("phone number {0} is already registered")]
    DuplicatePhone(String),
}

/// Error raised by the lending service.
#[derive(Debug, thiserror::Error)]
pub enum LendingServiceError {
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),
    #[error("loan {0} not found")]
    LoanNotFound(LoanId),
    #[error("tenure of {0} months runs past the supported calendar")]
    TenureOutOfRange(i32),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
