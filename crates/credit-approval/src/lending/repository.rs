use serde::Serialize;

use super::domain::{Customer, CustomerId, Loan, LoanId};

/// Storage abstraction for the customer registry.
///
/// `insert` must reject a record whose id or phone number is already registered.
pub trait CustomerRepository: Send + Sync {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError>;
    fn update(&self, customer: Customer) -> Result<(), RepositoryError>;
    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;
    fn find_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError>;
}

/// Storage abstraction for the loan ledger.
pub trait LoanRepository: Send + Sync {
    fn insert(&self, loan: Loan) -> Result<Loan, RepositoryError>;
    fn fetch(&self, id: LoanId) -> Result<Option<Loan>, RepositoryError>;
    fn for_customer(&self, customer_id: CustomerId) -> Result<Vec<Loan>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Customer fields exposed alongside a loan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub age: u32,
}

impl From<&Customer> for CustomerSummary {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.customer_id,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            phone_number: customer.phone_number.clone(),
            age: customer.age,
        }
    }
}

/// A single loan with its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanDetailView {
    pub loan_id: LoanId,
    pub customer: CustomerSummary,
    pub loan_approved: bool,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub monthly_installment: f64,
    pub tenure: u32,
}

impl LoanDetailView {
    pub fn new(loan: &Loan, customer: &Customer) -> Self {
        Self {
            loan_id: loan.loan_id,
            customer: CustomerSummary::from(customer),
            // Only approved loans are ever written to the ledger.
            loan_approved: true,
            loan_amount: loan.loan_amount,
            interest_rate: loan.interest_rate,
            monthly_installment: loan.monthly_payment,
            tenure: loan.tenure,
        }
    }
}

/// Row in a customer's loan listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerLoanView {
    pub loan_id: LoanId,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub monthly_installment: f64,
    pub repayments_left: u32,
}

impl From<&Loan> for CustomerLoanView {
    fn from(loan: &Loan) -> Self {
        Self {
            loan_id: loan.loan_id,
            loan_amount: loan.loan_amount,
            interest_rate: loan.interest_rate,
            monthly_installment: loan.monthly_payment,
            repayments_left: loan.repayments_left(),
        }
    }
}
