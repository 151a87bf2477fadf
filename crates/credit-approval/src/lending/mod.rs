//! Customer registry, loan ledger and the eligibility engine that decides between them.

pub mod domain;
pub mod eligibility;
pub mod ingest;
pub mod repository;
pub mod router;
pub mod service;
mod wire;

#[cfg(test)]
mod tests;

pub use domain::{
    Customer, CustomerId, CustomerProfile, CustomerRegistration, ExistingLoan, Loan,
    LoanApplication, LoanId, LoanRequest,
};
pub use eligibility::{
    evaluate, DeclineReason, EligibilityError, EligibilityEvaluator, EligibilityResult,
    PolicyConfig, ScoreComponents,
};
pub use ingest::{ImportError, ImportSummary};
pub use repository::{
    CustomerLoanView, CustomerRepository, CustomerSummary, LoanDetailView, LoanRepository,
    RepositoryError,
};
pub use router::{lending_router, EligibilityResponse};
pub use service::{
    approved_limit_for, LendingService, LendingServiceError, LoanCreation, RegistrationError,
};
pub use wire::parse_date;
