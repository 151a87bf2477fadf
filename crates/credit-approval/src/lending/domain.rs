use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::wire::{deserialize_optional_date, flexible};

/// Identifier assigned to a registered customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier assigned to a disbursed loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Financial snapshot of a customer as consumed by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub approved_limit: f64,
    pub current_debt: f64,
    pub monthly_salary: f64,
}

/// Loan already held by the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExistingLoan {
    pub loan_amount: f64,
    pub monthly_payment: f64,
    pub tenure: u32,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
}

/// Terms requested by the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub loan_amount: f64,
    /// Nominal annual rate in percent.
    pub interest_rate: f64,
    /// Months.
    pub tenure: i32,
}

/// Customer record owned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub phone_number: String,
    pub monthly_salary: f64,
    pub approved_limit: f64,
    pub current_debt: f64,
}

impl Customer {
    pub fn profile(&self) -> CustomerProfile {
        CustomerProfile {
            approved_limit: self.approved_limit,
            current_debt: self.current_debt,
            monthly_salary: self.monthly_salary,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration payload. `monthly_income` is accepted as an alias for the salary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRegistration {
    pub first_name: String,
    pub last_name: String,
    #[serde(deserialize_with = "flexible")]
    pub age: u32,
    pub phone_number: String,
    #[serde(alias = "monthly_income", deserialize_with = "flexible")]
    pub monthly_salary: f64,
}

/// Loan record owned by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub customer_id: CustomerId,
    pub loan_amount: f64,
    pub tenure: u32,
    pub interest_rate: f64,
    pub monthly_payment: f64,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Loan {
    pub fn as_existing(&self) -> ExistingLoan {
        ExistingLoan {
            loan_amount: self.loan_amount,
            monthly_payment: self.monthly_payment,
            tenure: self.tenure,
            emis_paid_on_time: self.emis_paid_on_time,
            start_date: self.start_date,
        }
    }

    pub fn repayments_left(&self) -> u32 {
        self.tenure.saturating_sub(self.emis_paid_on_time)
    }
}

/// Eligibility or loan-creation request as submitted by the back-office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    #[serde(deserialize_with = "flexible")]
    pub customer_id: u64,
    #[serde(deserialize_with = "flexible")]
    pub loan_amount: f64,
    #[serde(deserialize_with = "flexible")]
    pub interest_rate: f64,
    #[serde(deserialize_with = "flexible")]
    pub tenure: i32,
    /// Overrides the server clock when deciding which loans are recent and when a loan starts.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_date"
    )]
    pub today: Option<NaiveDate>,
}

impl LoanApplication {
    pub fn customer_id(&self) -> CustomerId {
        CustomerId(self.customer_id)
    }

    pub fn request(&self) -> LoanRequest {
        LoanRequest {
            loan_amount: self.loan_amount,
            interest_rate: self.interest_rate,
            tenure: self.tenure,
        }
    }
}
