//! Seed the registry and ledger from CSV exports.
//!
//! Headers are fixed; rows that fail to decode or reference an unknown customer are logged
//! and counted rather than aborting the import.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{Customer, CustomerId, Loan, LoanId};
use super::repository::{CustomerRepository, LoanRepository};
use super::service::LendingService;
use super::wire::deserialize_date;

/// Counters reported at the end of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unable to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed CSV header: {0}")]
    Header(csv::Error),
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    #[serde(rename = "Customer ID", default)]
    customer_id: Option<u64>,
    #[serde(rename = "First Name")]
    first_name: String,
    #[serde(rename = "Last Name")]
    last_name: String,
    #[serde(rename = "Age")]
    age: u32,
    #[serde(rename = "Phone Number")]
    phone_number: String,
    #[serde(rename = "Monthly Salary")]
    monthly_salary: f64,
    #[serde(rename = "Approved Limit")]
    approved_limit: f64,
    #[serde(rename = "Current Debt", default)]
    current_debt: Option<f64>,
}

impl CustomerRow {
    fn into_customer(self) -> Customer {
        Customer {
            customer_id: CustomerId(self.customer_id.unwrap_or(0)),
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            phone_number: self.phone_number,
            monthly_salary: self.monthly_salary,
            approved_limit: self.approved_limit,
            current_debt: self.current_debt.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoanRow {
    #[serde(rename = "Customer ID")]
    customer_id: u64,
    #[serde(rename = "Loan ID")]
    loan_id: u64,
    #[serde(rename = "Loan Amount")]
    loan_amount: f64,
    #[serde(rename = "Tenure")]
    tenure: u32,
    #[serde(rename = "Interest Rate")]
    interest_rate: f64,
    #[serde(rename = "Monthly payment")]
    monthly_payment: f64,
    #[serde(rename = "EMIs paid on Time")]
    emis_paid_on_time: u32,
    #[serde(rename = "Date of Approval", deserialize_with = "deserialize_date")]
    start_date: NaiveDate,
    #[serde(rename = "End Date", deserialize_with = "deserialize_date")]
    end_date: NaiveDate,
}

impl LoanRow {
    fn into_loan(self) -> Loan {
        Loan {
            loan_id: LoanId(self.loan_id),
            customer_id: CustomerId(self.customer_id),
            loan_amount: self.loan_amount,
            tenure: self.tenure,
            interest_rate: self.interest_rate,
            monthly_payment: self.monthly_payment,
            emis_paid_on_time: self.emis_paid_on_time,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

fn csv_reader<R: Read>(reader: R) -> Result<csv::Reader<R>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.headers().map_err(ImportError::Header)?;
    Ok(csv_reader)
}

fn open(path: &Path) -> Result<File, ImportError> {
    File::open(path).map_err(|source| ImportError::Open {
        path: path.display().to_string(),
        source,
    })
}

pub fn import_customers<C, L, R>(
    service: &LendingService<C, L>,
    reader: R,
) -> Result<ImportSummary, ImportError>
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
    R: Read,
{
    let mut csv_reader = csv_reader(reader)?;
    let mut summary = ImportSummary::default();

    for (index, row) in csv_reader.deserialize::<CustomerRow>().enumerate() {
        let outcome = row
            .map_err(|err| err.to_string())
            .and_then(|row| {
                service
                    .seed_customer(row.into_customer())
                    .map_err(|err| err.to_string())
            });

        match outcome {
            Ok(_) => summary.imported += 1,
            Err(error) => {
                warn!(row = index + 1, %error, "customer row rejected");
                summary.errors += 1;
            }
        }
    }

    info!(
        imported = summary.imported,
        errors = summary.errors,
        "customer import completed"
    );
    Ok(summary)
}

pub fn import_loans<C, L, R>(
    service: &LendingService<C, L>,
    reader: R,
) -> Result<ImportSummary, ImportError>
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
    R: Read,
{
    let mut csv_reader = csv_reader(reader)?;
    let mut summary = ImportSummary::default();

    for (index, row) in csv_reader.deserialize::<LoanRow>().enumerate() {
        let outcome = row
            .map_err(|err| err.to_string())
            .and_then(|row| {
                service
                    .seed_loan(row.into_loan())
                    .map_err(|err| err.to_string())
            });

        match outcome {
            Ok(Some(_)) => summary.imported += 1,
            Ok(None) => summary.skipped += 1,
            Err(error) => {
                warn!(row = index + 1, %error, "loan row rejected");
                summary.errors += 1;
            }
        }
    }

    info!(
        imported = summary.imported,
        skipped = summary.skipped,
        errors = summary.errors,
        "loan import completed"
    );
    Ok(summary)
}

pub fn import_customers_from_path<C, L>(
    service: &LendingService<C, L>,
    path: &Path,
) -> Result<ImportSummary, ImportError>
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
{
    import_customers(service, open(path)?)
}

pub fn import_loans_from_path<C, L>(
    service: &LendingService<C, L>,
    path: &Path,
) -> Result<ImportSummary, ImportError>
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
{
    import_loans(service, open(path)?)
}

/// Decode a loan export into evaluator inputs without touching any repository.
pub fn read_loans<R: Read>(reader: R) -> Result<Vec<Loan>, ImportError> {
    let mut csv_reader = csv_reader(reader)?;
    let mut loans = Vec::new();

    for (index, row) in csv_reader.deserialize::<LoanRow>().enumerate() {
        match row {
            Ok(row) => loans.push(row.into_loan()),
            Err(error) => warn!(row = index + 1, %error, "loan row rejected"),
        }
    }

    Ok(loans)
}
