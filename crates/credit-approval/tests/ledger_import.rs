use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use credit_approval::config::LendingConfig;
use credit_approval::lending::ingest::{
    import_customers_from_path, import_loans_from_path, read_loans,
};
use credit_approval::lending::{
    evaluate, Customer, CustomerId, CustomerRepository, DeclineReason, LendingService, Loan,
    LoanApplication, LoanId, LoanRepository, RepositoryError,
};

#[derive(Default)]
struct Customers(Mutex<HashMap<CustomerId, Customer>>);

impl CustomerRepository for Customers {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut guard = self.0.lock().expect("lock");
        if guard.contains_key(&customer.customer_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(customer.customer_id, customer.clone());
        Ok(customer)
    }

    fn update(&self, customer: Customer) -> Result<(), RepositoryError> {
        self.0
            .lock()
            .expect("lock")
            .insert(customer.customer_id, customer);
        Ok(())
    }

    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.0.lock().expect("lock").get(&id).cloned())
    }

    fn find_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("lock")
            .values()
            .find(|customer| customer.phone_number == phone_number)
            .cloned())
    }
}

#[derive(Default)]
struct Loans(Mutex<HashMap<LoanId, Loan>>);

impl LoanRepository for Loans {
    fn insert(&self, loan: Loan) -> Result<Loan, RepositoryError> {
        let mut guard = self.0.lock().expect("lock");
        if guard.contains_key(&loan.loan_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(loan.loan_id, loan.clone());
        Ok(loan)
    }

    fn fetch(&self, id: LoanId) -> Result<Option<Loan>, RepositoryError> {
        Ok(self.0.lock().expect("lock").get(&id).cloned())
    }

    fn for_customer(&self, customer_id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("lock")
            .values()
            .filter(|loan| loan.customer_id == customer_id)
            .cloned()
            .collect())
    }
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
}

fn seeded_service() -> LendingService<Customers, Loans> {
    let service = LendingService::new(
        Arc::new(Customers::default()),
        Arc::new(Loans::default()),
        &LendingConfig::default(),
    );

    let customers = import_customers_from_path(&service, &fixture("customer_data.csv"))
        .expect("customer export readable");
    assert_eq!(customers.imported, 5);
    assert_eq!(customers.errors, 0);

    let loans =
        import_loans_from_path(&service, &fixture("loan_data.csv")).expect("loan export readable");
    assert_eq!(loans.imported, 7);
    assert_eq!(loans.skipped, 1);
    assert_eq!(loans.errors, 0);

    service
}

fn application(customer_id: u64, loan_amount: f64, interest_rate: f64, tenure: i32) -> LoanApplication {
    LoanApplication {
        customer_id,
        loan_amount,
        interest_rate,
        tenure,
        today: Some(today()),
    }
}

#[test]
fn clean_history_customer_is_approved_at_the_requested_rate() {
    let service = seeded_service();

    let result = service
        .check_eligibility(&application(5, 500_000.0, 9.0, 24), today())
        .expect("eligibility computed");

    assert_eq!(result.components.payment_history, 25.0);
    assert!(result.score > 50.0);
    assert!(result.approval);
    assert_eq!(result.corrected_interest_rate, 9.0);
}

#[test]
fn heavily_borrowed_customer_needs_the_middle_band_rate() {
    let service = seeded_service();

    let low_rate = service
        .check_eligibility(&application(4, 100_000.0, 11.0, 12), today())
        .expect("eligibility computed");
    assert!(low_rate.score > 30.0 && low_rate.score <= 50.0);
    assert!(!low_rate.approval);
    assert_eq!(low_rate.corrected_interest_rate, 12.0);
    assert!(matches!(
        low_rate.decline_reason,
        Some(DeclineReason::ScoreBand {
            minimum_requested_rate: Some(minimum),
            ..
        }) if minimum == 12.0
    ));

    // A compliant rate clears the band but the existing installments still exceed half the salary.
    let compliant = service
        .check_eligibility(&application(4, 100_000.0, 13.0, 12), today())
        .expect("eligibility computed");
    assert!(!compliant.approval);
    assert!(matches!(
        compliant.decline_reason,
        Some(DeclineReason::Affordability { .. })
    ));
}

#[test]
fn new_loans_continue_the_imported_id_sequence() {
    let service = seeded_service();

    let creation = service
        .create_loan(&application(5, 500_000.0, 9.0, 24), today())
        .expect("decision returned");

    assert_eq!(creation.loan_id, Some(LoanId(7799)));
}

#[test]
fn exported_loans_can_be_scored_directly() {
    let file = std::fs::File::open(fixture("loan_data.csv")).expect("fixture present");
    let loans = read_loans(file).expect("header parses");
    let history: Vec<_> = loans
        .iter()
        .filter(|loan| loan.customer_id == CustomerId(2))
        .map(Loan::as_existing)
        .collect();
    assert_eq!(history.len(), 2);

    let service = seeded_service();
    let profile = service.customer(CustomerId(2)).expect("customer present").profile();
    let direct = evaluate(
        &profile,
        &application(2, 50_000.0, 10.0, 12).request(),
        &history,
        2025,
    )
    .expect("valid request");
    let through_service = service
        .check_eligibility(&application(2, 50_000.0, 10.0, 12), today())
        .expect("eligibility computed");

    assert_eq!(direct, through_service);
}
