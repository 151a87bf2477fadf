use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use credit_approval::config::AppConfig;
use credit_approval::error::AppError;
use credit_approval::lending::ingest::read_loans;
use credit_approval::lending::{
    parse_date, CustomerId, CustomerProfile, EligibilityEvaluator, EligibilityResult,
    ExistingLoan, ImportError, Loan, LoanRequest,
};

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Customer's approved credit limit
    #[arg(long)]
    pub(crate) approved_limit: f64,
    /// Outstanding debt across all loans
    #[arg(long, default_value_t = 0.0)]
    pub(crate) current_debt: f64,
    /// Gross monthly salary
    #[arg(long)]
    pub(crate) monthly_salary: f64,
    /// Requested principal
    #[arg(long)]
    pub(crate) loan_amount: f64,
    /// Requested annual interest rate in percent
    #[arg(long)]
    pub(crate) interest_rate: f64,
    /// Requested tenure in months
    #[arg(long)]
    pub(crate) tenure: i32,
    /// Loan export providing the applicant's existing loans
    #[arg(long)]
    pub(crate) loans_csv: Option<PathBuf>,
    /// Only use loans from the export that belong to this customer
    #[arg(long, requires = "loans_csv")]
    pub(crate) customer_id: Option<u64>,
    /// Reference date deciding which loans are recent (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the full decision as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let evaluator = EligibilityEvaluator::new(config.lending.policy());

    let history = load_history(args.loans_csv.as_deref(), args.customer_id.map(CustomerId))?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let profile = CustomerProfile {
        approved_limit: args.approved_limit,
        current_debt: args.current_debt,
        monthly_salary: args.monthly_salary,
    };
    let request = LoanRequest {
        loan_amount: args.loan_amount,
        interest_rate: args.interest_rate,
        tenure: args.tenure,
    };

    let result = evaluator.evaluate(&profile, &request, &history, today.year())?;

    if args.json {
        let body = serde_json::to_string_pretty(&result).map_err(std::io::Error::from)?;
        println!("{body}");
    } else {
        println!("{}", render_decision(&request, &result, history.len()));
    }
    Ok(())
}

fn load_history(
    path: Option<&Path>,
    customer: Option<CustomerId>,
) -> Result<Vec<ExistingLoan>, AppError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let loans = read_loans(file)?;
    Ok(select_history(&loans, customer))
}

fn select_history(loans: &[Loan], customer: Option<CustomerId>) -> Vec<ExistingLoan> {
    loans
        .iter()
        .filter(|loan| customer.map_or(true, |id| loan.customer_id == id))
        .map(Loan::as_existing)
        .collect()
}

fn render_decision(request: &LoanRequest, result: &EligibilityResult, history_len: usize) -> String {
    let components = &result.components;
    let lines = [
        format!(
            "Credit score: {:.2} (payment history {:.2}, loan count {:.2}, recent activity {:.2}, utilization {:.2})",
            result.score,
            components.payment_history,
            components.loan_count,
            components.recent_activity,
            components.utilization
        ),
        format!("Existing loans considered: {history_len}"),
        format!("Decision: {}", result.summary()),
        format!(
            "Interest rate: requested {:.2}%, corrected {:.2}%",
            request.interest_rate, result.corrected_interest_rate
        ),
        format!(
            "Monthly installment: {:.2} over {} months",
            result.monthly_installment, request.tenure
        ),
    ];

    lines.join("\n")
}
