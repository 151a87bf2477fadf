use chrono::Datelike;

use super::super::domain::{CustomerProfile, ExistingLoan};
use super::config::PolicyConfig;
use super::ScoreComponents;

/// Aggregates over the existing loans that later decision steps need.
pub(crate) struct HistorySignals {
    pub total_installments: f64,
    pub over_limit: bool,
}

pub(crate) fn score_history(
    customer: &CustomerProfile,
    loans: &[ExistingLoan],
    current_year: i32,
    config: &PolicyConfig,
) -> (ScoreComponents, HistorySignals) {
    let total_principal: f64 = loans.iter().map(|loan| loan.loan_amount).sum();
    let total_installments: f64 = loans.iter().map(|loan| loan.monthly_payment).sum();
    let opened_this_year = loans
        .iter()
        .filter(|loan| loan.start_date.year() == current_year)
        .count();

    let components = ScoreComponents {
        payment_history: payment_history_points(loans, config),
        loan_count: loan_count_points(loans.len(), config),
        recent_activity: recent_activity_points(opened_this_year, config),
        utilization: utilization_points(total_principal, customer.approved_limit, config),
    };

    let signals = HistorySignals {
        total_installments,
        over_limit: customer.current_debt > customer.approved_limit,
    };

    (components, signals)
}

/// On-time EMI ratio scaled to `history_weight`.
///
/// Applicants with no loans, or only zero-tenure records, receive the new-customer baseline.
pub(crate) fn payment_history_points(loans: &[ExistingLoan], config: &PolicyConfig) -> f64 {
    let total_tenure: u64 = loans.iter().map(|loan| u64::from(loan.tenure)).sum();
    if total_tenure == 0 {
        return config.new_customer_history_score;
    }

    let paid_on_time: u64 = loans
        .iter()
        .map(|loan| u64::from(loan.emis_paid_on_time))
        .sum();
    let ratio = paid_on_time as f64 / total_tenure as f64;

    (ratio * config.history_weight).min(config.history_weight)
}

pub(crate) fn loan_count_points(loan_count: usize, config: &PolicyConfig) -> f64 {
    (config.loan_count_allowance - config.loan_count_penalty * loan_count as f64).max(0.0)
}

pub(crate) fn recent_activity_points(opened_this_year: usize, config: &PolicyConfig) -> f64 {
    (config.recent_activity_allowance - config.recent_activity_penalty * opened_this_year as f64)
        .max(0.0)
}

pub(crate) fn utilization_points(
    total_principal: f64,
    approved_limit: f64,
    config: &PolicyConfig,
) -> f64 {
    let utilization = total_principal / approved_limit;
    (config.utilization_weight - config.utilization_weight * utilization).max(0.0)
}
