use serde::{Deserialize, Serialize};

use super::config::{ApprovalBand, PolicyConfig};

/// Why an evaluation came back with `approval = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclineReason {
    /// Outstanding debt already exceeds the approved limit.
    OverLimit {
        current_debt: f64,
        approved_limit: f64,
    },
    /// The score band rejects outright, or demands a higher requested rate.
    ScoreBand {
        score: f64,
        minimum_requested_rate: Option<f64>,
    },
    /// New plus existing installments exceed the salary ceiling.
    Affordability {
        total_installments: f64,
        ceiling: f64,
    },
}

impl DeclineReason {
    pub fn summary(&self) -> String {
        match self {
            DeclineReason::OverLimit {
                current_debt,
                approved_limit,
            } => format!(
                "current debt {:.2} exceeds approved limit {:.2}",
                current_debt, approved_limit
            ),
            DeclineReason::ScoreBand {
                score,
                minimum_requested_rate: Some(rate),
            } => format!("credit score {:.2} requires an interest rate of at least {rate}%", score),
            DeclineReason::ScoreBand {
                score,
                minimum_requested_rate: None,
            } => format!("credit score {:.2} is too low for approval", score),
            DeclineReason::Affordability {
                total_installments,
                ceiling,
            } => format!(
                "monthly installments {:.2} exceed {:.2} affordability ceiling",
                total_installments, ceiling
            ),
        }
    }
}

/// Outcome of the approval table for a single score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BandDecision {
    Approved,
    RateTooLow { minimum_requested_rate: f64 },
    Rejected,
}

/// Look up the approval table. The first band whose threshold the score clears decides.
pub(crate) fn approval_for(score: f64, requested_rate: f64, bands: &[ApprovalBand]) -> BandDecision {
    match bands.iter().find(|band| score > band.score_above) {
        Some(ApprovalBand {
            minimum_requested_rate: None,
            ..
        }) => BandDecision::Approved,
        Some(ApprovalBand {
            minimum_requested_rate: Some(minimum),
            ..
        }) => {
            if requested_rate >= *minimum {
                BandDecision::Approved
            } else {
                BandDecision::RateTooLow {
                    minimum_requested_rate: *minimum,
                }
            }
        }
        None => BandDecision::Rejected,
    }
}

/// Look up the rate-correction table, independently of the approval table.
pub(crate) fn corrected_rate(score: f64, requested_rate: f64, config: &PolicyConfig) -> f64 {
    let correction = config
        .rate_bands
        .iter()
        .find(|band| score > band.score_above)
        .map(|band| band.correction)
        .unwrap_or(config.fallback_rate);

    correction.apply(requested_rate)
}

/// Salary ceiling check; returns the decline reason when the installments do not fit.
pub(crate) fn affordability_check(
    installment: f64,
    existing_installments: f64,
    monthly_salary: f64,
    config: &PolicyConfig,
) -> Option<DeclineReason> {
    let total_installments = installment + existing_installments;
    let ceiling = config.max_installment_to_salary * monthly_salary;

    if total_installments > ceiling {
        Some(DeclineReason::Affordability {
            total_installments,
            ceiling,
        })
    } else {
        None
    }
}
