//! Credit scoring and loan approval decisions.
//!
//! [`EligibilityEvaluator`] is a pure function of its inputs: the customer's profile, the
//! requested loan, the customer's existing loans and the reference year used to decide which
//! loans count as recent. It never reads a clock and performs no I/O, so a single instance can
//! be shared across threads behind an `Arc`.

mod config;
mod installment;
mod policy;
mod rules;

pub use config::{ApprovalBand, PolicyConfig, RateBand, RateCorrection};
pub use installment::{monthly_installment, round_currency};
pub use policy::DeclineReason;

use super::domain::{CustomerProfile, ExistingLoan, LoanRequest};
use policy::{affordability_check, approval_for, corrected_rate, BandDecision};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Stateless evaluator that applies a [`PolicyConfig`] to a loan request.
#[derive(Debug, Clone)]
pub struct EligibilityEvaluator {
    config: PolicyConfig,
}

impl Default for EligibilityEvaluator {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}

impl EligibilityEvaluator {
    pub fn new(mut config: PolicyConfig) -> Self {
        config
            .approval_bands
            .sort_by(|a, b| descending(a.score_above, b.score_above));
        config
            .rate_bands
            .sort_by(|a, b| descending(a.score_above, b.score_above));
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn evaluate(
        &self,
        customer: &CustomerProfile,
        request: &LoanRequest,
        existing_loans: &[ExistingLoan],
        current_year: i32,
    ) -> Result<EligibilityResult, EligibilityError> {
        validate(customer, request, existing_loans)?;

        let (components, signals) =
            rules::score_history(customer, existing_loans, current_year, &self.config);
        let score = if signals.over_limit {
            0.0
        } else {
            components.total()
        };

        let band = approval_for(score, request.interest_rate, &self.config.approval_bands);
        let corrected_interest_rate = corrected_rate(score, request.interest_rate, &self.config);
        let installment =
            monthly_installment(request.loan_amount, corrected_interest_rate, request.tenure);
        if !installment.is_finite() {
            return Err(EligibilityError::InstallmentOutOfRange {
                loan_amount: request.loan_amount,
                interest_rate: corrected_interest_rate,
            });
        }

        let band_reason = if signals.over_limit {
            Some(DeclineReason::OverLimit {
                current_debt: customer.current_debt,
                approved_limit: customer.approved_limit,
            })
        } else {
            match band {
                BandDecision::Approved => None,
                BandDecision::RateTooLow {
                    minimum_requested_rate,
                } => Some(DeclineReason::ScoreBand {
                    score,
                    minimum_requested_rate: Some(minimum_requested_rate),
                }),
                BandDecision::Rejected => Some(DeclineReason::ScoreBand {
                    score,
                    minimum_requested_rate: None,
                }),
            }
        };
        let decline_reason = band_reason.or_else(|| {
            affordability_check(
                installment,
                signals.total_installments,
                customer.monthly_salary,
                &self.config,
            )
        });

        debug!(
            score,
            corrected_interest_rate,
            installment,
            approved = decline_reason.is_none(),
            "eligibility evaluated"
        );

        Ok(EligibilityResult {
            score,
            approval: decline_reason.is_none(),
            corrected_interest_rate,
            monthly_installment: round_currency(installment),
            components,
            decline_reason,
        })
    }
}

/// Evaluate a request against the default lending policy.
pub fn evaluate(
    customer: &CustomerProfile,
    request: &LoanRequest,
    existing_loans: &[ExistingLoan],
    current_year: i32,
) -> Result<EligibilityResult, EligibilityError> {
    EligibilityEvaluator::default().evaluate(customer, request, existing_loans, current_year)
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

fn validate(
    customer: &CustomerProfile,
    request: &LoanRequest,
    existing_loans: &[ExistingLoan],
) -> Result<(), EligibilityError> {
    finite("loan_amount", request.loan_amount)?;
    finite("interest_rate", request.interest_rate)?;
    finite("approved_limit", customer.approved_limit)?;
    finite("current_debt", customer.current_debt)?;
    finite("monthly_salary", customer.monthly_salary)?;
    for loan in existing_loans {
        finite("existing loan_amount", loan.loan_amount)?;
        finite("existing monthly_payment", loan.monthly_payment)?;
    }

    if request.tenure <= 0 {
        return Err(EligibilityError::NonPositiveTenure(request.tenure));
    }
    if request.loan_amount <= 0.0 {
        return Err(EligibilityError::NonPositiveAmount(request.loan_amount));
    }
    if request.interest_rate < 0.0 {
        return Err(EligibilityError::NegativeInterestRate(request.interest_rate));
    }
    if customer.approved_limit <= 0.0 {
        return Err(EligibilityError::NonPositiveApprovedLimit(
            customer.approved_limit,
        ));
    }

    Ok(())
}

fn finite(field: &'static str, value: f64) -> Result<(), EligibilityError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EligibilityError::NonNumeric { field })
    }
}

/// Points contributed by each scoring rule, kept for audits and adverse-action notices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub payment_history: f64,
    pub loan_count: f64,
    pub recent_activity: f64,
    pub utilization: f64,
}

impl ScoreComponents {
    pub fn total(&self) -> f64 {
        self.payment_history + self.loan_count + self.recent_activity + self.utilization
    }
}

/// Decision produced for a single loan request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub score: f64,
    pub approval: bool,
    pub corrected_interest_rate: f64,
    /// Installment at the corrected rate, reported even when the request is declined.
    pub monthly_installment: f64,
    pub components: ScoreComponents,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<DeclineReason>,
}

impl EligibilityResult {
    pub fn summary(&self) -> String {
        match &self.decline_reason {
            None => format!(
                "approved at {}% with monthly installment {:.2}",
                self.corrected_interest_rate, self.monthly_installment
            ),
            Some(reason) => format!("declined: {}", reason.summary()),
        }
    }
}

/// Malformed request or profile data. Business rejections are never reported this way.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EligibilityError {
    #[error("{field} must be a finite number")]
    NonNumeric { field: &'static str },
    #[error("tenure must be a positive number of months (found {0})")]
    NonPositiveTenure(i32),
    #[error("loan amount must be greater than zero (found {0})")]
    NonPositiveAmount(f64),
    #[error("interest rate must not be negative (found {0})")]
    NegativeInterestRate(f64),
    #[error("approved limit must be greater than zero (found {0})")]
    NonPositiveApprovedLimit(f64),
    #[error("installment for {loan_amount} at {interest_rate}% is not representable")]
    InstallmentOutOfRange { loan_amount: f64, interest_rate: f64 },
}
