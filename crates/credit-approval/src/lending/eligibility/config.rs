use serde::{Deserialize, Serialize};

/// Scoring weights and decision tables applied by the evaluator.
///
/// The defaults reproduce the production lending policy. The four components top out at
/// 25 + 20 + 20 + 20 = 85 points and the band thresholds are tuned against that range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Points awarded for a perfect on-time payment ratio.
    pub history_weight: f64,
    /// History points granted to applicants without any loan on file.
    pub new_customer_history_score: f64,
    pub loan_count_allowance: f64,
    pub loan_count_penalty: f64,
    pub recent_activity_allowance: f64,
    pub recent_activity_penalty: f64,
    pub utilization_weight: f64,
    /// Approval rules, matched from the highest threshold down.
    pub approval_bands: Vec<ApprovalBand>,
    /// Rate rules, matched from the highest threshold down.
    pub rate_bands: Vec<RateBand>,
    /// Rate applied when the score clears no rate band.
    pub fallback_rate: RateCorrection,
    /// Ceiling on (new installment + existing installments) / monthly salary.
    pub max_installment_to_salary: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            history_weight: 25.0,
            new_customer_history_score: 10.0,
            loan_count_allowance: 20.0,
            loan_count_penalty: 2.0,
            recent_activity_allowance: 20.0,
            recent_activity_penalty: 5.0,
            utilization_weight: 20.0,
            approval_bands: vec![
                ApprovalBand {
                    score_above: 50.0,
                    minimum_requested_rate: None,
                },
                ApprovalBand {
                    score_above: 30.0,
                    minimum_requested_rate: Some(12.0),
                },
                ApprovalBand {
                    score_above: 10.0,
                    minimum_requested_rate: Some(16.0),
                },
            ],
            rate_bands: vec![
                RateBand {
                    score_above: 50.0,
                    correction: RateCorrection::Requested,
                },
                RateBand {
                    score_above: 30.0,
                    correction: RateCorrection::Floor(12.0),
                },
                RateBand {
                    score_above: 10.0,
                    correction: RateCorrection::Floor(16.0),
                },
            ],
            fallback_rate: RateCorrection::Fixed(16.0),
            max_installment_to_salary: 0.5,
        }
    }
}

/// Scores strictly above `score_above` are approved, provided the requested rate reaches
/// `minimum_requested_rate` when one is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApprovalBand {
    pub score_above: f64,
    pub minimum_requested_rate: Option<f64>,
}

/// Scores strictly above `score_above` have their rate adjusted by `correction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub score_above: f64,
    pub correction: RateCorrection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateCorrection {
    /// Keep the requested rate.
    Requested,
    /// Raise the requested rate to at least this value.
    Floor(f64),
    /// Replace the requested rate.
    Fixed(f64),
}

impl RateCorrection {
    pub fn apply(self, requested_rate: f64) -> f64 {
        match self {
            RateCorrection::Requested => requested_rate,
            RateCorrection::Floor(floor) => requested_rate.max(floor),
            RateCorrection::Fixed(rate) => rate,
        }
    }
}
