use serde::Serialize;

use crate::features::extractor::WalletFeatures;

/// Upper bound of every sub-score and of the final score.
pub const MAX_SCORE: f64 = 1000.0;

/// How a score was assembled: sub-scores on a 0–1000 scale, their weighted
/// sum, and the penalties subtracted before clamping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub activity: f64,
    pub diversity: f64,
    pub deposit: f64,
    pub longevity: f64,
    pub weighted_sum: f64,
    pub liquidation_penalty: f64,
    pub bot_penalty: f64,
}

/// The score for one wallet, tied to the features it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult<'a> {
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    pub features: &'a WalletFeatures,
}
