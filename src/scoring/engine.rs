use crate::config::ScoringConfig;
use crate::features::extractor::WalletFeatures;

use super::types::{ScoreBreakdown, ScoreResult, MAX_SCORE};

/// The scoring engine. A pure function of its config and one wallet's features.
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a wallet: weighted sub-scores, minus penalties, clamped to
    /// [0, 1000] and rounded.
    pub fn score<'a>(&self, features: &'a WalletFeatures) -> ScoreResult<'a> {
        let breakdown = self.breakdown(features);
        let raw = breakdown.weighted_sum - breakdown.liquidation_penalty - breakdown.bot_penalty;
        let score = if raw.is_nan() {
            0
        } else {
            raw.clamp(0.0, MAX_SCORE).round() as u32
        };

        ScoreResult {
            score,
            breakdown,
            features,
        }
    }

    fn breakdown(&self, features: &WalletFeatures) -> ScoreBreakdown {
        let cfg = &self.config;
        let w = &cfg.weights;

        let activity = saturate(features.tx_count as f64, cfg.activity_cap as f64);
        let diversity = saturate(features.assets.len() as f64, cfg.diversity_cap as f64);
        let deposit = features.deposit_ratio.clamp(0.0, 1.0) * MAX_SCORE;
        let longevity = saturate(features.wallet_age_days, cfg.age_cap_days);

        let weighted_sum = w.activity * activity
            + w.diversity * diversity
            + w.deposit * deposit
            + w.longevity * longevity;

        let liquidation_penalty = features.liquidations as f64 * cfg.liquidation_penalty;
        let bot_penalty = if features.bot_like {
            cfg.bot_penalty
        } else {
            0.0
        };

        ScoreBreakdown {
            activity,
            diversity,
            deposit,
            longevity,
            weighted_sum,
            liquidation_penalty,
            bot_penalty,
        }
    }
}

/// Linear up to `cap`, flat after: min(value / cap, 1) * 1000.
fn saturate(value: f64, cap: f64) -> f64 {
    if cap <= 0.0 || value <= 0.0 {
        return 0.0;
    }
    (value / cap).min(1.0) * MAX_SCORE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringWeights;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    /// 10 deposits of 100 USD over 30 days in one asset, no borrows.
    fn steady_depositor() -> WalletFeatures {
        WalletFeatures {
            wallet: "0xa".to_string(),
            tx_count: 10,
            assets: BTreeSet::from(["USDC".to_string()]),
            deposit_ratio: 1.0,
            liquidations: 0,
            wallet_age_days: 30.0,
            total_usd_volume: 1000.0,
            bot_like: false,
            deposit_usd: 1000.0,
            borrow_usd: 0.0,
            first_seen: Utc.timestamp_opt(0, 0).unwrap(),
            last_seen: Utc.timestamp_opt(30 * 86_400, 0).unwrap(),
        }
    }

    fn scorer() -> Scorer {
        Scorer::new(ScoringConfig::default())
    }

    #[test]
    fn test_steady_depositor_scores_well() {
        let features = steady_depositor();
        let result = scorer().score(&features);
        assert!(result.score > 550, "score was {}", result.score);
        assert_eq!(result.breakdown.deposit, 1000.0);
        assert_eq!(result.breakdown.liquidation_penalty, 0.0);
        assert!(std::ptr::eq(result.features, &features));
    }

    #[test]
    fn test_each_liquidation_costs_100() {
        let a = steady_depositor();
        let mut b = steady_depositor();
        b.liquidations = 3;

        let score_a = scorer().score(&a).score;
        let score_b = scorer().score(&b).score;
        assert_eq!(score_b, score_a - 300);
    }

    #[test]
    fn test_bot_penalty() {
        let a = steady_depositor();
        let mut b = steady_depositor();
        b.bot_like = true;

        let result = scorer().score(&b);
        assert_eq!(result.breakdown.bot_penalty, 150.0);
        assert_eq!(result.score, scorer().score(&a).score - 150);
    }

    #[test]
    fn test_clamped_at_zero() {
        let mut f = steady_depositor();
        f.liquidations = 1000;
        f.bot_like = true;
        assert_eq!(scorer().score(&f).score, 0);
    }

    #[test]
    fn test_clamped_at_max() {
        let mut f = steady_depositor();
        f.tx_count = 1_000_000;
        f.assets = (0..100).map(|i| format!("T{}", i)).collect();
        f.wallet_age_days = 10_000.0;
        assert_eq!(scorer().score(&f).score, 1000);
    }

    #[test]
    fn test_pathological_values_stay_in_range() {
        let mut f = steady_depositor();
        f.deposit_ratio = f64::NAN;
        f.wallet_age_days = f64::INFINITY;
        f.liquidations = u64::MAX;
        let score = scorer().score(&f).score;
        assert!(score <= 1000);

        let mut g = steady_depositor();
        g.deposit_ratio = 7.5;
        g.wallet_age_days = -3.0;
        assert!(scorer().score(&g).score <= 1000);
    }

    #[test]
    fn test_deterministic() {
        let f = steady_depositor();
        let s = scorer();
        assert_eq!(s.score(&f), s.score(&f));
    }

    #[test]
    fn test_monotonic_in_deposit_ratio() {
        let s = scorer();
        let mut previous = 0;
        for step in 0..=20 {
            let mut f = steady_depositor();
            f.deposit_ratio = step as f64 / 20.0;
            let score = s.score(&f).score;
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn test_monotonic_in_liquidations() {
        let s = scorer();
        let mut previous = u32::MAX;
        for liquidations in 0..15 {
            let mut f = steady_depositor();
            f.liquidations = liquidations;
            let score = s.score(&f).score;
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_saturation() {
        assert_eq!(saturate(0.0, 10.0), 0.0);
        assert_eq!(saturate(5.0, 10.0), 500.0);
        assert_eq!(saturate(10.0, 10.0), 1000.0);
        assert_eq!(saturate(50.0, 10.0), 1000.0);
        assert_eq!(saturate(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_injected_weights() {
        let config = ScoringConfig {
            weights: ScoringWeights {
                activity: 0.0,
                diversity: 0.0,
                deposit: 1.0,
                longevity: 0.0,
            },
            ..ScoringConfig::default()
        };
        let f = steady_depositor();
        assert_eq!(Scorer::new(config).score(&f).score, 1000);
    }
}
