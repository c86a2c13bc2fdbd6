use chrono::{DateTime, Utc};

use crate::config::BotDetectionConfig;

/// Summary of the gaps between consecutive transactions of one wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalStats {
    pub intervals: usize,
    pub mean_secs: f64,
    pub std_dev_secs: f64,
}

impl IntervalStats {
    /// Standard deviation relative to the mean. Zero mean (every transaction
    /// at the same instant) counts as perfectly regular.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean_secs > 0.0 {
            self.std_dev_secs / self.mean_secs
        } else {
            0.0
        }
    }
}

/// Compute interval statistics over chronologically sorted timestamps.
/// Returns `None` when there are fewer than two timestamps.
pub fn interval_stats(sorted: &[DateTime<Utc>]) -> Option<IntervalStats> {
    if sorted.len() < 2 {
        return None;
    }

    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_milliseconds() as f64 / 1000.0)
        .collect();

    let n = gaps.len() as f64;
    let mean = gaps.iter().sum::<f64>() / n;
    let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / n;

    Some(IntervalStats {
        intervals: gaps.len(),
        mean_secs: mean,
        std_dev_secs: variance.sqrt(),
    })
}

/// A wallet looks automated when it is busier than the configured minimum
/// and its transactions are either evenly spaced or fired at machine speed.
pub fn is_bot_like(
    tx_count: u64,
    stats: Option<&IntervalStats>,
    config: &BotDetectionConfig,
) -> bool {
    if tx_count <= config.min_transactions {
        return false;
    }
    let Some(stats) = stats else {
        return false;
    };

    stats.coefficient_of_variation() <= config.max_interval_cv
        || stats.mean_secs < config.min_mean_interval_secs
}
