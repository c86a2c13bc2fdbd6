use serde::Serialize;

use crate::pipeline::{ScoreRun, WalletDetail};

/// Width of each histogram bin over the 0–1000 score range.
pub const BIN_WIDTH: u32 = 100;
pub const BIN_COUNT: usize = 10;

/// Credit categories used for the behavioural breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CreditCategory {
    VeryPoor,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl CreditCategory {
    pub const ALL: [CreditCategory; 5] = [
        Self::VeryPoor,
        Self::Poor,
        Self::Fair,
        Self::Good,
        Self::Excellent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::VeryPoor => "Very Poor",
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }

    /// Lower (inclusive) and upper bound. Upper is exclusive except for
    /// `Excellent`, which includes a perfect 1000.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            Self::VeryPoor => (0, 200),
            Self::Poor => (200, 400),
            Self::Fair => (400, 600),
            Self::Good => (600, 800),
            Self::Excellent => (800, 1000),
        }
    }

    pub fn suggested_action(&self) -> &'static str {
        match self {
            Self::VeryPoor => "Strict limits, potential restrictions",
            Self::Poor => "Reduced limits, increased monitoring",
            Self::Fair => "Educational outreach, moderate limits",
            Self::Good => "Monitor for upgrade potential",
            Self::Excellent => "Offer preferential rates, higher limits",
        }
    }

    pub fn for_score(score: u32) -> Self {
        match score {
            0..=199 => Self::VeryPoor,
            200..=399 => Self::Poor,
            400..=599 => Self::Fair,
            600..=799 => Self::Good,
            _ => Self::Excellent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinCount {
    pub lower: u32,
    pub upper: u32,
    pub count: usize,
    pub percentage: f64,
}

impl BinCount {
    pub fn label(&self) -> String {
        format!("{}-{}", self.lower, self.upper)
    }
}

/// Behavioural profile of the wallets that fall into one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: CreditCategory,
    pub name: &'static str,
    pub lower: u32,
    pub upper: u32,
    pub wallet_count: usize,
    pub share_pct: f64,
    pub median_tx_count: f64,
    pub median_assets: f64,
    pub median_deposit_ratio: f64,
    pub liquidated_pct: f64,
    pub median_age_days: f64,
    pub bot_like_pct: f64,
    pub median_volume_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub wallet_count: usize,
    pub transaction_count: usize,
    pub skipped_records: usize,
    pub distribution: Vec<BinCount>,
    pub categories: Vec<CategorySummary>,
}

/// Aggregate a scoring run into the distribution and category breakdowns.
pub fn summarize(run: &ScoreRun) -> ReportSummary {
    let total = run.scores.len();

    let mut counts = [0usize; BIN_COUNT];
    for &score in run.scores.values() {
        let bin = ((score / BIN_WIDTH) as usize).min(BIN_COUNT - 1);
        counts[bin] += 1;
    }
    let distribution = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| BinCount {
            lower: i as u32 * BIN_WIDTH,
            upper: (i as u32 + 1) * BIN_WIDTH,
            count,
            percentage: percentage(count, total),
        })
        .collect();

    let categories = CreditCategory::ALL
        .iter()
        .filter_map(|&category| {
            let members: Vec<&WalletDetail> = run
                .details
                .values()
                .filter(|d| CreditCategory::for_score(d.score) == category)
                .collect();
            summarize_category(category, &members, total)
        })
        .collect();

    ReportSummary {
        wallet_count: total,
        transaction_count: run.transactions,
        skipped_records: run.skipped.len(),
        distribution,
        categories,
    }
}

fn summarize_category(
    category: CreditCategory,
    members: &[&WalletDetail],
    total: usize,
) -> Option<CategorySummary> {
    if members.is_empty() {
        return None;
    }

    let liquidated = members.iter().filter(|d| d.features.liquidations > 0).count();
    let bots = members.iter().filter(|d| d.features.bot_like).count();
    let (lower, upper) = category.bounds();

    Some(CategorySummary {
        category,
        name: category.name(),
        lower,
        upper,
        wallet_count: members.len(),
        share_pct: percentage(members.len(), total),
        median_tx_count: median_of(members, |d| d.features.tx_count as f64),
        median_assets: median_of(members, |d| d.features.assets.len() as f64),
        median_deposit_ratio: median_of(members, |d| d.features.deposit_ratio),
        liquidated_pct: percentage(liquidated, members.len()),
        median_age_days: median_of(members, |d| d.features.wallet_age_days),
        bot_like_pct: percentage(bots, members.len()),
        median_volume_usd: median_of(members, |d| d.features.total_usd_volume),
    })
}

fn median_of(members: &[&WalletDetail], field: impl Fn(&WalletDetail) -> f64) -> f64 {
    median(members.iter().map(|d| field(d)).collect())
}

/// Median of the values; the mean of the two middle values for even counts.
/// Zero for an empty input.
pub fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
