use serde::Serialize;
use std::path::Path;

use crate::pipeline::{ScoreRun, WalletDetail};

use super::summary::ReportSummary;

/// One flat CSV row per wallet.
#[derive(Debug, Serialize)]
struct ScoreRow<'a> {
    wallet: &'a str,
    score: u32,
    activity: f64,
    diversity: f64,
    deposit: f64,
    longevity: f64,
    liquidation_penalty: f64,
    bot_penalty: f64,
    tx_count: u64,
    distinct_assets: usize,
    assets: String,
    deposit_ratio: f64,
    liquidations: u64,
    wallet_age_days: f64,
    total_usd_volume: f64,
    deposit_usd: f64,
    borrow_usd: f64,
    bot_like: bool,
    first_seen: String,
    last_seen: String,
}

impl<'a> ScoreRow<'a> {
    fn from_detail(wallet: &'a str, detail: &WalletDetail) -> Self {
        let f = &detail.features;
        let b = &detail.breakdown;
        Self {
            wallet,
            score: detail.score,
            activity: b.activity,
            diversity: b.diversity,
            deposit: b.deposit,
            longevity: b.longevity,
            liquidation_penalty: b.liquidation_penalty,
            bot_penalty: b.bot_penalty,
            tx_count: f.tx_count,
            distinct_assets: f.assets.len(),
            assets: f.assets.iter().cloned().collect::<Vec<_>>().join(";"),
            deposit_ratio: f.deposit_ratio,
            liquidations: f.liquidations,
            wallet_age_days: f.wallet_age_days,
            total_usd_volume: f.total_usd_volume,
            deposit_usd: f.deposit_usd,
            borrow_usd: f.borrow_usd,
            bot_like: f.bot_like,
            first_seen: f.first_seen.to_rfc3339(),
            last_seen: f.last_seen.to_rfc3339(),
        }
    }
}

/// Write per-wallet scores and features as CSV, ordered by wallet address.
pub fn write_scores_csv(path: &Path, run: &ScoreRun) -> eyre::Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| eyre::eyre!("Failed to create scores CSV '{}': {}", path.display(), e))?;

    let mut rows = 0;
    for (wallet, detail) in &run.details {
        writer.serialize(ScoreRow::from_detail(wallet, detail))?;
        rows += 1;
    }
    writer.flush()?;

    tracing::info!(rows, path = %path.display(), "Wallet scores exported");
    Ok(rows)
}

/// Write the report summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &ReportSummary) -> eyre::Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)
        .map_err(|e| eyre::eyre!("Failed to write summary '{}': {}", path.display(), e))?;
    tracing::info!(path = %path.display(), "Summary JSON written");
    Ok(())
}
