use std::fmt::Write as _;
use std::path::Path;

use crate::config::ScoringConfig;

use super::summary::{CreditCategory, ReportSummary};

/// Widest text bar in the distribution table.
const BAR_WIDTH: usize = 40;

/// Render the wallet credit analysis report as markdown.
pub fn render_markdown(summary: &ReportSummary, scoring: &ScoringConfig) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, summary, scoring);
    out
}

/// Render the report and write it to `path`.
pub fn write_markdown(
    path: &Path,
    summary: &ReportSummary,
    scoring: &ScoringConfig,
) -> eyre::Result<()> {
    std::fs::write(path, render_markdown(summary, scoring))
        .map_err(|e| eyre::eyre!("Failed to write report '{}': {}", path.display(), e))?;
    tracing::info!(path = %path.display(), "Markdown report written");
    Ok(())
}

fn write_report(
    out: &mut String,
    summary: &ReportSummary,
    scoring: &ScoringConfig,
) -> std::fmt::Result {
    writeln!(out, "# Aave V2 Wallet Credit Score Analysis\n")?;
    writeln!(out, "## Overview\n")?;
    writeln!(
        out,
        "Analyzed {} unique wallets from {} transactions ({} malformed records skipped).\n",
        summary.wallet_count, summary.transaction_count, summary.skipped_records
    )?;

    writeln!(out, "## Score Distribution\n")?;
    writeln!(out, "| Score Range | Number of Wallets | Percentage | |")?;
    writeln!(out, "|-------------|-------------------|------------|---|")?;
    let peak = summary.distribution.iter().map(|b| b.count).max().unwrap_or(0);
    for bin in &summary.distribution {
        writeln!(
            out,
            "| {} | {} | {:.1}% | `{}` |",
            bin.label(),
            bin.count,
            bin.percentage,
            bar(bin.count, peak)
        )?;
    }

    writeln!(out, "\n## Detailed Wallet Analysis by Credit Category")?;
    for cat in &summary.categories {
        writeln!(out, "\n### {} ({}-{})", cat.name, cat.lower, cat.upper)?;
        writeln!(
            out,
            "Count: {} wallets ({:.1}% of total)\n",
            cat.wallet_count, cat.share_pct
        )?;
        writeln!(out, "Behavioral Characteristics:")?;
        writeln!(
            out,
            "- Transactions: Median {:.1} per wallet",
            cat.median_tx_count
        )?;
        writeln!(out, "- Assets: Median {:.1} different assets", cat.median_assets)?;
        writeln!(
            out,
            "- Deposit Ratio: Median {:.1}%",
            cat.median_deposit_ratio * 100.0
        )?;
        writeln!(out, "- Liquidations: {:.1}% of wallets", cat.liquidated_pct)?;
        writeln!(out, "- Wallet Age: Median {:.1} days", cat.median_age_days)?;
        writeln!(out, "- Bot-like Patterns: {:.1}% of wallets", cat.bot_like_pct)?;
        writeln!(
            out,
            "- Median Volume: ${} USD",
            format_usd(cat.median_volume_usd)
        )?;
    }

    writeln!(out, "\n## Risk Recommendations\n")?;
    writeln!(out, "| Category | Suggested Action |")?;
    writeln!(out, "|----------|------------------|")?;
    for category in CreditCategory::ALL.iter().rev() {
        let (lower, upper) = category.bounds();
        writeln!(
            out,
            "| {} ({}-{}) | {} |",
            category.name(),
            lower,
            upper,
            category.suggested_action()
        )?;
    }

    let w = &scoring.weights;
    writeln!(out, "\n## Methodology\n")?;
    writeln!(out, "Credit scores (0-1000) incorporate:")?;
    writeln!(
        out,
        "- Transaction Activity ({:.0}%): transaction count, saturating at {}",
        w.activity * 100.0,
        scoring.activity_cap
    )?;
    writeln!(
        out,
        "- Asset Diversity ({:.0}%): distinct assets, saturating at {}",
        w.diversity * 100.0,
        scoring.diversity_cap
    )?;
    writeln!(
        out,
        "- Deposit Behavior ({:.0}%): deposit-to-borrow ratio",
        w.deposit * 100.0
    )?;
    writeln!(
        out,
        "- Wallet Longevity ({:.0}%): days between first and last transaction, saturating at {}",
        w.longevity * 100.0,
        scoring.age_cap_days
    )?;
    writeln!(
        out,
        "- Risk Penalties: Liquidations (-{} each), bot-like patterns (-{})",
        scoring.liquidation_penalty, scoring.bot_penalty
    )?;
    Ok(())
}

fn bar(count: usize, peak: usize) -> String {
    if peak == 0 || count == 0 {
        return String::new();
    }
    let len = ((count * BAR_WIDTH) as f64 / peak as f64).ceil() as usize;
    "#".repeat(len.max(1))
}

/// Two decimals with thousands separators, e.g. `1,234,567.89`.
pub fn format_usd(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
