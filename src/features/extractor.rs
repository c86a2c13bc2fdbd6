use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::BotDetectionConfig;
use crate::ingest::types::{ActionType, Transaction};

use super::timing;

/// Behavioural features of one wallet, derived once from its full history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletFeatures {
    pub wallet: String,
    pub tx_count: u64,
    pub assets: BTreeSet<String>,
    /// deposits / (deposits + borrows) by USD value; 0 when both are 0.
    pub deposit_ratio: f64,
    pub liquidations: u64,
    pub wallet_age_days: f64,
    pub total_usd_volume: f64,
    pub bot_like: bool,
    pub deposit_usd: f64,
    pub borrow_usd: f64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Groups validated transactions by wallet and derives per-wallet features.
pub struct FeatureExtractor {
    bot_detection: BotDetectionConfig,
}

impl FeatureExtractor {
    pub fn new(bot_detection: BotDetectionConfig) -> Self {
        Self { bot_detection }
    }

    /// Extract features for every wallet present in `transactions`.
    /// Each wallet's records keep their relative input order.
    pub fn extract(&self, transactions: &[Transaction]) -> BTreeMap<String, WalletFeatures> {
        let features: BTreeMap<String, WalletFeatures> = group_by_wallet(transactions)
            .into_iter()
            .filter_map(|(wallet, txs)| {
                self.wallet_features(wallet, &txs)
                    .map(|f| (wallet.to_string(), f))
            })
            .collect();

        tracing::debug!(
            transactions = transactions.len(),
            wallets = features.len(),
            "Extracted wallet features"
        );
        features
    }

    /// Features for a single wallet's transactions. `None` for an empty slice.
    pub fn wallet_features(&self, wallet: &str, txs: &[&Transaction]) -> Option<WalletFeatures> {
        if txs.is_empty() {
            return None;
        }

        let mut assets = BTreeSet::new();
        let mut deposit_usd = 0.0;
        let mut borrow_usd = 0.0;
        let mut total_usd_volume = 0.0;
        let mut liquidations = 0u64;

        for tx in txs {
            if let Some(asset) = &tx.asset {
                assets.insert(asset.clone());
            }
            match tx.action {
                ActionType::Deposit => deposit_usd += tx.amount_usd,
                ActionType::Borrow => borrow_usd += tx.amount_usd,
                ActionType::Liquidation => liquidations += 1,
                ActionType::Repay | ActionType::Withdraw => {}
            }
            total_usd_volume += tx.amount_usd;
        }

        let denominator = deposit_usd + borrow_usd;
        let deposit_ratio = if denominator > 0.0 {
            deposit_usd / denominator
        } else {
            0.0
        };

        let mut timestamps: Vec<DateTime<Utc>> = txs.iter().map(|tx| tx.timestamp).collect();
        timestamps.sort();
        let first_seen = timestamps[0];
        let last_seen = timestamps[timestamps.len() - 1];
        let wallet_age_days = (last_seen - first_seen).num_seconds() as f64 / 86_400.0;

        let tx_count = txs.len() as u64;
        let stats = timing::interval_stats(&timestamps);
        let bot_like = timing::is_bot_like(tx_count, stats.as_ref(), &self.bot_detection);

        Some(WalletFeatures {
            wallet: wallet.to_string(),
            tx_count,
            assets,
            deposit_ratio,
            liquidations,
            wallet_age_days,
            total_usd_volume,
            bot_like,
            deposit_usd,
            borrow_usd,
            first_seen,
            last_seen,
        })
    }
}

/// Group transactions by wallet. Each group keeps input order.
pub fn group_by_wallet(transactions: &[Transaction]) -> BTreeMap<&str, Vec<&Transaction>> {
    let mut by_wallet: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for tx in transactions {
        by_wallet.entry(tx.wallet.as_str()).or_default().push(tx);
    }
    by_wallet
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DAY: i64 = 86_400;

    fn tx(wallet: &str, action: ActionType, asset: &str, usd: f64, secs: i64) -> Transaction {
        Transaction {
            wallet: wallet.to_string(),
            action,
            asset: Some(asset.to_string()),
            amount_usd: usd,
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(BotDetectionConfig::default())
    }

    #[test]
    fn test_empty_input() {
        assert!(extractor().extract(&[]).is_empty());
    }

    #[test]
    fn test_groups_by_wallet() {
        let txs = vec![
            tx("a", ActionType::Deposit, "USDC", 100.0, 0),
            tx("b", ActionType::Borrow, "DAI", 50.0, 10),
            tx("a", ActionType::Deposit, "WETH", 300.0, 2 * DAY),
            tx("a", ActionType::Borrow, "USDC", 100.0, 3 * DAY),
            tx("a", ActionType::Liquidation, "WETH", 80.0, 4 * DAY),
        ];

        let features = extractor().extract(&txs);
        assert_eq!(features.len(), 2);

        let a = &features["a"];
        assert_eq!(a.tx_count, 4);
        assert_eq!(a.assets.len(), 2);
        assert_eq!(a.deposit_usd, 400.0);
        assert_eq!(a.borrow_usd, 100.0);
        assert!((a.deposit_ratio - 0.8).abs() < 1e-12);
        assert_eq!(a.liquidations, 1);
        assert_eq!(a.wallet_age_days, 4.0);
        assert_eq!(a.total_usd_volume, 580.0);
        assert!(!a.bot_like);

        let b = &features["b"];
        assert_eq!(b.tx_count, 1);
        assert_eq!(b.deposit_ratio, 0.0);
        assert_eq!(b.wallet_age_days, 0.0);
    }

    #[test]
    fn test_grouping_keeps_input_order() {
        // timestamps deliberately out of order; grouping must not sort
        let txs = vec![
            tx("a", ActionType::Borrow, "USDC", 1.0, 5 * DAY),
            tx("b", ActionType::Deposit, "DAI", 2.0, 0),
            tx("a", ActionType::Deposit, "WETH", 3.0, DAY),
            tx("b", ActionType::Repay, "DAI", 4.0, 9 * DAY),
            tx("a", ActionType::Repay, "USDC", 5.0, 3 * DAY),
        ];

        let groups = group_by_wallet(&txs);
        assert_eq!(groups.len(), 2);
        let amounts = |w: &str| groups[w].iter().map(|t| t.amount_usd).collect::<Vec<_>>();
        assert_eq!(amounts("a"), vec![1.0, 3.0, 5.0]);
        assert_eq!(amounts("b"), vec![2.0, 4.0]);
        assert!(std::ptr::eq(groups["a"][1], &txs[2]));
    }

    #[test]
    fn test_ratio_zero_without_deposit_or_borrow() {
        let txs = vec![
            tx("a", ActionType::Repay, "USDC", 10.0, 0),
            tx("a", ActionType::Withdraw, "USDC", 10.0, DAY),
        ];
        let features = extractor().extract(&txs);
        assert_eq!(features["a"].deposit_ratio, 0.0);
        assert_eq!(features["a"].total_usd_volume, 20.0);
    }

    #[test]
    fn test_out_of_order_age_is_positive() {
        let txs = vec![
            tx("a", ActionType::Deposit, "USDC", 1.0, 10 * DAY),
            tx("a", ActionType::Deposit, "USDC", 1.0, 0),
            tx("a", ActionType::Deposit, "USDC", 1.0, 5 * DAY),
        ];
        let f = &extractor().extract(&txs)["a"];
        assert_eq!(f.wallet_age_days, 10.0);
        assert_eq!(f.first_seen.timestamp(), 0);
        assert_eq!(f.last_seen.timestamp(), 10 * DAY);
    }

    #[test]
    fn test_assetless_record_counts_elsewhere() {
        let mut no_asset = tx("a", ActionType::Deposit, "", 5.0, 0);
        no_asset.asset = None;
        let txs = vec![no_asset, tx("a", ActionType::Deposit, "USDC", 5.0, DAY)];

        let f = &extractor().extract(&txs)["a"];
        assert_eq!(f.tx_count, 2);
        assert_eq!(f.assets.len(), 1);
        assert_eq!(f.deposit_usd, 10.0);
    }

    #[test]
    fn test_regular_busy_wallet_is_bot_like() {
        let txs: Vec<_> = (0..30)
            .map(|i| tx("bot", ActionType::Deposit, "USDC", 1.0, i * 3600))
            .collect();
        assert!(extractor().extract(&txs)["bot"].bot_like);
    }

    #[test]
    fn test_wallet_features_empty_slice() {
        assert!(extractor().wallet_features("a", &[]).is_none());
    }
}
