use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lending-protocol action types the scorer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Deposit,
    Borrow,
    Repay,
    Withdraw,
    Liquidation,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Borrow => "borrow",
            Self::Repay => "repay",
            Self::Withdraw => "withdraw",
            Self::Liquidation => "liquidation",
        }
    }

    /// Parse an action name. Accepts the Aave V2 event names
    /// (`redeemunderlying`, `liquidationcall`) as aliases.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "deposit" => Some(Self::Deposit),
            "borrow" => Some(Self::Borrow),
            "repay" => Some(Self::Repay),
            "withdraw" | "redeemunderlying" => Some(Self::Withdraw),
            "liquidation" | "liquidationcall" => Some(Self::Liquidation),
            _ => None,
        }
    }
}

/// A validated lending-protocol event, ready for feature extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub wallet: String,
    pub action: ActionType,
    pub asset: Option<String>,
    pub amount_usd: f64,
    pub timestamp: DateTime<Utc>,
}

// ============================================================
// Raw input records
// ============================================================

/// One element of the input array before validation. Every field is
/// optional so that a missing key surfaces as a `RecordError` instead of
/// failing the whole file.
#[derive(Debug, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "userWallet", alias = "wallet_address")]
    pub wallet: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default, alias = "asset_symbol")]
    pub asset: Option<String>,
    #[serde(default, alias = "amountUSD", alias = "usd_amount")]
    pub amount_usd: Option<NumericField>,
    #[serde(default, rename = "actionData")]
    pub action_data: Option<RawActionData>,
}

/// Nested `actionData` object of the Aave V2 export.
#[derive(Debug, Default, Deserialize)]
pub struct RawActionData {
    #[serde(default)]
    pub amount: Option<NumericField>,
    #[serde(default, rename = "assetSymbol")]
    pub asset_symbol: Option<String>,
    #[serde(default, rename = "assetPriceUSD")]
    pub asset_price_usd: Option<NumericField>,
    // `liquidationcall` records carry a repaid-debt (principal) leg and a
    // seized-collateral leg instead of `amount`; only the principal is read.
    #[serde(default, rename = "principalAmount")]
    pub principal_amount: Option<NumericField>,
    #[serde(default, rename = "principalReserveSymbol")]
    pub principal_reserve_symbol: Option<String>,
    #[serde(default, rename = "borrowAssetPriceUSD")]
    pub borrow_asset_price_usd: Option<NumericField>,
}

/// Exports mix JSON numbers and numeric strings for the same field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(serde_json::Number),
    Text(String),
}

impl NumericField {
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Seconds(i64),
    FractionalSeconds(f64),
    Text(String),
    Extended {
        #[serde(rename = "$date")]
        date: Box<RawTimestamp>,
    },
}

// ============================================================
// Record-level errors
// ============================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("record has unexpected shape: {0}")]
    Shape(String),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// A record dropped at the input boundary, with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: RecordError,
}
