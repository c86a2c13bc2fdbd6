use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, TimeZone, Utc};
use std::str::FromStr;

use crate::tokens::registry::TokenRegistry;

use super::types::{
    ActionType, NumericField, RawRecord, RawTimestamp, RecordError, SkippedRecord, Transaction,
};

/// Result of decoding a batch of raw input elements.
#[derive(Debug, Default)]
pub struct DecodeOutcome {
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<SkippedRecord>,
}

/// Decode every element of the input array, skipping malformed ones.
/// Input order is preserved in `transactions`.
pub fn decode_records(values: Vec<serde_json::Value>, tokens: &TokenRegistry) -> DecodeOutcome {
    let mut outcome = DecodeOutcome {
        transactions: Vec::with_capacity(values.len()),
        skipped: Vec::new(),
    };

    for (index, value) in values.into_iter().enumerate() {
        let decoded = serde_json::from_value::<RawRecord>(value)
            .map_err(|e| RecordError::Shape(e.to_string()))
            .and_then(|raw| decode_record(raw, tokens));

        match decoded {
            Ok(tx) => outcome.transactions.push(tx),
            Err(reason) => {
                tracing::debug!(index, reason = %reason, "Skipping malformed record");
                outcome.skipped.push(SkippedRecord { index, reason });
            }
        }
    }

    if !outcome.skipped.is_empty() {
        tracing::warn!(
            skipped = outcome.skipped.len(),
            decoded = outcome.transactions.len(),
            "Some input records were malformed and skipped"
        );
    }

    outcome
}

/// Validate a raw record and convert it into a `Transaction`.
///
/// Required: wallet, action, timestamp and an amount: an explicit
/// `amount_usd`, `actionData.amount` with `actionData.assetPriceUSD`, or for
/// liquidations `actionData.principalAmount` with `borrowAssetPriceUSD`.
pub fn decode_record(raw: RawRecord, tokens: &TokenRegistry) -> Result<Transaction, RecordError> {
    let wallet = raw
        .wallet
        .as_deref()
        .map(normalize_wallet)
        .filter(|w| !w.is_empty())
        .ok_or(RecordError::MissingField("wallet"))?;

    let action_name = raw.action.as_deref().ok_or(RecordError::MissingField("action"))?;
    let action = ActionType::parse(action_name)
        .ok_or_else(|| RecordError::UnknownAction(action_name.to_string()))?;

    let timestamp = raw
        .timestamp
        .as_ref()
        .ok_or(RecordError::MissingField("timestamp"))
        .and_then(parse_timestamp)?;

    let asset = raw
        .asset
        .as_deref()
        .or_else(|| {
            raw.action_data.as_ref().and_then(|d| {
                d.asset_symbol
                    .as_deref()
                    .or(d.principal_reserve_symbol.as_deref())
            })
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let amount = match (&raw.amount_usd, &raw.action_data) {
        (Some(usd), _) => parse_decimal(usd)?,
        (None, Some(data)) => match (&data.amount, &data.principal_amount) {
            (Some(units), _) => {
                let price = data
                    .asset_price_usd
                    .as_ref()
                    .ok_or(RecordError::MissingField("assetPriceUSD"))?;
                let decimals = tokens.decimals_for(asset.as_deref());
                raw_to_usd(&parse_decimal(units)?, decimals, &parse_decimal(price)?)
            }
            // Liquidations are valued by the debt repaid on the wallet's behalf.
            (None, Some(principal)) => {
                let price = data
                    .borrow_asset_price_usd
                    .as_ref()
                    .ok_or(RecordError::MissingField("borrowAssetPriceUSD"))?;
                let decimals = tokens.decimals_for(data.principal_reserve_symbol.as_deref());
                raw_to_usd(&parse_decimal(principal)?, decimals, &parse_decimal(price)?)
            }
            (None, None) => return Err(RecordError::MissingField("amount")),
        },
        (None, None) => return Err(RecordError::MissingField("amount")),
    };

    let amount_usd = amount
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RecordError::InvalidAmount(amount.to_string()))?;

    Ok(Transaction {
        wallet,
        action,
        asset,
        amount_usd,
        timestamp,
    })
}

/// Lowercase hex addresses so different checksum casings group together.
/// Non-hex identifiers are only trimmed.
pub fn normalize_wallet(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()) => {
            format!("0x{}", digits.to_ascii_lowercase())
        }
        _ => trimmed.to_string(),
    }
}

fn parse_decimal(field: &NumericField) -> Result<BigDecimal, RecordError> {
    let text = field.as_text();
    let value =
        BigDecimal::from_str(&text).map_err(|_| RecordError::InvalidAmount(text.clone()))?;
    if value < BigDecimal::from(0) {
        return Err(RecordError::InvalidAmount(text));
    }
    Ok(value)
}

/// Convert a raw integer-unit token amount to USD using token decimals and price.
fn raw_to_usd(amount: &BigDecimal, decimals: u32, price: &BigDecimal) -> BigDecimal {
    let divisor = (0..decimals).fold(BigDecimal::from(1), |acc, _| acc * BigDecimal::from(10));
    amount * price / divisor
}

fn parse_timestamp(raw: &RawTimestamp) -> Result<DateTime<Utc>, RecordError> {
    let invalid = |s: String| RecordError::InvalidTimestamp(s);
    match raw {
        RawTimestamp::Seconds(secs) => Utc
            .timestamp_opt(*secs, 0)
            .single()
            .ok_or_else(|| invalid(secs.to_string())),
        RawTimestamp::FractionalSeconds(secs) => {
            if !secs.is_finite() {
                return Err(invalid(secs.to_string()));
            }
            let millis = (secs * 1000.0).round() as i64;
            DateTime::from_timestamp_millis(millis).ok_or_else(|| invalid(secs.to_string()))
        }
        RawTimestamp::Text(text) => {
            let text = text.trim();
            if let Ok(secs) = text.parse::<i64>() {
                return parse_timestamp(&RawTimestamp::Seconds(secs));
            }
            if let Ok(secs) = text.parse::<f64>() {
                return parse_timestamp(&RawTimestamp::FractionalSeconds(secs));
            }
            DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| invalid(text.to_string()))
        }
        RawTimestamp::Extended { date } => parse_timestamp(date),
    }
}
