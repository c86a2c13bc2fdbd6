use std::path::Path;

/// Read the transaction export: a JSON array of records.
///
/// Fails only when the file cannot be read or is not a JSON array. Individual
/// elements are returned untouched and validated later by the decoder.
pub fn read_records(path: &Path) -> eyre::Result<Vec<serde_json::Value>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        eyre::eyre!(
            "Failed to read transactions file '{}': {}",
            path.display(),
            e
        )
    })?;

    let records = parse_records(&content)
        .map_err(|e| eyre::eyre!("Invalid JSON in '{}': {}", path.display(), e))?;

    tracing::info!(records = records.len(), path = %path.display(), "Loaded transaction records");
    Ok(records)
}

/// Parse the file contents into raw JSON elements.
pub fn parse_records(content: &str) -> eyre::Result<Vec<serde_json::Value>> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    match value {
        serde_json::Value::Array(records) => Ok(records),
        other => Err(eyre::eyre!(
            "expected a top-level array of transactions, found {}",
            json_kind(&other)
        )),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
