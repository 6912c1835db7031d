use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use attrition_classifiers::config::AttritionConfig;
use attrition_classifiers::data_handling::Cell;

/// Load an `AttritionConfig` from a JSON file. Missing fields take defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AttritionConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: AttritionConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

/// The config at `path`, or the defaults when no path is given.
pub fn load_config_or_default(path: Option<&Path>) -> Result<AttritionConfig> {
    match path {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            load_config(path)
        }
        None => Ok(AttritionConfig::default()),
    }
}

/// Parse one record given as a JSON object of column -> value.
///
/// Blank entries (`null` or empty strings) are left out of the result. String
/// values are re-parsed so `"41"` and `41` mean the same thing.
pub fn parse_record(json: &str) -> Result<HashMap<String, Cell>> {
    let value: Value = serde_json::from_str(json).context("Record is not valid JSON")?;
    let object = match value {
        Value::Object(object) => object,
        other => bail!("Record must be a JSON object, got: {}", other),
    };

    let mut record = HashMap::with_capacity(object.len());
    for (column, value) in object {
        let cell = match value {
            Value::Null => continue,
            Value::Bool(b) => Cell::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => Cell::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) if s.trim().is_empty() => continue,
            Value::String(s) => Cell::parse(&s),
            other => bail!("Unsupported value for '{}': {}", column, other),
        };
        record.insert(column, cell);
    }
    Ok(record)
}

pub fn load_record<P: AsRef<Path>>(path: P) -> Result<HashMap<String, Cell>> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read record: {}", path.as_ref().display()))?;
    parse_record(&content)
        .with_context(|| format!("Failed to parse record: {}", path.as_ref().display()))
}
