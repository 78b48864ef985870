use crate::error::AnalyzerError;
use serde_json::Value;
use std::path::Path;
use vibration::TelemetrySample;

/// Loads a payload file holding either a single telemetry object or an array
/// of them. Every element is validated; the first bad one aborts the load.
pub fn load_samples(path: &Path) -> Result<Vec<TelemetrySample>, AnalyzerError> {
    let text = std::fs::read_to_string(path).map_err(|source| AnalyzerError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_str(&text).map_err(|source| AnalyzerError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let items = match value {
        Value::Object(_) => vec![value],
        Value::Array(items) => items,
        other => {
            return Err(AnalyzerError::UnexpectedShape {
                path: path.to_path_buf(),
                found: kind(&other),
            });
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|source| AnalyzerError::InvalidPayload {
                path: path.to_path_buf(),
                index,
                source,
            })
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
