use serde::de::Deserializer;
use serde::Deserialize;
use serde_json::Value;

/// Accepts a remote identifier sent either as a JSON string or number and
/// normalises it to a trimmed string. Missing, null or blank ids become "".
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => serde_json::to_string(&other).unwrap_or_default(),
    })
}
