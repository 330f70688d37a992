//! Response payloads for the account endpoints.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A flat JSON object, kept as-is so unknown or missing fields pass through.
pub type Record = Map<String, Value>;

/// `GET /api/v3/account` response. Only `balances` is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotAccount {
    /// Absent and `null` both read as no balances.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub balances: Vec<Record>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Record>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Record>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope wrapping every futures response.
///
/// `code` and `message` are kept as raw JSON; only `success` decides the outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct FuturesEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub code: Value,
    #[serde(default)]
    pub message: Value,
    #[serde(default)]
    pub data: Value,
}

/// Text of a pass-through field: strings verbatim, `null` empty, anything else as JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
