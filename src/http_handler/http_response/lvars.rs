use crate::http_handler::http_response::response_common::SerdeJSONBodyHTTPResponseType;
use std::collections::HashMap;

/// Response type for the GET /lvars endpoint: a flat snapshot of simulator variables.
///
/// Values are kept as raw json, the host reports unreadable variables as `null`.
#[derive(serde::Deserialize, Debug, Default, Clone)]
#[serde(transparent)]
pub(crate) struct VariableSnapshotResponse {
    values: HashMap<String, serde_json::Value>,
}

impl SerdeJSONBodyHTTPResponseType for VariableSnapshotResponse {}

impl VariableSnapshotResponse {
    /// Numeric value of `key`, numeric strings are accepted as well.
    pub(crate) fn number(&self, key: &str) -> Option<f64> {
        let value = match self.values.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    pub(crate) fn len(&self) -> usize { self.values.len() }

    #[cfg(test)]
    pub(crate) fn from_values(values: HashMap<String, serde_json::Value>) -> Self { Self { values } }
}
