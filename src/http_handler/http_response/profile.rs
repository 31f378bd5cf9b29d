use crate::http_handler::http_response::response_common::SerdeJSONBodyHTTPResponseType;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use std::collections::HashMap;

/// Response type for the /profiles/{id}.json endpoint.
///
/// Every field is optional and parsed leniently: a field of the wrong shape is treated
/// as absent so the profile falls back to its documented default instead of failing the load.
#[derive(Deserialize, Debug, Default, Clone)]
pub(crate) struct ProfileResponse {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    ui: Option<UiSection>,
    #[serde(default, deserialize_with = "lenient")]
    mappings: Option<MappingSection>,
}

impl SerdeJSONBodyHTTPResponseType for ProfileResponse {}

impl ProfileResponse {
    pub(crate) fn name(&self) -> Option<&str> { self.name.as_deref() }
    pub(crate) fn ui(&self) -> Option<&UiSection> { self.ui.as_ref() }
    pub(crate) fn vjoy(&self) -> Option<&HashMap<String, serde_json::Value>> {
        self.mappings.as_ref().and_then(|m| m.vjoy.as_ref())
    }
}

/// The `ui` block of a profile document.
#[derive(Deserialize, Debug, Default, Clone)]
pub(crate) struct UiSection {
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) camera_config: Option<Vec<CameraEntry>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) flap_detents: Option<Vec<DetentEntry>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) throttle_detents: Option<Vec<DetentEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) control_sensitivity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) control_response: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) throttle_detent_snap: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) reverse_behavior: Option<ReverseBehaviorEntry>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) arm_spoilers_button: Option<bool>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct CameraEntry {
    pub(crate) id: u32,
    #[serde(default)]
    pub(crate) name: String,
}

/// A single detent row. Flap rows carry an `index`, throttle rows don't.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct DetentEntry {
    #[serde(default)]
    pub(crate) index: Option<u32>,
    #[serde(default)]
    pub(crate) label: String,
    #[serde(alias = "value")]
    pub(crate) val: f64,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub(crate) struct ReverseBehaviorEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) spool_down_ms: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) idle_floor: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) idle_rev: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) idle_bump_up: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) idle_bump_ms: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) idle_bump_down: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
struct MappingSection {
    #[serde(default, deserialize_with = "lenient")]
    vjoy: Option<HashMap<String, serde_json::Value>>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like `lenient`, but drops malformed entries of a list instead of the whole list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(entries) => Ok(Some(
            entries.into_iter().filter_map(|e| serde_json::from_value(e).ok()).collect(),
        )),
        _ => Ok(None),
    }
}
