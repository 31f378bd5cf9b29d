use crate::http_handler::http_response::response_common::SerdeJSONBodyHTTPResponseType;

/// Response type of the command endpoints (/update_sim, /lvars, /lvars/step).
#[derive(serde::Deserialize, Debug, Default)]
pub(crate) struct StatusResponse {
    /// `"success"`, `"ok"` or `"ignored"`.
    #[serde(default)]
    status: Option<String>,
}

impl SerdeJSONBodyHTTPResponseType for StatusResponse {}

impl StatusResponse {
    pub(crate) fn status(&self) -> &str { self.status.as_deref().unwrap_or("unknown") }
}
