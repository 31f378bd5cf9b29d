use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};
use crate::http_handler::http_response::status::StatusResponse;

/// Request type for the POST /lvars endpoint, writes a named simulator variable.
#[derive(serde::Serialize, Debug)]
pub(crate) struct VariableSetRequest {
    pub(crate) key: String,
    pub(crate) value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) profile: Option<String>,
}

impl JSONBodyHTTPRequestType for VariableSetRequest {
    type Body = VariableSetRequest;
    fn body(&self) -> &Self::Body { self }
}

impl HTTPRequestType for VariableSetRequest {
    type Response = StatusResponse;
    fn endpoint(&self) -> &'static str { "/lvars" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Post }
}
