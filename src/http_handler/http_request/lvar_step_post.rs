use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};
use crate::http_handler::http_response::status::StatusResponse;

/// Request type for the POST /lvars/step endpoint, increments a named simulator variable.
#[derive(serde::Serialize, Debug)]
pub(crate) struct VariableStepRequest {
    pub(crate) key: String,
    pub(crate) delta: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) profile: Option<String>,
}

impl JSONBodyHTTPRequestType for VariableStepRequest {
    type Body = VariableStepRequest;
    fn body(&self) -> &Self::Body { self }
}

impl HTTPRequestType for VariableStepRequest {
    type Response = StatusResponse;
    fn endpoint(&self) -> &'static str { "/lvars/step" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Post }
}
