use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};
use crate::http_handler::http_response::lvars::VariableSnapshotResponse;

/// Request type for the GET /lvars endpoint, the authoritative state poll.
#[derive(Debug)]
pub(crate) struct VariableSnapshotRequest {}

impl NoBodyHTTPRequestType for VariableSnapshotRequest {}

impl HTTPRequestType for VariableSnapshotRequest {
    type Response = VariableSnapshotResponse;
    fn endpoint(&self) -> &'static str { "/lvars" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
}
