use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};
use crate::http_handler::http_response::profile::ProfileResponse;

/// Request type for the /profiles/{id}.json endpoint.
#[derive(Debug)]
pub(crate) struct ProfileRequest {
    path: String,
}

impl ProfileRequest {
    pub(crate) fn new(profile_id: &str) -> Self {
        Self { path: format!("/profiles/{profile_id}.json") }
    }
}

impl NoBodyHTTPRequestType for ProfileRequest {}

impl HTTPRequestType for ProfileRequest {
    type Response = ProfileResponse;
    fn endpoint(&self) -> &str { self.path.as_str() }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
}
