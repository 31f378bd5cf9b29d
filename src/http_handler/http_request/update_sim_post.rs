use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};
use crate::control::SimCommand;
use crate::http_handler::http_response::status::StatusResponse;

/// Request type for the /update_sim endpoint.
///
/// The body is the tagged command object with the active profile id appended.
#[derive(Debug)]
pub(crate) struct UpdateSimRequest {
    body: serde_json::Value,
}

impl UpdateSimRequest {
    pub(crate) fn new(command: &SimCommand, profile: Option<&str>) -> Result<Self, serde_json::Error> {
        let mut body = serde_json::to_value(command)?;
        if let (Some(profile), serde_json::Value::Object(map)) = (profile, &mut body) {
            map.insert("profile".into(), serde_json::Value::from(profile));
        }
        Ok(Self { body })
    }

    #[cfg(test)]
    pub(crate) fn body_ref(&self) -> &serde_json::Value { &self.body }
}

impl JSONBodyHTTPRequestType for UpdateSimRequest {
    type Body = serde_json::Value;
    fn body(&self) -> &Self::Body { &self.body }
}

impl HTTPRequestType for UpdateSimRequest {
    type Response = StatusResponse;
    fn endpoint(&self) -> &'static str { "/update_sim" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Post }
}
