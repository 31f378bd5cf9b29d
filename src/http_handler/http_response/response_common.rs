use strum_macros::Display;

pub(crate) trait JSONBodyHTTPResponseType: HTTPResponseType {
    async fn parse_json_body(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError>
    where Self::ParsedResponseType: for<'de> serde::Deserialize<'de> {
        Ok(response.json::<Self::ParsedResponseType>().await?)
    }
}

/// Marker for response types that are plain serde documents.
pub(crate) trait SerdeJSONBodyHTTPResponseType {}

impl<T> JSONBodyHTTPResponseType for T
where
    T: SerdeJSONBodyHTTPResponseType,
    for<'de> T: serde::Deserialize<'de>,
{
}

impl<T> HTTPResponseType for T
where
    T: SerdeJSONBodyHTTPResponseType,
    for<'de> T: serde::Deserialize<'de>,
{
    type ParsedResponseType = T;

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError> {
        let resp = Self::unwrap_return_code(response).await?;
        Self::parse_json_body(resp).await
    }
}

pub(crate) trait HTTPResponseType {
    type ParsedResponseType;
    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError>;

    async fn unwrap_return_code(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ResponseError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else if status.is_client_error() {
            let detail = response.json::<ErrorReturn>().await.unwrap_or_default();
            Err(ResponseError::BadRequest(detail))
        } else if status.is_server_error() {
            // the host reports missing simulator links as 5xx with an error body
            let detail = response.json::<ErrorReturn>().await.unwrap_or_default();
            Err(ResponseError::InternalServer(detail))
        } else {
            Err(ResponseError::Unknown)
        }
    }
}

/// Error body returned by the simulator host, e.g. `{"error": "No vJoy"}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ErrorReturn {
    #[serde(default)]
    error: Option<String>,
}

impl ErrorReturn {
    pub fn reason(&self) -> &str { self.error.as_deref().unwrap_or("unspecified") }
}

#[derive(Debug, Display)]
pub enum ResponseError {
    InternalServer(ErrorReturn),
    BadRequest(ErrorReturn),
    NoConnection,
    Decode,
    Encode,
    Unknown,
}

impl std::error::Error for ResponseError {}
impl From<reqwest::Error> for ResponseError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            ResponseError::Decode
        } else if value.is_connect() {
            ResponseError::NoConnection
        } else if value.is_timeout() || value.is_redirect() {
            ResponseError::InternalServer(ErrorReturn::default())
        } else if value.is_request() || value.is_builder() {
            ResponseError::BadRequest(ErrorReturn::default())
        } else {
            ResponseError::Unknown
        }
    }
}

impl From<serde_json::Error> for ResponseError {
    fn from(_: serde_json::Error) -> Self { ResponseError::Encode }
}
