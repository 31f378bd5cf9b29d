use crate::fatal;

/// A simple wrapper around `reqwest::Client` used to manage HTTP requests
/// with a preconfigured base URL and default settings.
///
/// This client is used for every exchange with the simulator host.
#[derive(Debug)]
pub(crate) struct HTTPClient {
    /// The underlying `reqwest::Client` used to perform HTTP requests.
    client: reqwest::Client,
    /// Base URL of the simulator host, prepended to all endpoint paths.
    base_url: String,
}

impl HTTPClient {
    /// Request timeout, a command that is not delivered within this is stale anyway.
    const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

    /// Constructs a new `HTTPClient` with the given base URL.
    ///
    /// # Arguments
    /// * `base_url` – The root URL for all HTTP requests (e.g., `"http://192.168.1.235:5000"`).
    pub(crate) fn new(base_url: &str) -> HTTPClient {
        let client = reqwest::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .unwrap_or_else(|e| fatal!("Unable to construct HTTP client: {e}"));
        HTTPClient { client, base_url: base_url.trim_end_matches('/').to_string() }
    }

    /// Returns a reference to the internal `reqwest::Client`.
    pub(super) fn client(&self) -> &reqwest::Client { &self.client }
    /// Returns the base URL that the client was initialized with.
    pub(crate) fn url(&self) -> &str { self.base_url.as_str() }
}
