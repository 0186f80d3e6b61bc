//! Blocking HTTP lookup transport backed by `ureq`.

use std::time::Duration;

use serde_json::Value;

use crate::backends::LookupTransport;

/// JSON-over-HTTP transport used for the metadata services.
pub struct HttpLookupTransport {
    http_client: ureq::Agent,
}

impl HttpLookupTransport {
    /// Creates a transport that sends `user_agent` with every request.
    pub fn new(user_agent: &str) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .user_agent(user_agent)
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .build();
        Self { http_client }
    }
}

impl LookupTransport for HttpLookupTransport {
    fn get_json(&self, url: &str) -> Result<Value, String> {
        let response = self
            .http_client
            .get(url)
            .set("Accept", "application/json")
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => format!("Request returned HTTP {code}: {url}"),
                ureq::Error::Transport(transport) => {
                    format!("Request failed: {url}: {transport}")
                }
            })?;
        response
            .into_json::<Value>()
            .map_err(|err| format!("Invalid JSON response from {url}: {err}"))
    }
}
