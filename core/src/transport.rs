//! The network half of the host-does-IO split.
//!
//! `Transport` is the only place a request leaves the process. The core
//! never retries; a transport failure surfaces as `SesameError::Transport`.

use crate::error::SesameError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    /// Send `request` and return whatever status the server answered with.
    /// Non-2xx statuses are responses, not errors.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, SesameError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, SesameError> {
        (**self).send(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use ureq::Agent;

    use super::Transport;
    use crate::error::SesameError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport on top of a `ureq` agent.
    ///
    /// The agent is configured with `http_status_as_error(false)` so 4xx/5xx
    /// answers come back as data and status interpretation stays in
    /// `SesameClient::parse_*`. Response bodies are read without a size cap
    /// unless one is set with `with_body_limit`.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: Agent,
        body_limit: u64,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self::with_agent(agent)
        }

        pub fn with_agent(agent: Agent) -> Self {
            Self {
                agent,
                body_limit: u64::MAX,
            }
        }

        /// Fail with `SesameError::Transport` when a response body exceeds
        /// `limit` bytes.
        pub fn with_body_limit(mut self, limit: u64) -> Self {
            self.body_limit = limit;
            self
        }
    }

    impl Transport for UreqTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, SesameError> {
            let url = request.url.as_str();
            let body = request.body.as_ref().map(|b| b.to_bytes());

            let result = match request.method {
                HttpMethod::Get => {
                    let mut builder = self.agent.get(url);
                    for (k, v) in &request.headers {
                        builder = builder.header(k.as_str(), v.as_str());
                    }
                    builder.call()
                }
                HttpMethod::Delete => {
                    let mut builder = self.agent.delete(url);
                    for (k, v) in &request.headers {
                        builder = builder.header(k.as_str(), v.as_str());
                    }
                    builder.call()
                }
                HttpMethod::Post | HttpMethod::Put => {
                    let mut builder = if request.method == HttpMethod::Post {
                        self.agent.post(url)
                    } else {
                        self.agent.put(url)
                    };
                    for (k, v) in &request.headers {
                        builder = builder.header(k.as_str(), v.as_str());
                    }
                    match &body {
                        Some(bytes) => builder.send(&bytes[..]),
                        None => builder.send_empty(),
                    }
                }
            };

            let mut response = result.map_err(|e| SesameError::Transport(e.to_string()))?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
                .collect();
            let body = response
                .body_mut()
                .with_config()
                .limit(self.body_limit)
                .read_to_vec()
                .map_err(|e| SesameError::Transport(e.to_string()))?;

            Ok(HttpResponse { status, headers, body })
        }
    }
}
