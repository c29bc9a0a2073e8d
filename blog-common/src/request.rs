use reqwest::{
    blocking::{Client, ClientBuilder},
    header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, USER_AGENT},
};
use tracing::{debug, warn};
use url::Url;

use crate::posts::{RequestFailure, SubmitMethod, SubmitRequest, Transport, JSON_CONTENT_TYPE};

const USER_AGENT_VALUE: &str = concat!("blog/", env!("CARGO_PKG_VERSION"));

pub fn headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

/// Blocking transport, for use outside of a browser.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<HttpTransport, RequestFailure> {
        ClientBuilder::new()
            .default_headers(headers())
            .build()
            .map(|client| HttpTransport { client })
            .map_err(|e| RequestFailure::Network(e.to_string()))
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &SubmitRequest) -> Result<String, RequestFailure> {
        let url = Url::parse(&request.url)
            .map_err(|e| RequestFailure::InvalidUrl(format!("{}: {}", request.url, e)))?;
        let body = request.body_json()?;
        let builder = match request.method {
            SubmitMethod::Create => self.client.post(url),
            SubmitMethod::Update(_) => self.client.put(url),
        };

        debug!("{} with {} bytes", request, body.len());
        let response = builder
            .body(body)
            .send()
            .map_err(|e| RequestFailure::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| RequestFailure::Network(e.to_string()))?;

        if status.is_success() {
            Ok(text)
        } else {
            warn!("{} answered {}", request, status);
            Err(RequestFailure::from_status(status.as_u16(), &text))
        }
    }
}
