use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};
use tracing::debug;

use crate::error::{TransportError, truncate_body};

/// Fetches the body of a fully-built request URL.
///
/// Implementations must return the body on any 2xx status and a
/// [`TransportError`] for everything else.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn fetch(&self, url: &str) -> Result<String, TransportError>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<String, TransportError> {
        let res = self.http.get(url).send().await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(%status, bytes = body.len(), "received OpenWeather response");

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}
