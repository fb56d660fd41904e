//! [`HttpSend`] backed by [`reqwest`].
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use awsdns_core::Context;
//! use awsdns_http_send_reqwest::ReqwestHttpSend;
//! use reqwest::Client;
//!
//! # fn main() -> Result<(), reqwest::Error> {
//! let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use awsdns_core::{Error, HttpSend, Result};
use bytes::Bytes;
use http_body_util::BodyExt;
use log::debug;
use reqwest::{Client, Request};

/// ReqwestHttpSend sends requests through a [`reqwest::Client`].
///
/// Timeouts, TLS and pooling are whatever the client was built with.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("request can not be sent by reqwest").with_source(e)
        })?;
        debug!("sending request: {} {}", req.method(), req.url());

        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport("failed to send request").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| {
                Error::transport("failed to read response body")
                    .with_status(parts.status)
                    .with_source(e)
            })?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
