// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use awsdns_core::hash::hex_sha256;
use awsdns_core::time::DateTime;
use awsdns_core::{Result, SigningRequest, UrlContext};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method};
use log::debug;

use crate::constants::X_AMZ_CONTENT_SHA_256;
use crate::{Credential, RequestSigner};

/// RequestDetails is everything needed to build one signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDetails {
    /// Region the request is signed for.
    pub region: String,
    /// Service name, for example `route53`.
    pub service: String,
    /// HTTP method.
    pub method: Method,
    /// Where the request goes.
    pub url: UrlContext,
    /// Hex encoded SHA256 of the body.
    pub payload_hash: String,
}

impl RequestDetails {
    /// Describe a request carrying `payload`.
    pub fn new(
        region: impl Into<String>,
        service: impl Into<String>,
        method: Method,
        url: UrlContext,
        payload: &[u8],
    ) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
            method,
            url,
            payload_hash: hex_sha256(payload),
        }
    }

    /// Build the signed request.
    ///
    /// The result carries `host`, `x-amz-date`, `x-amz-content-sha256`
    /// and `authorization`, and its URI always names the port. `body`
    /// must be the payload the hash was computed from.
    pub fn compose(
        &self,
        credential: &Credential,
        now: DateTime,
        body: Bytes,
    ) -> Result<http::Request<Bytes>> {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_AMZ_CONTENT_SHA_256,
            HeaderValue::from_str(&self.payload_hash)?,
        );

        let mut signing = SigningRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers,
        };
        RequestSigner::new(&self.service, &self.region).sign_signing_request(
            &mut signing,
            credential,
            now,
        )?;
        debug!("composed request: {} {}", signing.method, signing.url);

        let (mut parts, body) = http::Request::new(body).into_parts();
        signing.apply(&mut parts)?;
        Ok(http::Request::from_parts(parts, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsdns_core::ErrorKind;
    use chrono::{TimeZone, Utc};
    use http::header;
    use http::uri::Scheme;
    use pretty_assertions::assert_eq;

    fn details(body: &[u8]) -> RequestDetails {
        RequestDetails::new(
            "us-east-1",
            "route53",
            Method::GET,
            UrlContext::new(Scheme::HTTPS, "example.invalid")
                .with_port(443)
                .with_path(["foo", "bar"])
                .with_query("baz", None)
                .with_query("quux", Some("thud")),
            body,
        )
    }

    #[test]
    fn test_compose_sets_signing_headers() -> anyhow::Result<()> {
        let cred = Credential::new("AKIDEXAMPLE", "secret")?;
        let now = Utc.timestamp_opt(1234567890, 0).unwrap();

        let req = details(b"").compose(&cred, now, Bytes::new())?;

        assert_eq!(req.method(), &Method::GET);
        assert_eq!(
            req.uri().to_string(),
            "https://example.invalid:443/foo/bar?baz&quux=thud"
        );
        let mut names = req
            .headers()
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<_>>();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["authorization", "host", "x-amz-content-sha256", "x-amz-date"]
        );
        assert_eq!(req.headers()[header::HOST], "example.invalid");
        assert_eq!(req.headers()["x-amz-date"], "20090213T233130Z");
        assert_eq!(
            req.headers()[X_AMZ_CONTENT_SHA_256],
            awsdns_core::hash::EMPTY_STRING_SHA256
        );

        Ok(())
    }

    #[test]
    fn test_compose_is_deterministic_for_fixed_time() -> anyhow::Result<()> {
        let cred = Credential::new("AKIDEXAMPLE", "secret")?;
        let now = Utc.timestamp_opt(1234567890, 0).unwrap();
        let body = Bytes::from_static(b"<xml/>");

        let a = details(&body).compose(&cred, now, body.clone())?;
        let b = details(&body).compose(&cred, now, body.clone())?;
        assert_eq!(
            a.headers()[header::AUTHORIZATION],
            b.headers()[header::AUTHORIZATION]
        );
        assert_eq!(a.body(), &body);

        let later = details(&body).compose(&cred, now + chrono::TimeDelta::seconds(1), body)?;
        assert_ne!(
            a.headers()[header::AUTHORIZATION],
            later.headers()[header::AUTHORIZATION]
        );

        Ok(())
    }

    #[test]
    fn test_compose_rejects_empty_payload_hash() -> anyhow::Result<()> {
        let cred = Credential::new("AKIDEXAMPLE", "secret")?;
        let now = Utc.timestamp_opt(1234567890, 0).unwrap();

        let mut d = details(b"");
        d.payload_hash = String::new();
        let err = d.compose(&cred, now, Bytes::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);

        Ok(())
    }
}
