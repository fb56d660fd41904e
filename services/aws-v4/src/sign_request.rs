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

use crate::canonical::{canonicalize, CanonicalRequest};
use crate::constants::{
    AWS4_HMAC_SHA256, AWS4_REQUEST, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE, X_AMZ_SECURITY_TOKEN,
};
use crate::Credential;
use async_trait::async_trait;
use awsdns_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use awsdns_core::time::{format_date, format_iso8601, DateTime};
use awsdns_core::{Context, Error, Result, SignRequest, SigningRequest};
use http::request::Parts;
use http::{header, HeaderValue};
use log::debug;

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
        }
    }

    /// Credential scope: `20220313/<region>/<service>/aws4_request`.
    pub fn scope(&self, now: DateTime) -> String {
        format!(
            "{}/{}/{}/{AWS4_REQUEST}",
            format_date(now),
            self.region,
            self.service
        )
    }

    /// Sign a request whose payload hash is already carried in
    /// `x-amz-content-sha256`.
    ///
    /// `host`, `x-amz-date` and, for temporary credentials,
    /// `x-amz-security-token` are set before the canonical request is
    /// built. `x-amz-date` always reflects `now`.
    pub(crate) fn sign_signing_request(
        &self,
        req: &mut SigningRequest,
        cred: &Credential,
        now: DateTime,
    ) -> Result<()> {
        canonicalize_header(req, cred, now)?;

        let payload_hash = req
            .headers
            .get(X_AMZ_CONTENT_SHA_256)
            .map(|v| v.to_str())
            .transpose()?;
        let creq = canonicalize(&req.method, &req.url, &req.headers, payload_hash)?;
        debug!("calculated canonical request: {creq}");

        let authorization = self.authorization(cred, now, &creq)?;
        req.headers.insert(header::AUTHORIZATION, authorization);

        Ok(())
    }

    /// Compute the `Authorization` header value for a canonical request.
    pub fn authorization(
        &self,
        cred: &Credential,
        now: DateTime,
        creq: &CanonicalRequest,
    ) -> Result<HeaderValue> {
        let scope = self.scope(now);
        debug!("calculated scope: {scope}");

        let string_to_sign = string_to_sign(now, &scope, creq);
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(cred.secret_access_key(), now, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!(
            "{AWS4_HMAC_SHA256} Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key_id(),
            scope,
            creq.signed_headers,
            signature
        ))?;
        authorization.set_sensitive(true);

        Ok(authorization)
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::config_invalid(
                "no credential available to sign the request",
            ));
        };

        let now = ctx.now();
        let (uri, headers) = (req.uri.clone(), req.headers.clone());
        let mut signed_req = SigningRequest::build(req)?;
        if let Err(err) = self.sign_signing_request(&mut signed_req, cred, now) {
            // Hand the request back as the caller gave it.
            req.uri = uri;
            req.headers = headers;
            return Err(err);
        }

        // Apply to the request.
        signed_req.apply(req)
    }
}

/// StringToSign:
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(now: DateTime, scope: &str, creq: &CanonicalRequest) -> String {
    format!(
        "{AWS4_HMAC_SHA256}\n{}\n{scope}\n{}",
        format_iso8601(now),
        hex_sha256(creq.to_string().as_bytes())
    )
}

fn canonicalize_header(req: &mut SigningRequest, cred: &Credential, now: DateTime) -> Result<()> {
    // Header names and values need to be normalized according to Step 4 of https://docs.aws.amazon.com/general/latest/gr/sigv4-create-canonical-request.html
    for (_, value) in req.headers.iter_mut() {
        SigningRequest::header_value_normalize(value)
    }

    // Insert HOST header if not present.
    if req.headers.get(header::HOST).is_none() {
        let host = HeaderValue::try_from(req.url.host_header())?;
        req.headers.insert(header::HOST, host);
    }

    // The date must match the one in the string to sign.
    req.headers
        .insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(now))?);

    // Insert X_AMZ_SECURITY_TOKEN header if security token exists.
    if let Some(token) = cred.session_token() {
        let mut value = HeaderValue::from_str(token)?;
        // Set token value sensitive to valid leaking.
        value.set_sensitive(true);

        req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
    }

    Ok(())
}

/// Derive the signing key through the SigV4 HMAC chain.
pub fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), AWS4_REQUEST.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsdns_core::hash::EMPTY_STRING_SHA256;
    use awsdns_core::time::FixedClock;
    use awsdns_core::ErrorKind;
    use chrono::{TimeZone, Utc};
    use http::Request;
    use pretty_assertions::assert_eq;

    const SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    #[test]
    fn test_generate_signing_key() {
        let t = Utc.with_ymd_and_hms(2012, 2, 15, 0, 0, 0).unwrap();
        let key = generate_signing_key(SECRET, t, "us-east-1", "iam");

        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[tokio::test]
    async fn test_sign_get_vanilla() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let t = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();
        let ctx = Context::new().with_clock(FixedClock(t));
        let cred = Credential::new("AKIDEXAMPLE", SECRET)?;

        let req = Request::get("https://example.amazonaws.com/")
            .header(X_AMZ_CONTENT_SHA_256, EMPTY_STRING_SHA256)
            .body(())?;
        let (mut parts, _) = req.into_parts();

        // Drop the payload header to sign exactly host and x-amz-date.
        let mut signed_req = SigningRequest::build(&mut parts)?;
        let signer = RequestSigner::new("service", "us-east-1");
        canonicalize_header(&mut signed_req, &cred, ctx.now())?;
        signed_req.headers.remove(X_AMZ_CONTENT_SHA_256);
        let creq = canonicalize(
            &signed_req.method,
            &signed_req.url,
            &signed_req.headers,
            Some(EMPTY_STRING_SHA256),
        )?;

        assert_eq!(
            signer.authorization(&cred, t, &creq)?,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, SignedHeaders=host;x-amz-date, Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_request_sets_headers() -> anyhow::Result<()> {
        let t = Utc.timestamp_opt(1234567890, 0).unwrap();
        let ctx = Context::new().with_clock(FixedClock(t));
        let cred = Credential::new("AKIDEXAMPLE", SECRET)?.with_session_token("session");

        let req = Request::post("https://route53.amazonaws.com/2013-04-01/hostedzone")
            .header(X_AMZ_CONTENT_SHA_256, EMPTY_STRING_SHA256)
            .header(X_AMZ_DATE, "19700101T000000Z")
            .body(())?;
        let (mut parts, _) = req.into_parts();

        RequestSigner::new("route53", "us-east-1")
            .sign_request(&ctx, &mut parts, Some(&cred))
            .await?;

        assert_eq!(parts.headers[header::HOST], "route53.amazonaws.com");
        assert_eq!(parts.headers[X_AMZ_DATE], "20090213T233130Z");
        assert_eq!(parts.headers[X_AMZ_SECURITY_TOKEN], "session");
        let authorization = parts.headers[header::AUTHORIZATION].to_str()?;
        assert!(authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20090213/us-east-1/route53/aws4_request, SignedHeaders=host;x-amz-content-sha256;x-amz-date;x-amz-security-token, Signature="
        ));
        assert!(parts.headers[header::AUTHORIZATION].is_sensitive());

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_request_requires_payload_hash() -> anyhow::Result<()> {
        let ctx = Context::new();
        let cred = Credential::new("AKIDEXAMPLE", SECRET)?;

        let (mut parts, _) = Request::get("https://example.invalid/").body(())?.into_parts();
        let err = RequestSigner::new("route53", "us-east-1")
            .sign_request(&ctx, &mut parts, Some(&cred))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_signing_leaves_request_untouched() -> anyhow::Result<()> {
        let ctx = Context::new();
        let cred = Credential::new("AKIDEXAMPLE", SECRET)?;

        let (mut parts, _) = Request::get("https://example.invalid/foo?bar=baz")
            .header("x-custom", "  keep   me ")
            .body(())?
            .into_parts();
        let err = RequestSigner::new("route53", "us-east-1")
            .sign_request(&ctx, &mut parts, Some(&cred))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert_eq!(parts.uri.to_string(), "https://example.invalid/foo?bar=baz");
        assert_eq!(parts.headers.len(), 1);
        assert_eq!(parts.headers["x-custom"], "  keep   me ");

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_request_without_credential() -> anyhow::Result<()> {
        let ctx = Context::new();
        let (mut parts, _) = Request::get("https://example.invalid/").body(())?.into_parts();

        let err = RequestSigner::new("route53", "us-east-1")
            .sign_request(&ctx, &mut parts, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        Ok(())
    }
}
