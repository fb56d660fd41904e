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

use std::collections::HashMap;

use awsdns_aws_v4::{
    Config, Credential, RequestDetails, RequestSigner, StaticCredentialProvider,
    X_AMZ_CONTENT_SHA_256,
};
use awsdns_core::{Context, Error, Result, Signer, UrlContext};
use bytes::Bytes;
use http::uri::Scheme;
use http::{HeaderValue, Method};
use log::{debug, warn};

use crate::xml::{
    build_change_batch, build_create_hosted_zone, parse_change_info, parse_create_hosted_zone,
    parse_error_response, parse_list_hosted_zones, parse_list_resource_record_sets,
};
use crate::{Change, ChangeInfo, HostedZone, Name, RRSetKey, RecordSet};

/// Host of the global Route53 endpoint.
pub const ROUTE53_HOST: &str = "route53.amazonaws.com";
/// Region Route53 requests are signed for.
pub const ROUTE53_SIGNING_REGION: &str = "us-east-1";
/// API version, the first segment of every request path.
pub const ROUTE53_API_VERSION: &str = "2013-04-01";

const SERVICE: &str = "route53";
const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

/// Route53Client talks to the Route53 API.
///
/// Every operation sends one signed request per page and never retries.
/// Transport and clock come from the [`Context`].
///
/// ```no_run
/// use awsdns_aws_v4::Config;
/// use awsdns_core::Context;
/// use awsdns_route53::Route53Client;
///
/// # async fn example(ctx: Context) -> awsdns_core::Result<()> {
/// let client = Route53Client::new(ctx.clone(), Config::default().from_env(&ctx))?;
/// for zone in client.list_hosted_zones().await? {
///     println!("{} {}", zone.identifier, zone.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Route53Client {
    ctx: Context,
    credential: Credential,
    region: String,
    signer: Signer<Credential>,
    endpoint: UrlContext,
}

impl Route53Client {
    /// Create a client for the global Route53 endpoint.
    ///
    /// Fails with `ConfigInvalid` when `config` carries no usable keys.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let credential = config.credential()?;
        let signer = build_signer(&ctx, &credential, ROUTE53_SIGNING_REGION);

        Ok(Self {
            ctx,
            credential,
            region: ROUTE53_SIGNING_REGION.to_string(),
            signer,
            endpoint: UrlContext::new(Scheme::HTTPS, ROUTE53_HOST),
        })
    }

    /// Send requests to `endpoint` instead.
    ///
    /// Path segments of `endpoint` are kept in front of the API path.
    pub fn with_endpoint(mut self, endpoint: UrlContext) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sign requests for `region` instead of `us-east-1`.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self.signer = build_signer(&self.ctx, &self.credential, &self.region);
        self
    }

    /// List every hosted zone of the account, following pagination.
    pub async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>> {
        let mut zones = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut url = self.url(["hostedzone"]);
            if let Some(marker) = &marker {
                url.query_push("marker", Some(marker.as_str()));
            }

            let resp = self.send(Method::GET, url, Bytes::new()).await?;
            let page = parse_list_hosted_zones(resp.body())?;
            zones.extend(page.zones);

            match page.next_marker {
                Some(next) if marker.as_ref() == Some(&next) => {
                    return Err(Error::decode("hosted zone pagination did not advance")
                        .with_context(format!("marker: {next}")));
                }
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Ok(zones)
    }

    /// Every record set of a zone, keyed by name and type.
    ///
    /// When a key shows up twice the later set wins.
    pub async fn list_resource_record_sets(
        &self,
        zone_id: &str,
    ) -> Result<HashMap<RRSetKey, RecordSet>> {
        let zone_id = normalize_zone_id(zone_id);
        let mut sets = HashMap::new();
        let mut next: Option<(String, Option<String>, Option<String>)> = None;

        loop {
            let mut url = self.url(["hostedzone", zone_id, "rrset"]);
            if let Some((name, rtype, identifier)) = &next {
                url.query_push("name", Some(name.as_str()));
                if let Some(rtype) = rtype {
                    url.query_push("type", Some(rtype.as_str()));
                }
                if let Some(identifier) = identifier {
                    url.query_push("identifier", Some(identifier.as_str()));
                }
            }

            let resp = self.send(Method::GET, url, Bytes::new()).await?;
            let page = parse_list_resource_record_sets(resp.body())?;
            for rrset in page.record_sets {
                let key = rrset.key();
                if sets.insert(key.clone(), rrset).is_some() {
                    warn!("zone {zone_id} lists record set {key} more than once, keeping the last");
                }
            }

            match page.next {
                Some(v) if next.as_ref() == Some(&v) => {
                    return Err(Error::decode("record set pagination did not advance")
                        .with_context(format!("zone: {zone_id}"))
                        .with_context(format!("next record name: {}", v.0)));
                }
                Some(v) => next = Some(v),
                None => break,
            }
        }

        Ok(sets)
    }

    /// Submit a change batch.
    pub async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        changes: &[Change],
    ) -> Result<ChangeInfo> {
        self.submit_changes(zone_id, changes, None).await
    }

    /// Submit a change batch carrying a `<Comment>`.
    pub async fn change_resource_record_sets_with_comment(
        &self,
        zone_id: &str,
        changes: &[Change],
        comment: &str,
    ) -> Result<ChangeInfo> {
        self.submit_changes(zone_id, changes, Some(comment)).await
    }

    /// Create a public hosted zone.
    ///
    /// `caller_reference` must be unique per creation request, Route53
    /// uses it to make retries idempotent.
    pub async fn create_hosted_zone(
        &self,
        name: impl Into<Name>,
        caller_reference: &str,
    ) -> Result<(HostedZone, ChangeInfo)> {
        let body = build_create_hosted_zone(&name.into(), caller_reference, None)?;

        let resp = self.send(Method::POST, self.url(["hostedzone"]), body).await?;
        parse_create_hosted_zone(resp.body())
    }

    /// Delete a hosted zone. Route53 refuses unless only the apex SOA and
    /// NS sets are left.
    pub async fn delete_hosted_zone(&self, zone_id: &str) -> Result<ChangeInfo> {
        let url = self.url(["hostedzone", normalize_zone_id(zone_id)]);

        let resp = self.send(Method::DELETE, url, Bytes::new()).await?;
        parse_change_info(resp.body(), "DeleteHostedZoneResponse")
    }

    async fn submit_changes(
        &self,
        zone_id: &str,
        changes: &[Change],
        comment: Option<&str>,
    ) -> Result<ChangeInfo> {
        let body = build_change_batch(changes, comment)?;
        let url = self.url(["hostedzone", normalize_zone_id(zone_id), "rrset"]);

        let resp = self.send(Method::POST, url, body).await?;
        parse_change_info(resp.body(), "ChangeResourceRecordSetsResponse")
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> UrlContext {
        let mut url = self.endpoint.clone();
        url.path_extend([ROUTE53_API_VERSION]);
        url.path_extend(segments);
        url
    }

    async fn send(
        &self,
        method: Method,
        url: UrlContext,
        body: Bytes,
    ) -> Result<http::Response<Bytes>> {
        let details = RequestDetails::new(&self.region, SERVICE, method, url, &body);
        debug!("sending route53 request: {} {}", details.method, details.url);

        let (mut parts, body) = http::Request::new(body).into_parts();
        parts.method = details.method.clone();
        parts.uri = details.url.to_uri()?;
        parts.headers.insert(
            X_AMZ_CONTENT_SHA_256,
            HeaderValue::from_str(&details.payload_hash)?,
        );
        self.signer.sign(&mut parts).await?;

        let resp = self
            .ctx
            .http_send(http::Request::from_parts(parts, body))
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(parse_error_response(status, resp.body())
                .with_context(format!("request: {} {}", details.method, details.url)));
        }
        Ok(resp)
    }
}

fn build_signer(ctx: &Context, credential: &Credential, region: &str) -> Signer<Credential> {
    Signer::new(
        ctx.clone(),
        StaticCredentialProvider::new(credential.clone()),
        RequestSigner::new(SERVICE, region),
    )
}

/// Accept both `Z123` and `/hostedzone/Z123`.
fn normalize_zone_id(zone_id: &str) -> &str {
    zone_id.strip_prefix(HOSTED_ZONE_PREFIX).unwrap_or(zone_id)
}
