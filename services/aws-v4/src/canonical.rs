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

//! Canonical request construction.

use std::fmt::{self, Display, Formatter};

use awsdns_core::{Error, Result, SigningRequest, UrlContext};
use http::{HeaderMap, Method};
use percent_encoding::utf8_percent_encode;

use crate::constants::AWS_URI_ENCODE_SET;

/// CanonicalRequest is the normalized form of a request that gets hashed
/// into the string to sign.
///
/// It is a pure function of its inputs. Time only enters through headers
/// such as `x-amz-date` that the caller has already set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// HTTP method, upper case.
    pub method: Method,
    /// Escaped absolute path, `/` for an empty path.
    pub uri: String,
    /// Sorted, escaped query string. Keys without value render as `key=`.
    pub query: String,
    /// Sorted `name:value\n` lines, one per header name.
    pub headers: String,
    /// Sorted header names joined with `;`.
    pub signed_headers: String,
    /// Hex encoded SHA256 of the payload.
    pub payload_hash: String,
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.uri)?;
        writeln!(f, "{}", self.query)?;
        // Every header line already ends with a newline, so this leaves the
        // blank line SigV4 expects.
        writeln!(f, "{}", self.headers)?;
        writeln!(f, "{}", self.signed_headers)?;
        write!(f, "{}", self.payload_hash)
    }
}

/// Build the canonical request for the given request parts.
///
/// Every header in `headers` is signed. A missing or empty
/// `payload_hash` is a `RequestInvalid` error.
pub fn canonicalize(
    method: &Method,
    url: &UrlContext,
    headers: &HeaderMap,
    payload_hash: Option<&str>,
) -> Result<CanonicalRequest> {
    let payload_hash = match payload_hash {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            return Err(Error::request_invalid("payload hash is required for signing")
                .with_context(format!("method: {method}"))
                .with_context(format!("path: {}", url.path_escaped())))
        }
    };

    let (headers, signed_headers) = canonical_headers(headers)?;

    Ok(CanonicalRequest {
        method: method.clone(),
        uri: canonical_uri(url),
        query: canonical_query(url),
        headers,
        signed_headers,
        payload_hash,
    })
}

/// Each segment is encoded on its own, so a '/' inside a segment is kept
/// as `%2F`.
fn canonical_uri(url: &UrlContext) -> String {
    if url.path.is_empty() {
        return "/".to_string();
    }

    let mut s = String::with_capacity(64);
    for seg in &url.path {
        s.push('/');
        s.extend(utf8_percent_encode(seg, &AWS_URI_ENCODE_SET));
    }
    s
}

fn canonical_query(url: &UrlContext) -> String {
    let mut query = url
        .query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_URI_ENCODE_SET).to_string(),
                v.as_deref()
                    .map(|v| utf8_percent_encode(v, &AWS_URI_ENCODE_SET).to_string())
                    .unwrap_or_default(),
            )
        })
        .collect::<Vec<_>>();
    // Sort by param name, then by value for repeated names.
    query.sort();

    query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_headers(headers: &HeaderMap) -> Result<(String, String)> {
    // HeaderName is always lower case.
    let mut names = headers.keys().map(|k| k.as_str()).collect::<Vec<_>>();
    names.sort_unstable();

    let mut lines = String::with_capacity(256);
    for name in &names {
        let mut values = Vec::new();
        for value in headers.get_all(*name) {
            let mut value = value.clone();
            SigningRequest::header_value_normalize(&mut value);
            values.push(value.to_str()?.to_string());
        }

        lines.push_str(name);
        lines.push(':');
        lines.push_str(&values.join(","));
        lines.push('\n');
    }

    Ok((lines, names.join(";")))
}
