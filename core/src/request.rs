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

use std::fmt::{self, Display, Formatter, Write};
use std::mem;
use std::str::FromStr;

use http::uri::Scheme;
use http::{HeaderMap, HeaderValue, Method, Uri};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::{Error, Result};

/// Bytes that must be escaped inside a path segment or a query component.
///
/// Everything except the RFC 3986 unreserved characters.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// UrlContext describes where a request goes.
///
/// Path segments and query parameters are kept decoded; escaping happens
/// when the context is rendered into a [`Uri`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlContext {
    /// `http` or `https`.
    pub scheme: Scheme,
    /// Host name without port.
    pub host: String,
    /// Explicit port, `None` means the scheme default.
    pub port: Option<u16>,
    /// Decoded path segments, `[]` is the root path.
    pub path: Vec<String>,
    /// Decoded query parameters in request order. `None` marks a key
    /// without `=`.
    pub query: Vec<(String, Option<String>)>,
}

impl UrlContext {
    /// Create a context pointing at the root path of `host`.
    pub fn new(scheme: Scheme, host: impl Into<String>) -> Self {
        Self {
            scheme,
            host: host.into(),
            port: None,
            path: Vec::new(),
            query: Vec::new(),
        }
    }

    /// Set an explicit port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Replace the path segments.
    pub fn with_path<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Append one query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.query_push(key, value);
        self
    }

    /// Append path segments.
    pub fn path_extend<I, S>(&mut self, segments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path.extend(segments.into_iter().map(Into::into));
    }

    /// Append one query parameter.
    pub fn query_push(&mut self, key: impl Into<String>, value: Option<&str>) {
        self.query.push((key.into(), value.map(str::to_string)));
    }

    /// The effective port, falling back to the scheme default.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.default_port())
    }

    fn default_port(&self) -> u16 {
        if self.scheme == Scheme::HTTPS {
            443
        } else {
            80
        }
    }

    /// Value for the `host` header.
    ///
    /// The port is only included when it differs from the scheme default.
    pub fn host_header(&self) -> String {
        if self.port() == self.default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port())
        }
    }

    /// Escaped path, always starting with `/`.
    pub fn path_escaped(&self) -> String {
        let mut s = String::with_capacity(64);
        for seg in &self.path {
            s.push('/');
            s.extend(utf8_percent_encode(seg, COMPONENT_ENCODE_SET));
        }
        if s.is_empty() {
            s.push('/');
        }
        s
    }

    /// Escaped query string without the leading `?`, `None` if there is no
    /// query at all.
    pub fn query_escaped(&self) -> Option<String> {
        if self.query.is_empty() {
            return None;
        }

        let mut s = String::new();
        for (idx, (k, v)) in self.query.iter().enumerate() {
            if idx > 0 {
                s.push('&');
            }
            s.extend(utf8_percent_encode(k, COMPONENT_ENCODE_SET));
            if let Some(v) = v {
                s.push('=');
                s.extend(utf8_percent_encode(v, COMPONENT_ENCODE_SET));
            }
        }
        Some(s)
    }

    /// Render into a [`Uri`] with an explicit port.
    pub fn to_uri(&self) -> Result<Uri> {
        Ok(Uri::from_str(&self.to_string())?)
    }

    /// Parse a [`Uri`] back into a context.
    pub fn from_uri(uri: &Uri) -> Result<Self> {
        let host = uri
            .host()
            .ok_or_else(|| Error::request_invalid("request without host is invalid for signing"))?;

        let path = match uri.path().trim_start_matches('/') {
            "" => Vec::new(),
            p => p.split('/').map(decode_component).collect(),
        };

        let query = uri
            .query()
            .map(|q| {
                q.split('&')
                    .filter(|pair| !pair.is_empty())
                    .map(|pair| match pair.split_once('=') {
                        Some((k, v)) => (decode_component(k), Some(decode_component(v))),
                        None => (decode_component(pair), None),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            scheme: uri.scheme().cloned().unwrap_or(Scheme::HTTP),
            host: host.to_string(),
            port: uri.port_u16(),
            path,
            query,
        })
    }
}

impl Display for UrlContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:{}{}",
            self.scheme,
            self.host,
            self.port(),
            self.path_escaped()
        )?;
        if let Some(q) = self.query_escaped() {
            f.write_char('?')?;
            f.write_str(&q)?;
        }
        Ok(())
    }
}

fn decode_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Signing context for request.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// Where the request goes.
    pub url: UrlContext,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri);
        let url = UrlContext::from_uri(&uri).map_err(|e| {
            // Give the uri back so the caller is left with an untouched request.
            parts.uri = uri.clone();
            e
        })?;

        Ok(SigningRequest {
            method: parts.method.clone(),
            url,
            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = self.url.to_uri()?;
        Ok(())
    }

    /// Get header names as sorted vector.
    pub fn header_name_to_vec_sorted(&self) -> Vec<&str> {
        let mut h = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<&str>>();
        h.sort_unstable();

        h
    }

    /// Normalize header value.
    ///
    /// Leading and trailing spaces are removed, inner runs of spaces are
    /// collapsed into one.
    pub fn header_value_normalize(v: &mut HeaderValue) {
        let bs = v.as_bytes();
        let mut out = Vec::with_capacity(bs.len());
        for &b in bs {
            if b == b' ' && (out.is_empty() || out.last() == Some(&b' ')) {
                continue;
            }
            out.push(b);
        }
        while out.last() == Some(&b' ') {
            out.pop();
        }

        if out.len() != bs.len() {
            let sensitive = v.is_sensitive();
            // Only spaces were removed from a valid value, so this cannot fail.
            if let Ok(mut nv) = HeaderValue::from_bytes(&out) {
                nv.set_sensitive(sensitive);
                *v = nv;
            }
        }
    }
}
