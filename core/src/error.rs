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

use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// The error type for awsdns operations.
#[derive(Error, Debug)]
#[error("{kind}: {message}{}", render_context(.context))]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
    context: Vec<String>,

    status: Option<StatusCode>,
    request_id: Option<String>,
    errors: Vec<ServiceErrorDetail>,
}

/// The kind of error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Configuration is missing or invalid, for example no credentials.
    ConfigInvalid,

    /// A credential provider returned something unusable.
    CredentialInvalid,

    /// The request violates a signing precondition, for example it carries
    /// no payload hash.
    RequestInvalid,

    /// AWS answered with a well formed `<ErrorResponse>`.
    ///
    /// Use [`Error::errors`] to branch on the returned codes.
    Service,

    /// The transport failed or the server answered with an unexpected status
    /// and no parseable error document.
    Transport,

    /// The response body does not have the expected shape.
    Decode,

    /// Anything else.
    Unexpected,
}

/// One `<Error>` entry of an AWS `<ErrorResponse>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceErrorDetail {
    /// `<Type>`, usually `Sender` or `Receiver`.
    pub error_type: String,
    /// `<Code>`, for example `InvalidChangeBatch`.
    pub code: String,
    /// `<Message>`, free form text.
    pub message: String,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            context: Vec::new(),
            status: None,
            request_id: None,
            errors: Vec::new(),
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a piece of context, rendered after the message.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attach the HTTP status this error was derived from.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message without context.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status of the response that caused this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Request id reported by AWS, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Structured entries of a service error.
    ///
    /// Always empty unless `kind()` is [`ErrorKind::Service`].
    pub fn errors(&self) -> &[ServiceErrorDetail] {
        &self.errors
    }

    /// Code of the first service error entry.
    pub fn code(&self) -> Option<&str> {
        self.errors.first().map(|e| e.code.as_str())
    }

    /// Check if this is a credential or configuration error
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::CredentialInvalid | ErrorKind::ConfigInvalid
        )
    }
}

// Convenience constructors
impl Error {
    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a credential invalid error
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create a service error from the entries of an `<ErrorResponse>`.
    pub fn service(
        status: StatusCode,
        errors: Vec<ServiceErrorDetail>,
        request_id: Option<String>,
    ) -> Self {
        let message = match errors.first() {
            Some(e) => format!("{}: {}", e.code, e.message),
            None => format!("service returned {status}"),
        };

        Self {
            status: Some(status),
            request_id,
            errors,
            ..Self::new(ErrorKind::Service, message)
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::CredentialInvalid => write!(f, "invalid credentials"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::Service => write!(f, "service error"),
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::Decode => write!(f, "decode error"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

fn render_context(context: &[String]) -> String {
    if context.is_empty() {
        return String::new();
    }
    format!(" ({})", context.join(", "))
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::decode(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
