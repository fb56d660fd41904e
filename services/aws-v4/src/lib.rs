//! AWS Signature Version 4 for awsdns.
//!
//! This crate builds SigV4 canonical requests, derives signing keys and
//! composes fully signed `http::Request`s.
//!
//! ## Example
//!
//! ```no_run
//! use awsdns_aws_v4::{Credential, RequestDetails};
//! use awsdns_core::{Result, UrlContext};
//! use bytes::Bytes;
//! use http::uri::Scheme;
//! use http::Method;
//!
//! fn build() -> Result<http::Request<Bytes>> {
//!     let cred = Credential::new("access_key_id", "secret_access_key")?;
//!     let url = UrlContext::new(Scheme::HTTPS, "route53.amazonaws.com")
//!         .with_path(["2013-04-01", "hostedzone"]);
//!
//!     RequestDetails::new("us-east-1", "route53", Method::GET, url, b"")
//!         .compose(&cred, awsdns_core::time::now(), Bytes::new())
//! }
//! ```
//!
//! Requests built elsewhere can be signed in place through
//! [`RequestSigner`], which implements [`awsdns_core::SignRequest`].

mod constants;
pub use constants::{AWS_ACCESS_KEY_ID, AWS_REGION, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN};
pub use constants::{X_AMZ_CONTENT_SHA_256, X_AMZ_DATE, X_AMZ_SECURITY_TOKEN};

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::{EnvCredentialProvider, StaticCredentialProvider};

pub mod canonical;
pub use canonical::{canonicalize, CanonicalRequest};

mod sign_request;
pub use sign_request::{generate_signing_key, string_to_sign, RequestSigner};

mod compose;
pub use compose::RequestDetails;
