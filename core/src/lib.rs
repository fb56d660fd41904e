//! Core components for talking to AWS.
//!
//! This crate provides the foundational types and traits shared by the
//! awsdns crates: the capabilities a client needs from its environment,
//! the error type every operation returns, and the abstractions used to
//! sign requests.
//!
//! ## Overview
//!
//! - **Context**: holds the HTTP transport, environment access and clock
//! - **Traits**: credential loading ([`ProvideCredential`]) and request
//!   signing ([`SignRequest`])
//! - **Signer**: coordinates credential loading and request signing
//! - **UrlContext**: scheme, host, port, path segments and query of a request
//!
//! ## Example
//!
//! ```no_run
//! use awsdns_core::{Context, Error, Result, Signer, ProvideCredential, SignRequest, SigningCredential};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! #[async_trait]
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential { key: "my-access-key".to_string() }))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyBuilder;
//!
//! #[async_trait]
//! impl SignRequest for MyBuilder {
//!     type Credential = MyCredential;
//!
//!     async fn sign_request(
//!         &self,
//!         _ctx: &Context,
//!         req: &mut http::request::Parts,
//!         cred: Option<&Self::Credential>,
//!     ) -> Result<()> {
//!         let cred = cred.ok_or_else(|| Error::config_invalid("missing credential"))?;
//!         req.headers.insert("x-my-key", cred.key.parse()?);
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::new(), MyLoader, MyBuilder);
//!
//! let mut parts = http::Request::builder()
//!     .method("GET")
//!     .uri("https://example.com")
//!     .body(())?
//!     .into_parts()
//!     .0;
//!
//! signer.sign(&mut parts).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: SHA256 and HMAC-SHA256 helpers
//! - [`time`]: timestamps and the [`time::Clock`] abstraction
//! - [`utils`]: redaction of secrets in debug output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};
mod error;
pub use error::{Error, ErrorKind, Result, ServiceErrorDetail};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod request;
pub use request::{SigningRequest, UrlContext};
mod signer;
pub use signer::Signer;
