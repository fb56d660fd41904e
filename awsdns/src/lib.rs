#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use awsdns_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

/// AWS SigV4 signing.
pub mod aws {
    pub use awsdns_aws_v4::*;
}

pub mod route53;
