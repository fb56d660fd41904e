//! Route53 for awsdns.
//!
//! Typed hosted zones and record sets, the text form of each record type,
//! the Route53 XML bodies and a [`Route53Client`] that ties them to a
//! signed transport.
//!
//! ## Example
//!
//! ```no_run
//! use awsdns_aws_v4::Config;
//! use awsdns_core::{Context, Result};
//! use awsdns_route53::{upsert_rrset, RRSet, ResourceRecord, Route53Client};
//!
//! async fn point_www(ctx: Context, zone_id: &str) -> Result<()> {
//!     let client = Route53Client::new(ctx.clone(), Config::default().from_env(&ctx))?;
//!
//!     let rrset = RRSet::new(
//!         "www.example.com.",
//!         "A",
//!         300,
//!         [ResourceRecord::A("192.0.2.10".parse().unwrap())],
//!     )?;
//!     let info = client
//!         .change_resource_record_sets(zone_id, &[upsert_rrset(rrset)])
//!         .await?;
//!     println!("change {} is {}", info.id, info.status);
//!     Ok(())
//! }
//! ```

mod name;
pub use name::Name;

mod record;
pub use record::{Mx, Naptr, RecordType, ResourceRecord, Soa, Srv, MAX_SEGMENT_LEN};

mod model;
pub use model::{
    create_rrset, delete_rrset, upsert_rrset, AliasRRSet, Change, ChangeAction, ChangeInfo,
    HostedZone, RRSet, RRSetKey, RecordSet,
};

pub mod xml;

mod client;
pub use client::{Route53Client, ROUTE53_API_VERSION, ROUTE53_HOST, ROUTE53_SIGNING_REGION};
