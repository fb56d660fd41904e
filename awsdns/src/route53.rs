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

//! Route53 with convenience constructors.

pub use awsdns_route53::*;

#[cfg(feature = "default-context")]
use crate::aws::Config;
#[cfg(feature = "default-context")]
use crate::{default_context, Result};

/// Create a [`Route53Client`] on the [`default_context`].
///
/// Credentials come from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`
/// and `AWS_SESSION_TOKEN`.
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> awsdns::Result<()> {
/// let client = awsdns::route53::default_client()?;
/// for zone in client.list_hosted_zones().await? {
///     println!("{} {}", zone.identifier, zone.name);
/// }
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_client() -> Result<Route53Client> {
    let ctx = default_context();
    let config = Config::default().from_env(&ctx);
    Route53Client::new(ctx, config)
}
