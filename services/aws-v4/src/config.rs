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

use crate::constants::*;
use crate::Credential;
use awsdns_core::{Context, Error, Result};

/// Config for aws services.
///
/// Every field may be set explicitly; [`Config::from_env`] only fills the
/// ones that are still unset.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(Debug))]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`]
    pub region: Option<String>,
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SECRET_ACCESS_KEY`]
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SESSION_TOKEN`]
    pub session_token: Option<String>,
}

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.region.is_none() {
            self.region = envs.get(AWS_REGION).cloned();
        }
        if self.access_key_id.is_none() {
            self.access_key_id = envs.get(AWS_ACCESS_KEY_ID).cloned();
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = envs.get(AWS_SECRET_ACCESS_KEY).cloned();
        }
        if self.session_token.is_none() {
            self.session_token = envs.get(AWS_SESSION_TOKEN).cloned();
        }

        self
    }

    /// Build the credential described by this config.
    ///
    /// Missing or empty keys are a `ConfigInvalid` error.
    pub fn credential(&self) -> Result<Credential> {
        let (Some(ak), Some(sk)) = (&self.access_key_id, &self.secret_access_key) else {
            return Err(Error::config_invalid(
                "access key id and secret access key are required",
            )
            .with_context(format!(
                "set them explicitly or through {AWS_ACCESS_KEY_ID} and {AWS_SECRET_ACCESS_KEY}"
            )));
        };

        let cred = Credential::new(ak.as_str(), sk.as_str())?;
        Ok(match &self.session_token {
            Some(token) => cred.with_session_token(token.as_str()),
            None => cred,
        })
    }
}
