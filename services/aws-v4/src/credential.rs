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

use awsdns_core::utils::Redact;
use awsdns_core::{Error, Result, SigningCredential};
use std::fmt::{Debug, Formatter};

/// Credential that holds the access_key and secret_key.
///
/// Both keys are checked to be non-empty on construction, so every
/// `Credential` in circulation can sign.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl Credential {
    /// Create a new credential.
    ///
    /// Returns a `ConfigInvalid` error if either key is empty.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Result<Self> {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();

        if access_key_id.is_empty() {
            return Err(Error::config_invalid("access key id must not be empty"));
        }
        if secret_access_key.is_empty() {
            return Err(Error::config_invalid("secret access key must not be empty"));
        }

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: None,
        })
    }

    /// Attach a session token for temporary credentials.
    ///
    /// An empty token is treated as absent.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.session_token = (!token.is_empty()).then_some(token);
        self
    }

    /// Access key id for aws services.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Secret access key for aws services.
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Session token for aws services.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &Redact::id(&self.access_key_id))
            .field("secret_access_key", &Redact::secret(&self.secret_access_key))
            .field(
                "session_token",
                &Redact::optional_secret(self.session_token.as_deref()),
            )
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}
