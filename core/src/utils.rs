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

//! Utility functions and types.

use std::fmt::{self, Debug, Formatter};

/// Redact hides secrets when formatted with `{:?}`.
///
/// Access key ids keep their first and last three characters when they are
/// long enough to stay distinguishable. Secret keys and session tokens should
/// use [`Redact::secret`] and are never shown at all.
#[derive(Clone, Copy)]
pub struct Redact<'a> {
    value: Option<&'a str>,
    reveal_edges: bool,
}

impl<'a> Redact<'a> {
    /// Redact an identifier, keeping its edges visible.
    pub fn id(value: &'a str) -> Self {
        Self {
            value: Some(value),
            reveal_edges: true,
        }
    }

    /// Redact a secret entirely.
    pub fn secret(value: &'a str) -> Self {
        Self {
            value: Some(value),
            reveal_edges: false,
        }
    }

    /// Redact an optional secret entirely.
    pub fn optional_secret(value: Option<&'a str>) -> Self {
        Self {
            value,
            reveal_edges: false,
        }
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let v = match self.value {
            None => return f.write_str("None"),
            Some(v) if v.is_empty() => return f.write_str("EMPTY"),
            Some(v) => v,
        };

        let edges = self.reveal_edges && v.len() >= 12 && v.is_char_boundary(3);
        let tail = v.len().saturating_sub(3);
        if edges && v.is_char_boundary(tail) {
            write!(f, "{}***{}", &v[..3], &v[tail..])
        } else {
            f.write_str("***")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("", "EMPTY"; "empty")]
    #[test_case("AKIDSHORT", "***"; "short id")]
    #[test_case("AKIDEXAMPLE1234", "AKI***234"; "long id")]
    fn test_redact_id(input: &str, expected: &str) {
        assert_eq!(format!("{:?}", Redact::id(input)), expected);
    }

    #[test]
    fn test_redact_secret() {
        let secret = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";
        assert_eq!(format!("{:?}", Redact::secret(secret)), "***");
        assert_eq!(format!("{:?}", Redact::optional_secret(None)), "None");
        assert_eq!(
            format!("{:?}", Redact::optional_secret(Some(secret))),
            "***"
        );
    }
}
