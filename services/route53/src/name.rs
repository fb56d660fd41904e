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

use std::fmt::{self, Display, Formatter};

/// Name is a DNS name in presentation form, like `www.example.com.`.
///
/// The text is kept as given. Dots and backslashes that are part of a
/// label appear escaped with a backslash. Two names are equal when their
/// text is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    /// Create a name from text that is already in presentation form.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Create a name from raw labels.
    ///
    /// Dots and backslashes inside a label are escaped. End with an empty
    /// label to get an absolute name:
    ///
    /// ```
    /// use awsdns_route53::Name;
    ///
    /// let name = Name::from_labels(["a.b", "example", "com", ""]);
    /// assert_eq!(name.as_str(), "a\\.b.example.com.");
    /// ```
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for (idx, label) in labels.into_iter().enumerate() {
            if idx > 0 {
                text.push('.');
            }
            for c in label.as_ref().chars() {
                if c == '.' || c == '\\' {
                    text.push('\\');
                }
                text.push(c);
            }
        }
        if text.is_empty() {
            text.push('.');
        }
        Self(text)
    }

    /// The presentation text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name ends with the root label.
    pub fn is_absolute(&self) -> bool {
        let mut escaped = false;
        let mut last_dot = false;
        for c in self.0.chars() {
            last_dot = !escaped && c == '.';
            escaped = !escaped && c == '\\';
        }
        last_dot
    }

    /// Raw labels with escapes removed.
    ///
    /// An absolute name ends with an empty label; the root name `.` is a
    /// single empty label.
    pub fn labels(&self) -> Vec<String> {
        if self.0 == "." {
            return vec![String::new()];
        }

        let mut labels = Vec::new();
        let mut current = String::new();
        let mut chars = self.0.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                '.' => labels.push(std::mem::take(&mut current)),
                c => current.push(c),
            }
        }
        labels.push(current);
        labels
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Name {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
