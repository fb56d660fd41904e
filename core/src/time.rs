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

//! Time related utils.

use std::fmt::Debug;

use chrono::Utc;

/// DateTime used across awsdns, always in UTC.
pub type DateTime = chrono::DateTime<Utc>;

/// Current wall clock time.
///
/// Signing code never calls this directly, it asks the [`Clock`] held by
/// the [`Context`](crate::Context) instead.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: `20220301`
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format time into ISO8601 basic format: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Clock is the time source used while signing requests.
pub trait Clock: Debug + Send + Sync + 'static {
    /// Current time.
    fn now(&self) -> DateTime;
}

/// SystemClock reads the wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        now()
    }
}

/// FixedClock always returns the same instant.
///
/// Useful for deterministic signatures in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime);

impl Clock for FixedClock {
    fn now(&self) -> DateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format() {
        let t = Utc.timestamp_opt(1234567890, 0).unwrap();

        assert_eq!(format_date(t), "20090213");
        assert_eq!(format_iso8601(t), "20090213T233130Z");
    }

    #[test]
    fn test_fixed_clock() {
        let t = Utc.with_ymd_and_hms(2022, 3, 13, 7, 20, 4).unwrap();
        let clock = FixedClock(t);

        assert_eq!(clock.now(), t);
        assert_eq!(clock.now(), clock.now());
    }
}
