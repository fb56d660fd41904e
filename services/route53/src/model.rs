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

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use awsdns_core::{Error, Result};

use crate::{Name, RecordType, ResourceRecord};

/// HostedZone as listed by Route53.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Zone apex, for example `example.com.`.
    pub name: Name,
    /// Zone id without the `/hostedzone/` prefix.
    pub identifier: String,
    /// Caller reference given at creation.
    pub reference: String,
    /// Number of record sets in the zone.
    pub rrset_count: u64,
}

/// ChangeInfo describes a submitted change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    /// Change id without the `/change/` prefix.
    pub id: String,
    /// `PENDING` or `INSYNC`.
    pub status: String,
    /// Submission time as sent by Route53.
    pub submitted_at: String,
    /// Comment attached to the change, if any.
    pub comment: Option<String>,
}

/// RRSetKey identifies a record set inside a zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RRSetKey {
    /// Owner name.
    pub label: Name,
    /// Record type.
    pub record_type: RecordType,
}

impl RRSetKey {
    /// Create a new key.
    pub fn new(label: impl Into<Name>, record_type: impl Into<RecordType>) -> Self {
        Self {
            label: label.into(),
            record_type: record_type.into(),
        }
    }
}

impl Display for RRSetKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label, self.record_type)
    }
}

/// RRSet is a basic record set: records of one type under one name.
///
/// Records are kept in an ordered set, so duplicates collapse and
/// serialization order is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RRSet {
    label: Name,
    record_type: RecordType,
    ttl: u32,
    records: BTreeSet<ResourceRecord>,
}

impl RRSet {
    /// Create a record set.
    ///
    /// Every record must be of `record_type`; records of unknown types
    /// only fit sets of an unknown type.
    pub fn new(
        label: impl Into<Name>,
        record_type: impl Into<RecordType>,
        ttl: u32,
        records: impl IntoIterator<Item = ResourceRecord>,
    ) -> Result<Self> {
        let label = label.into();
        let record_type = record_type.into();
        let records = records.into_iter().collect::<BTreeSet<_>>();

        if let Some(bad) = records.iter().find(|r| !r.fits(&record_type)) {
            return Err(Error::request_invalid(format!(
                "record {bad} does not belong in a {record_type} record set"
            ))
            .with_context(format!("label: {label}")));
        }

        Ok(Self {
            label,
            record_type,
            ttl,
            records,
        })
    }

    /// Owner name.
    pub fn label(&self) -> &Name {
        &self.label
    }

    /// Record type shared by all records.
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Time to live in seconds.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Records in their stable order.
    pub fn records(&self) -> &BTreeSet<ResourceRecord> {
        &self.records
    }

    /// Key of this set.
    pub fn key(&self) -> RRSetKey {
        RRSetKey::new(self.label.clone(), self.record_type.clone())
    }
}

/// AliasRRSet points a name at another AWS resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRRSet {
    /// Owner name.
    pub label: Name,
    /// Record type served for the alias.
    pub record_type: RecordType,
    /// Hosted zone of the target.
    pub hosted_zone_id: String,
    /// DNS name of the target.
    pub dns_name: Name,
    /// Whether Route53 checks the target's health.
    pub evaluate_target_health: bool,
}

impl AliasRRSet {
    /// Key of this set.
    pub fn key(&self) -> RRSetKey {
        RRSetKey::new(self.label.clone(), self.record_type.clone())
    }
}

/// RecordSet is either a basic or an alias record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSet {
    /// Records listed by value.
    Basic(RRSet),
    /// Alias to another AWS resource.
    Alias(AliasRRSet),
}

impl RecordSet {
    /// Key of this set.
    pub fn key(&self) -> RRSetKey {
        match self {
            RecordSet::Basic(v) => v.key(),
            RecordSet::Alias(v) => v.key(),
        }
    }
}

impl From<RRSet> for RecordSet {
    fn from(v: RRSet) -> Self {
        RecordSet::Basic(v)
    }
}

impl From<AliasRRSet> for RecordSet {
    fn from(v: AliasRRSet) -> Self {
        RecordSet::Alias(v)
    }
}

/// ChangeAction is what a change does to its record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    /// Fails if the set exists.
    Create,
    /// Fails unless the set matches exactly.
    Delete,
    /// Creates or replaces.
    Upsert,
}

impl ChangeAction {
    /// The action string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Create => "CREATE",
            ChangeAction::Delete => "DELETE",
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

impl Display for ChangeAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change is one entry of a change batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// What to do.
    pub action: ChangeAction,
    /// The set it applies to.
    pub record_set: RecordSet,
}

/// Create `record_set`.
pub fn create_rrset(record_set: impl Into<RecordSet>) -> Change {
    Change {
        action: ChangeAction::Create,
        record_set: record_set.into(),
    }
}

/// Delete `record_set`.
pub fn delete_rrset(record_set: impl Into<RecordSet>) -> Change {
    Change {
        action: ChangeAction::Delete,
        record_set: record_set.into(),
    }
}

/// Create or replace `record_set`.
pub fn upsert_rrset(record_set: impl Into<RecordSet>) -> Change {
    Change {
        action: ChangeAction::Upsert,
        record_set: record_set.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsdns_core::ErrorKind;
    use std::collections::HashMap;
    use std::net::Ipv4Addr;

    #[test]
    fn test_rrset_collapses_duplicates() {
        let rrset = RRSet::new(
            "example.invalid.",
            RecordType::Ns,
            120,
            [
                ResourceRecord::Ns(Name::new("ns-2.awsdns-2.net.")),
                ResourceRecord::Ns(Name::new("ns-1.awsdns-1.net.")),
                ResourceRecord::Ns(Name::new("ns-2.awsdns-2.net.")),
            ],
        )
        .unwrap();

        assert_eq!(rrset.records().len(), 2);
        assert_eq!(
            rrset.records().iter().next(),
            Some(&ResourceRecord::Ns(Name::new("ns-1.awsdns-1.net.")))
        );
    }

    #[test]
    fn test_rrset_rejects_mixed_types() {
        let err = RRSet::new(
            "example.invalid.",
            RecordType::Cname,
            60,
            [ResourceRecord::A(Ipv4Addr::new(192, 0, 2, 1))],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);

        let err = RRSet::new(
            "example.invalid.",
            RecordType::Txt,
            60,
            [ResourceRecord::Unknown("raw".to_string())],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_key_is_hashable() {
        let rrset = RRSet::new(
            "foo.example.invalid.",
            "CNAME",
            60,
            [ResourceRecord::Cname(Name::new("bar.example.invalid."))],
        )
        .unwrap();
        let alias = AliasRRSet {
            label: Name::new("bar.example.invalid."),
            record_type: RecordType::A,
            hosted_zone_id: "ZSXD5Q7O3X7TRK".to_string(),
            dns_name: Name::new("elb.example.invalid."),
            evaluate_target_health: false,
        };

        let map = HashMap::from([
            (rrset.key(), RecordSet::from(rrset.clone())),
            (alias.key(), RecordSet::from(alias.clone())),
        ]);
        assert_eq!(
            map.get(&RRSetKey::new("foo.example.invalid.", "CNAME")),
            Some(&RecordSet::Basic(rrset))
        );
        assert_eq!(
            map.get(&RRSetKey::new("bar.example.invalid.", "A")),
            Some(&RecordSet::Alias(alias))
        );
    }

    #[test]
    fn test_change_constructors() {
        let rrset = RRSet::new("a.", RecordType::A, 60, Vec::<ResourceRecord>::new()).unwrap();

        assert_eq!(create_rrset(rrset.clone()).action, ChangeAction::Create);
        assert_eq!(delete_rrset(rrset.clone()).action, ChangeAction::Delete);
        assert_eq!(upsert_rrset(rrset).action.to_string(), "UPSERT");
    }
}
