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

use awsdns_core::{Error, Result, ServiceErrorDetail};
use http::StatusCode;
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{
    AliasRRSet, ChangeInfo, HostedZone, Name, RRSet, RecordSet, RecordType, ResourceRecord,
};

const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";
const CHANGE_PREFIX: &str = "/change/";
const MAX_BODY_EXCERPT: usize = 256;

/// One page of `ListHostedZones`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZonePage {
    /// Zones on this page.
    pub zones: Vec<HostedZone>,
    /// Marker for the next page, set only when the listing is truncated.
    pub next_marker: Option<String>,
}

/// One page of `ListResourceRecordSets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetPage {
    /// Record sets on this page, in document order.
    pub record_sets: Vec<RecordSet>,
    /// Where the next page starts: name, type and set identifier. Set only
    /// when the listing is truncated.
    pub next: Option<(String, Option<String>, Option<String>)>,
}

/// Parse a `ListHostedZonesResponse`.
pub fn parse_list_hosted_zones(body: &[u8]) -> Result<HostedZonePage> {
    let resp: ListHostedZonesResponse = from_document(body, "ListHostedZonesResponse")?;

    let zones = resp
        .hosted_zones
        .hosted_zone
        .into_iter()
        .map(HostedZone::from)
        .collect();
    let next_marker = match (resp.is_truncated, resp.next_marker) {
        (true, Some(marker)) => Some(marker),
        (true, None) => {
            return Err(Error::decode(
                "truncated ListHostedZonesResponse carries no NextMarker",
            ))
        }
        (false, _) => None,
    };

    Ok(HostedZonePage { zones, next_marker })
}

/// Parse a `ListResourceRecordSetsResponse`.
///
/// Sets with neither `<ResourceRecords>` nor `<AliasTarget>`, and sets
/// whose record text does not decode, are dropped and logged.
pub fn parse_list_resource_record_sets(body: &[u8]) -> Result<RecordSetPage> {
    let resp: ListResourceRecordSetsResponse =
        from_document(body, "ListResourceRecordSetsResponse")?;

    // serde trims text, so record values are read again verbatim.
    let mut raw_values = raw_record_values(body)?.into_iter();

    let mut record_sets = Vec::with_capacity(resp.resource_record_sets.resource_record_set.len());
    for rrset in resp.resource_record_sets.resource_record_set {
        match rrset.into_record_set(raw_values.next()) {
            Ok(Some(v)) => record_sets.push(v),
            Ok(None) => {}
            Err(err) => warn!("dropping record set that failed to decode: {err}"),
        }
    }

    let next = match (resp.is_truncated, resp.next_record_name) {
        (true, Some(name)) => Some((name, resp.next_record_type, resp.next_record_identifier)),
        (true, None) => {
            return Err(Error::decode(
                "truncated ListResourceRecordSetsResponse carries no NextRecordName",
            ))
        }
        (false, _) => None,
    };

    Ok(RecordSetPage { record_sets, next })
}

/// Parse a response whose payload is a `<ChangeInfo>`, such as
/// `ChangeResourceRecordSetsResponse` or `DeleteHostedZoneResponse`.
pub fn parse_change_info(body: &[u8], root: &str) -> Result<ChangeInfo> {
    let resp: ChangeInfoResponse = from_document(body, root)?;
    Ok(resp.change_info.into())
}

/// Parse a `CreateHostedZoneResponse`.
pub fn parse_create_hosted_zone(body: &[u8]) -> Result<(HostedZone, ChangeInfo)> {
    let resp: CreateHostedZoneResponse = from_document(body, "CreateHostedZoneResponse")?;
    Ok((resp.hosted_zone.into(), resp.change_info.into()))
}

/// Turn an unsuccessful response into an error.
///
/// `<ErrorResponse>` and `<InvalidChangeBatch>` documents become
/// `Service` errors carrying every entry. Anything else becomes a
/// `Transport` error with the status attached.
pub fn parse_error_response(status: StatusCode, body: &[u8]) -> Error {
    match root_element(body).as_deref() {
        Ok("ErrorResponse") => {
            if let Ok(resp) = quick_xml::de::from_reader::<_, ErrorResponse>(body) {
                let errors = resp
                    .error
                    .into_iter()
                    .map(|e| ServiceErrorDetail {
                        error_type: e.r#type,
                        code: e.code,
                        message: e.message,
                    })
                    .collect();
                return Error::service(status, errors, resp.request_id);
            }
        }
        Ok("InvalidChangeBatch") => {
            if let Ok(resp) = quick_xml::de::from_reader::<_, InvalidChangeBatch>(body) {
                let errors = resp
                    .messages
                    .message
                    .into_iter()
                    .map(|message| ServiceErrorDetail {
                        error_type: "Sender".to_string(),
                        code: "InvalidChangeBatch".to_string(),
                        message,
                    })
                    .collect();
                return Error::service(status, errors, resp.request_id);
            }
        }
        _ => {}
    }

    Error::transport(format!("route53 responded with unexpected status {status}"))
        .with_status(status)
        .with_context(format!("body: {}", body_excerpt(body)))
}

/// At most [`MAX_BODY_EXCERPT`] bytes of `body`, cut on a char boundary.
fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= MAX_BODY_EXCERPT {
        return text.into_owned();
    }

    let mut end = MAX_BODY_EXCERPT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Deserialize `body` after checking its root element is `root`.
fn from_document<T: DeserializeOwned>(body: &[u8], root: &str) -> Result<T> {
    let found = root_element(body)?;
    if found != root {
        return Err(Error::decode(format!(
            "expected <{root}> document but found <{found}>"
        )));
    }

    quick_xml::de::from_reader(body)
        .map_err(|e| Error::decode(format!("failed to deserialize <{root}> document")).with_source(e))
}

/// Local name of the first element in `body`.
fn root_element(body: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    // Skip the XML declaration, comments and whitespace.
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(Error::decode("response body has no root element")),
            Ok(_) => {}
            Err(e) => {
                return Err(Error::decode("response body is not valid xml").with_source(e));
            }
        }
    }
}

/// The untrimmed `<Value>` texts under `<ResourceRecords>`, one list per
/// `<ResourceRecordSet>` in document order.
fn raw_record_values(body: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut reader = Reader::from_reader(body);
    let invalid = |e: quick_xml::Error| {
        Error::decode("response body is not valid xml").with_source(e)
    };

    let mut sets: Vec<Vec<String>> = Vec::new();
    let mut in_records = false;
    let mut value: Option<String> = None;
    loop {
        match reader.read_event().map_err(invalid)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"ResourceRecordSet" => sets.push(Vec::new()),
                b"ResourceRecords" => in_records = true,
                b"Value" if in_records => value = Some(String::new()),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"ResourceRecordSet" => sets.push(Vec::new()),
                b"Value" if in_records => {
                    if let Some(set) = sets.last_mut() {
                        set.push(String::new());
                    }
                }
                _ => {}
            },
            Event::Text(e) => {
                if let Some(v) = value.as_mut() {
                    v.push_str(&e.unescape().map_err(invalid)?);
                }
            }
            Event::CData(e) => {
                if let Some(v) = value.as_mut() {
                    v.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"ResourceRecords" => in_records = false,
                b"Value" => {
                    if let (Some(v), Some(set)) = (value.take(), sets.last_mut()) {
                        set.push(v);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sets)
}

fn strip_prefix(value: String, prefix: &str) -> String {
    match value.strip_prefix(prefix) {
        Some(v) => v.to_string(),
        None => value,
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ListHostedZonesResponse {
    hosted_zones: HostedZones,
    is_truncated: bool,
    next_marker: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct HostedZones {
    hosted_zone: Vec<HostedZoneXml>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct HostedZoneXml {
    id: String,
    name: String,
    caller_reference: String,
    resource_record_set_count: u64,
}

impl From<HostedZoneXml> for HostedZone {
    fn from(v: HostedZoneXml) -> Self {
        HostedZone {
            name: Name::new(v.name),
            identifier: strip_prefix(v.id, HOSTED_ZONE_PREFIX),
            reference: v.caller_reference,
            rrset_count: v.resource_record_set_count,
        }
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ListResourceRecordSetsResponse {
    resource_record_sets: ResourceRecordSets,
    is_truncated: bool,
    next_record_name: Option<String>,
    next_record_type: Option<String>,
    next_record_identifier: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ResourceRecordSets {
    resource_record_set: Vec<ResourceRecordSetXml>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ResourceRecordSetXml {
    name: String,
    r#type: String,
    #[serde(rename = "TTL")]
    ttl: u32,
    resource_records: Option<ResourceRecords>,
    alias_target: Option<AliasTarget>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ResourceRecords {
    resource_record: Vec<ResourceRecordXml>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ResourceRecordXml {
    value: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct AliasTarget {
    hosted_zone_id: String,
    #[serde(rename = "DNSName")]
    dns_name: String,
    evaluate_target_health: bool,
}

impl ResourceRecordSetXml {
    /// `Ok(None)` when the set carries neither records nor an alias target.
    ///
    /// `raw_values` replaces the trimmed record text when it lines up with
    /// the deserialized records.
    fn into_record_set(self, raw_values: Option<Vec<String>>) -> Result<Option<RecordSet>> {
        let label = Name::new(self.name);
        let record_type = RecordType::parse(&self.r#type);

        if let Some(alias) = self.alias_target {
            return Ok(Some(RecordSet::Alias(AliasRRSet {
                label,
                record_type,
                hosted_zone_id: alias.hosted_zone_id,
                dns_name: Name::new(alias.dns_name),
                evaluate_target_health: alias.evaluate_target_health,
            })));
        }

        let Some(records) = self.resource_records else {
            debug!("dropping record set {label} {record_type} without records or alias target");
            return Ok(None);
        };

        let values = match raw_values {
            Some(v) if v.len() == records.resource_record.len() => v,
            _ => records.resource_record.into_iter().map(|r| r.value).collect(),
        };
        let records = values
            .iter()
            .map(|v| ResourceRecord::from_text(&record_type, v))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.with_context(format!("record set: {label} {record_type}")))?;

        RRSet::new(label, record_type, self.ttl, records).map(|v| Some(RecordSet::Basic(v)))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ChangeInfoResponse {
    change_info: ChangeInfoXml,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ChangeInfoXml {
    id: String,
    status: String,
    submitted_at: String,
    comment: Option<String>,
}

impl From<ChangeInfoXml> for ChangeInfo {
    fn from(v: ChangeInfoXml) -> Self {
        ChangeInfo {
            id: strip_prefix(v.id, CHANGE_PREFIX),
            status: v.status,
            submitted_at: v.submitted_at,
            comment: v.comment,
        }
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct CreateHostedZoneResponse {
    hosted_zone: HostedZoneXml,
    change_info: ChangeInfoXml,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorResponse {
    error: Vec<ErrorXml>,
    request_id: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorXml {
    r#type: String,
    code: String,
    message: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct InvalidChangeBatch {
    messages: Messages,
    request_id: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Messages {
    message: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsdns_core::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_list_hosted_zones() {
        let body = br#"<?xml version="1.0"?>
<ListHostedZonesResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/"><HostedZones><HostedZone><Id>/hostedzone/ABCDEF123456</Id><Name>example.invalid.</Name><CallerReference>3CCF1549-806D-F91A-906F-A3727E910C87</CallerReference><Config><PrivateZone>false</PrivateZone></Config><ResourceRecordSetCount>6</ResourceRecordSetCount></HostedZone></HostedZones><IsTruncated>false</IsTruncated><MaxItems>100</MaxItems></ListHostedZonesResponse>
"#;

        let page = parse_list_hosted_zones(body).unwrap();
        assert_eq!(
            page,
            HostedZonePage {
                zones: vec![HostedZone {
                    name: Name::new("example.invalid."),
                    identifier: "ABCDEF123456".to_string(),
                    reference: "3CCF1549-806D-F91A-906F-A3727E910C87".to_string(),
                    rrset_count: 6,
                }],
                next_marker: None,
            }
        );
    }

    #[test]
    fn test_parse_change_info_without_namespace() {
        let body = br#"<?xml version="1.0" encoding="UTF-8"?>
<ChangeResourceRecordSetsResponse>
   <ChangeInfo>
      <Comment>string</Comment>
      <Id>/change/C2682N5HXP0BZ4</Id>
      <Status>PENDING</Status>
      <SubmittedAt>timestamp</SubmittedAt>
   </ChangeInfo>
</ChangeResourceRecordSetsResponse>
"#;

        let info = parse_change_info(body, "ChangeResourceRecordSetsResponse").unwrap();
        assert_eq!(
            info,
            ChangeInfo {
                id: "C2682N5HXP0BZ4".to_string(),
                status: "PENDING".to_string(),
                submitted_at: "timestamp".to_string(),
                comment: Some("string".to_string()),
            }
        );
    }

    #[test]
    fn test_wrong_root_is_decode_error() {
        let body = br#"<?xml version="1.0"?><ListHostedZonesResponse/>"#;

        let err = parse_change_info(body, "ChangeResourceRecordSetsResponse").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err = parse_list_hosted_zones(b"not xml at all").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_parse_error_response() {
        let body = br#"<?xml version="1.0"?>
<ErrorResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/"><Error><Type>Sender</Type><Code>InvalidChangeBatch</Code><Message>[Tried to create resource record set [name='duplicate.example.invalid.', type='CNAME'] but it already exists]</Message></Error><RequestId>9197fef4-03cc-11e9-b35f-7947070744f2</RequestId></ErrorResponse>
"#;

        let err = parse_error_response(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(
            err.errors(),
            &[ServiceErrorDetail {
                error_type: "Sender".to_string(),
                code: "InvalidChangeBatch".to_string(),
                message: "[Tried to create resource record set [name='duplicate.example.invalid.', type='CNAME'] but it already exists]".to_string(),
            }]
        );
        assert_eq!(
            err.request_id(),
            Some("9197fef4-03cc-11e9-b35f-7947070744f2")
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_parse_invalid_change_batch() {
        let body = br#"<?xml version="1.0"?>
<InvalidChangeBatch xmlns="https://route53.amazonaws.com/doc/2013-04-01/"><Messages><Message>first problem</Message><Message>second problem</Message></Messages><RequestId>b25f48e8</RequestId></InvalidChangeBatch>
"#;

        let err = parse_error_response(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(err.errors().len(), 2);
        assert_eq!(err.errors()[1].message, "second problem");
        assert_eq!(err.code(), Some("InvalidChangeBatch"));
    }

    #[test]
    fn test_unparseable_error_is_transport() {
        let err = parse_error_response(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert!(err.errors().is_empty());
    }

    #[test]
    fn test_unknown_record_text_is_verbatim() {
        let body = br#"<?xml version="1.0"?>
<ListResourceRecordSetsResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/"><ResourceRecordSets><ResourceRecordSet><Name>a.example.invalid.</Name><Type>X-NEW</Type><TTL>60</TTL><ResourceRecords><ResourceRecord><Value>  raw  text </Value></ResourceRecord><ResourceRecord><Value> a &amp; b</Value></ResourceRecord></ResourceRecords></ResourceRecordSet></ResourceRecordSets><IsTruncated>false</IsTruncated><MaxItems>100</MaxItems></ListResourceRecordSetsResponse>
"#;

        let page = parse_list_resource_record_sets(body).unwrap();
        assert_eq!(page.record_sets.len(), 1);
        let RecordSet::Basic(rrset) = &page.record_sets[0] else {
            panic!("expected a plain record set");
        };
        let values: Vec<_> = rrset.records().iter().cloned().collect();
        assert_eq!(
            values,
            vec![
                ResourceRecord::Unknown("  raw  text ".to_string()),
                ResourceRecord::Unknown(" a & b".to_string()),
            ]
        );
    }

    #[test]
    fn test_raw_record_values_skip_alias_sets() {
        let body = br#"<ListResourceRecordSetsResponse><ResourceRecordSets><ResourceRecordSet><Name>b.</Name><Type>A</Type><AliasTarget><HostedZoneId>Z2</HostedZoneId><DNSName>lb.</DNSName><EvaluateTargetHealth>false</EvaluateTargetHealth></AliasTarget></ResourceRecordSet><ResourceRecordSet><Name>c.</Name><Type>TXT</Type><ResourceRecords><ResourceRecord><Value><![CDATA[ x ]]></Value></ResourceRecord><ResourceRecord><Value/></ResourceRecord></ResourceRecords></ResourceRecordSet></ResourceRecordSets></ListResourceRecordSetsResponse>"#;

        let values = raw_record_values(body).unwrap();
        assert_eq!(
            values,
            vec![vec![], vec![" x ".to_string(), String::new()]]
        );
    }

    #[test]
    fn test_truncated_zones_without_marker_is_decode() {
        let body = br#"<ListHostedZonesResponse><HostedZones></HostedZones><IsTruncated>true</IsTruncated><MaxItems>100</MaxItems></ListHostedZonesResponse>"#;

        let err = parse_list_hosted_zones(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_truncated_record_sets_without_name_is_decode() {
        let body = br#"<ListResourceRecordSetsResponse><ResourceRecordSets></ResourceRecordSets><IsTruncated>true</IsTruncated><NextRecordType>A</NextRecordType><MaxItems>100</MaxItems></ListResourceRecordSetsResponse>"#;

        let err = parse_list_resource_record_sets(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_unparseable_error_body_is_truncated() {
        let body = "é".repeat(4096);

        let err = parse_error_response(StatusCode::BAD_GATEWAY, body.as_bytes());
        assert_eq!(err.kind(), ErrorKind::Transport);
        let msg = err.to_string();
        assert!(msg.len() < 1024, "error message too long: {}", msg.len());
        assert!(msg.contains("..."));
    }

    #[test]
    fn test_body_excerpt_keeps_short_bodies() {
        assert_eq!(body_excerpt(b"<html>bad gateway</html>"), "<html>bad gateway</html>");
    }
}
