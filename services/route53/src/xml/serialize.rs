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

use std::io::{self, Write};

use awsdns_core::{Error, Result};
use bytes::Bytes;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;

use super::ROUTE53_NAMESPACE;
use crate::{Change, Name, RecordSet};

/// Build a `ChangeResourceRecordSetsRequest` document.
///
/// Changes are written in the order given.
pub fn build_change_batch(changes: &[Change], comment: Option<&str>) -> Result<Bytes> {
    to_xml("ChangeResourceRecordSetsRequest", |w| {
        w.create_element("ChangeBatch").write_inner_content(|w| {
            if let Some(comment) = comment {
                write_text_element(w, "Comment", comment)?;
            }
            w.create_element("Changes").write_inner_content(|w| {
                for change in changes {
                    write_change(w, change)?;
                }
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    })
}

/// Build a `CreateHostedZoneRequest` document.
pub fn build_create_hosted_zone(
    name: &Name,
    caller_reference: &str,
    comment: Option<&str>,
) -> Result<Bytes> {
    to_xml("CreateHostedZoneRequest", |w| {
        write_text_element(w, "Name", name.as_str())?;
        write_text_element(w, "CallerReference", caller_reference)?;
        if let Some(comment) = comment {
            w.create_element("HostedZoneConfig")
                .write_inner_content(|w| write_text_element(w, "Comment", comment))?;
        }
        Ok(())
    })
}

/// Write the declaration and a namespaced root element around `content`.
fn to_xml<F>(root: &str, content: F) -> Result<Bytes>
where
    F: FnOnce(&mut Writer<&mut Vec<u8>>) -> io::Result<()>,
{
    let mut buf = Vec::with_capacity(512);
    {
        let mut writer = Writer::new(&mut buf);
        write_document(&mut writer, root, content).map_err(|e| {
            Error::unexpected("failed to write xml document")
                .with_context(format!("root: {root}"))
                .with_source(e)
        })?;
    }
    Ok(Bytes::from(buf))
}

fn write_document<W, F>(writer: &mut Writer<W>, root: &str, content: F) -> io::Result<()>
where
    W: Write,
    F: FnOnce(&mut Writer<W>) -> io::Result<()>,
{
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    writer
        .create_element(root)
        .with_attribute(("xmlns", ROUTE53_NAMESPACE))
        .write_inner_content(content)?;
    Ok(())
}

fn write_change<W: Write>(w: &mut Writer<W>, change: &Change) -> io::Result<()> {
    w.create_element("Change").write_inner_content(|w| {
        write_text_element(w, "Action", change.action.as_str())?;
        w.create_element("ResourceRecordSet")
            .write_inner_content(|w| write_record_set(w, &change.record_set))?;
        Ok(())
    })?;
    Ok(())
}

fn write_record_set<W: Write>(w: &mut Writer<W>, record_set: &RecordSet) -> io::Result<()> {
    match record_set {
        RecordSet::Basic(rrset) => {
            write_text_element(w, "Name", rrset.label().as_str())?;
            write_text_element(w, "Type", rrset.record_type().as_str())?;
            write_text_element(w, "TTL", &rrset.ttl().to_string())?;
            w.create_element("ResourceRecords").write_inner_content(|w| {
                for record in rrset.records() {
                    w.create_element("ResourceRecord")
                        .write_inner_content(|w| write_text_element(w, "Value", &record.to_text()))?;
                }
                Ok(())
            })?;
        }
        RecordSet::Alias(alias) => {
            write_text_element(w, "Name", alias.label.as_str())?;
            write_text_element(w, "Type", alias.record_type.as_str())?;
            w.create_element("AliasTarget").write_inner_content(|w| {
                write_text_element(w, "HostedZoneId", &alias.hosted_zone_id)?;
                write_text_element(w, "DNSName", alias.dns_name.as_str())?;
                write_text_element(
                    w,
                    "EvaluateTargetHealth",
                    if alias.evaluate_target_health {
                        "true"
                    } else {
                        "false"
                    },
                )
            })?;
        }
    }
    Ok(())
}

/// Write a simple `<tag>text</tag>` element.
///
/// Only `<`, `>` and `&` are escaped, quotes in record text stay readable.
fn write_text_element<W: Write>(w: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    w.create_element(tag)
        .write_text_content(BytesText::from_escaped(partial_escape(text)))?;
    Ok(())
}
