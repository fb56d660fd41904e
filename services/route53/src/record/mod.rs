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

//! Typed resource records and their text form.

mod charstr;
pub use charstr::MAX_SEGMENT_LEN;

use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use awsdns_core::{Error, Result};

use crate::Name;
use charstr::{push_quoted, push_segmented, tokenize, Token};

/// RecordType names the kind of a record set.
///
/// Parsing is total: any type string this crate does not model becomes
/// [`RecordType::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    /// IPv4 address.
    A,
    /// IPv6 address.
    Aaaa,
    /// Canonical name.
    Cname,
    /// Mail exchange.
    Mx,
    /// Naming authority pointer.
    Naptr,
    /// Name server.
    Ns,
    /// Pointer.
    Ptr,
    /// Start of authority.
    Soa,
    /// Sender policy framework.
    Spf,
    /// Service locator.
    Srv,
    /// Text.
    Txt,
    /// Any other type, kept verbatim.
    Unknown(String),
}

impl RecordType {
    /// The type string used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Naptr => "NAPTR",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Soa => "SOA",
            RecordType::Spf => "SPF",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
            RecordType::Unknown(s) => s,
        }
    }

    /// Parse a type string. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "MX" => RecordType::Mx,
            "NAPTR" => RecordType::Naptr,
            "NS" => RecordType::Ns,
            "PTR" => RecordType::Ptr,
            "SOA" => RecordType::Soa,
            "SPF" => RecordType::Spf,
            "SRV" => RecordType::Srv,
            "TXT" => RecordType::Txt,
            other => RecordType::Unknown(other.to_string()),
        }
    }

    /// Whether this type is modelled by [`ResourceRecord`].
    pub fn is_known(&self) -> bool {
        !matches!(self, RecordType::Unknown(_))
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// MX record data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mx {
    /// Lower is preferred.
    pub preference: u16,
    /// Host accepting mail.
    pub exchange: Name,
}

/// SRV record data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Srv {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: Name,
}

/// SOA record data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Soa {
    /// Primary name server.
    pub mname: Name,
    /// Mailbox of the responsible person.
    pub rname: Name,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// NAPTR record data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Naptr {
    pub order: u16,
    pub preference: u16,
    pub flags: String,
    pub service: String,
    /// Substitution expression, empty when `replacement` is used.
    pub regexp: String,
    pub replacement: Name,
}

/// ResourceRecord is one typed record of a record set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceRecord {
    /// `A` record.
    A(Ipv4Addr),
    /// `AAAA` record.
    Aaaa(Ipv6Addr),
    /// `CNAME` record, the canonical name.
    Cname(Name),
    /// `MX` record.
    Mx(Mx),
    /// `NAPTR` record.
    Naptr(Naptr),
    /// `NS` record, the name server.
    Ns(Name),
    /// `PTR` record.
    Ptr(Name),
    /// `SOA` record.
    Soa(Soa),
    /// `SPF` record, one logical string.
    Spf(String),
    /// `SRV` record.
    Srv(Srv),
    /// `TXT` record, its character strings in order.
    Txt(Vec<String>),
    /// Record of a type this crate does not model, raw text kept as is.
    Unknown(String),
}

impl ResourceRecord {
    /// Type of this record, `None` for [`ResourceRecord::Unknown`].
    pub fn record_type(&self) -> Option<RecordType> {
        Some(match self {
            ResourceRecord::A(_) => RecordType::A,
            ResourceRecord::Aaaa(_) => RecordType::Aaaa,
            ResourceRecord::Cname(_) => RecordType::Cname,
            ResourceRecord::Mx(_) => RecordType::Mx,
            ResourceRecord::Naptr(_) => RecordType::Naptr,
            ResourceRecord::Ns(_) => RecordType::Ns,
            ResourceRecord::Ptr(_) => RecordType::Ptr,
            ResourceRecord::Soa(_) => RecordType::Soa,
            ResourceRecord::Spf(_) => RecordType::Spf,
            ResourceRecord::Srv(_) => RecordType::Srv,
            ResourceRecord::Txt(_) => RecordType::Txt,
            ResourceRecord::Unknown(_) => return None,
        })
    }

    /// Whether this record may live in a set of type `rtype`.
    pub fn fits(&self, rtype: &RecordType) -> bool {
        match self.record_type() {
            Some(t) => &t == rtype,
            None => !rtype.is_known(),
        }
    }

    /// Render the record the way Route53 expects it in `<Value>`.
    pub fn to_text(&self) -> String {
        let mut s = String::new();
        match self {
            ResourceRecord::A(addr) => s.push_str(&addr.to_string()),
            ResourceRecord::Aaaa(addr) => s.push_str(&addr.to_string()),
            ResourceRecord::Cname(name) | ResourceRecord::Ns(name) | ResourceRecord::Ptr(name) => {
                s.push_str(name.as_str())
            }
            ResourceRecord::Mx(mx) => {
                s = format!("{} {}", mx.preference, mx.exchange);
            }
            ResourceRecord::Naptr(v) => {
                s = format!("{} {} ", v.order, v.preference);
                push_quoted(&mut s, &v.flags);
                s.push(' ');
                push_quoted(&mut s, &v.service);
                s.push(' ');
                push_quoted(&mut s, &v.regexp);
                s.push(' ');
                s.push_str(v.replacement.as_str());
            }
            ResourceRecord::Soa(v) => {
                s = format!(
                    "{} {} {} {} {} {} {}",
                    v.mname, v.rname, v.serial, v.refresh, v.retry, v.expire, v.minimum
                );
            }
            ResourceRecord::Spf(v) => push_segmented(&mut s, v),
            ResourceRecord::Srv(v) => {
                s = format!("{} {} {} {}", v.priority, v.weight, v.port, v.target);
            }
            ResourceRecord::Txt(texts) => {
                for (idx, text) in texts.iter().enumerate() {
                    if idx > 0 {
                        s.push(' ');
                    }
                    push_segmented(&mut s, text);
                }
            }
            ResourceRecord::Unknown(raw) => s.push_str(raw),
        }
        s
    }

    /// Parse the text of one `<Value>` as a record of type `rtype`.
    ///
    /// Unknown types always succeed. Text that does not fit a known type is
    /// a `Decode` error.
    pub fn from_text(rtype: &RecordType, text: &str) -> Result<Self> {
        let decode_err = |reason: &str| {
            Error::decode(format!("invalid {rtype} record: {reason}"))
                .with_context(format!("text: {text}"))
        };

        let record = match rtype {
            RecordType::Unknown(_) => ResourceRecord::Unknown(text.to_string()),
            RecordType::A => ResourceRecord::A(
                text.trim()
                    .parse()
                    .map_err(|_| decode_err("not an IPv4 address"))?,
            ),
            RecordType::Aaaa => ResourceRecord::Aaaa(
                text.trim()
                    .parse()
                    .map_err(|_| decode_err("not an IPv6 address"))?,
            ),
            RecordType::Cname | RecordType::Ns | RecordType::Ptr => {
                let [name] = fields::<1>(text, &decode_err)?;
                let name = Name::new(name.into_string());
                match rtype {
                    RecordType::Cname => ResourceRecord::Cname(name),
                    RecordType::Ns => ResourceRecord::Ns(name),
                    _ => ResourceRecord::Ptr(name),
                }
            }
            RecordType::Mx => {
                let [preference, exchange] = fields::<2>(text, &decode_err)?;
                ResourceRecord::Mx(Mx {
                    preference: number(&preference, &decode_err)?,
                    exchange: Name::new(exchange.into_string()),
                })
            }
            RecordType::Srv => {
                let [priority, weight, port, target] = fields::<4>(text, &decode_err)?;
                ResourceRecord::Srv(Srv {
                    priority: number(&priority, &decode_err)?,
                    weight: number(&weight, &decode_err)?,
                    port: number(&port, &decode_err)?,
                    target: Name::new(target.into_string()),
                })
            }
            RecordType::Soa => {
                let [mname, rname, serial, refresh, retry, expire, minimum] =
                    fields::<7>(text, &decode_err)?;
                ResourceRecord::Soa(Soa {
                    mname: Name::new(mname.into_string()),
                    rname: Name::new(rname.into_string()),
                    serial: number(&serial, &decode_err)?,
                    refresh: number(&refresh, &decode_err)?,
                    retry: number(&retry, &decode_err)?,
                    expire: number(&expire, &decode_err)?,
                    minimum: number(&minimum, &decode_err)?,
                })
            }
            RecordType::Naptr => {
                let [order, preference, flags, service, regexp, replacement] =
                    fields::<6>(text, &decode_err)?;
                ResourceRecord::Naptr(Naptr {
                    order: number(&order, &decode_err)?,
                    preference: number(&preference, &decode_err)?,
                    flags: flags.into_string(),
                    service: service.into_string(),
                    regexp: regexp.into_string(),
                    replacement: Name::new(replacement.into_string()),
                })
            }
            RecordType::Txt => {
                let tokens = tokenize(text)?;
                if tokens.is_empty() {
                    return Err(decode_err("no character strings"));
                }
                ResourceRecord::Txt(tokens.into_iter().map(Token::into_string).collect())
            }
            RecordType::Spf => {
                let tokens = tokenize(text)?;
                if tokens.is_empty() {
                    return Err(decode_err("no character strings"));
                }
                ResourceRecord::Spf(tokens.into_iter().map(Token::into_string).collect())
            }
        };

        Ok(record)
    }
}

impl Display for ResourceRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Split `text` into exactly `N` tokens.
fn fields<const N: usize>(text: &str, err: &dyn Fn(&str) -> Error) -> Result<[Token; N]> {
    let tokens = tokenize(text)?;
    let found = tokens.len();
    tokens
        .try_into()
        .map_err(|_| err(&format!("expected {N} fields, found {found}")))
}

fn number<T: FromStr>(token: &Token, err: &dyn Fn(&str) -> Error) -> Result<T> {
    token
        .as_str()
        .parse()
        .map_err(|_| err(&format!("{:?} is not a valid number", token.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsdns_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn naptr_with_regexp() -> ResourceRecord {
        ResourceRecord::Naptr(Naptr {
            order: 3,
            preference: 7,
            flags: "SUP".to_string(),
            service: "E2U+sip".to_string(),
            regexp: "!^(\\+441632960083)$!sip:\\1@example.test!".to_string(),
            replacement: Name::new("."),
        })
    }

    #[test]
    fn test_txt_encoding() {
        let txt = ResourceRecord::Txt(vec![
            "foo bar baz quux".to_string(),
            "bzzzzzt".to_string(),
            "\"".to_string(),
        ]);

        assert_eq!(txt.to_text(), r#""foo bar baz quux" "bzzzzzt" "\"""#);
    }

    #[test]
    fn test_unknown_roundtrip() {
        let rtype = RecordType::parse("X-TXAWS-FICTIONAL");
        let record = ResourceRecord::from_text(&rtype, "foo bar baz").unwrap();

        assert_eq!(record, ResourceRecord::Unknown("foo bar baz".to_string()));
        assert_eq!(record.to_text(), "foo bar baz");
        assert!(record.fits(&rtype));
        assert!(!record.fits(&RecordType::Txt));
    }

    #[test_case(RecordType::A, ResourceRecord::A(Ipv4Addr::new(192, 0, 2, 1)); "a")]
    #[test_case(RecordType::Aaaa, ResourceRecord::Aaaa("2001:DB8::d0c".parse().unwrap()); "aaaa")]
    #[test_case(RecordType::Cname, ResourceRecord::Cname(Name::new("bar")); "cname")]
    #[test_case(RecordType::Mx, ResourceRecord::Mx(Mx { preference: 15, exchange: Name::new("bar") }); "mx")]
    #[test_case(RecordType::Naptr, naptr_with_regexp(); "naptr with regexp")]
    #[test_case(RecordType::Ptr, ResourceRecord::Ptr(Name::new("foo.example.test")); "ptr")]
    #[test_case(RecordType::Spf, ResourceRecord::Spf("v=spf1 ip4:192.0.2.1/24 -all".to_string()); "spf")]
    #[test_case(RecordType::Srv, ResourceRecord::Srv(Srv { priority: 1, weight: 2, port: 3, target: Name::new("example.test") }); "srv")]
    #[test_case(RecordType::Txt, ResourceRecord::Txt(vec!["foo bar baz quux".into(), "bzzzzzt".into(), "\"".into(), "é".into()]); "txt")]
    fn test_text_roundtrip(rtype: RecordType, record: ResourceRecord) {
        let text = record.to_text();
        assert_eq!(ResourceRecord::from_text(&rtype, &text).unwrap(), record);
        assert_eq!(record.record_type(), Some(rtype));
    }

    #[test]
    fn test_naptr_text() {
        assert_eq!(
            naptr_with_regexp().to_text(),
            r#"3 7 "SUP" "E2U+sip" "!^(\\+441632960083)$!sip:\\1@example.test!" ."#
        );

        let with_replacement = ResourceRecord::from_text(
            &RecordType::Naptr,
            r#"3 7 "SUP" "E2U+sip" "" foo.example.test."#,
        )
        .unwrap();
        assert_eq!(
            with_replacement,
            ResourceRecord::Naptr(Naptr {
                order: 3,
                preference: 7,
                flags: "SUP".to_string(),
                service: "E2U+sip".to_string(),
                regexp: String::new(),
                replacement: Name::new("foo.example.test."),
            })
        );
    }

    #[test]
    fn test_soa_text() {
        let text = "1.awsdns-1.net. awsdns-hostmaster.amazon.com. 1 7200 900 1209600 86400";
        let soa = ResourceRecord::from_text(&RecordType::Soa, text).unwrap();

        assert_eq!(
            soa,
            ResourceRecord::Soa(Soa {
                mname: Name::new("1.awsdns-1.net."),
                rname: Name::new("awsdns-hostmaster.amazon.com."),
                serial: 1,
                refresh: 7200,
                retry: 900,
                expire: 1209600,
                minimum: 86400,
            })
        );
        assert_eq!(soa.to_text(), text);
    }

    #[test]
    fn test_long_txt_is_split_not_truncated() {
        let long = "x".repeat(300);
        let text = ResourceRecord::Txt(vec![long.clone()]).to_text();

        assert_eq!(text, format!("\"{}\" \"{}\"", "x".repeat(255), "x".repeat(45)));
        match ResourceRecord::from_text(&RecordType::Txt, &text).unwrap() {
            ResourceRecord::Txt(texts) => assert_eq!(texts.concat(), long),
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn test_long_spf_concatenates() {
        let long = format!("v=spf1 {}-all", "ip4:192.0.2.1 ".repeat(30));
        let record = ResourceRecord::Spf(long);

        let text = record.to_text();
        assert!(text.contains("\" \""));
        assert_eq!(
            ResourceRecord::from_text(&RecordType::Spf, &text).unwrap(),
            record
        );
    }

    #[test_case(RecordType::A, "not-an-address"; "bad a")]
    #[test_case(RecordType::Aaaa, "192.0.2.1"; "bad aaaa")]
    #[test_case(RecordType::Mx, "bar 15"; "swapped mx")]
    #[test_case(RecordType::Srv, "1 2 example.test"; "short srv")]
    #[test_case(RecordType::Soa, "a. b. 1 2 3"; "short soa")]
    #[test_case(RecordType::Cname, ""; "empty cname")]
    #[test_case(RecordType::Txt, "\"unterminated"; "bad txt")]
    fn test_malformed_text(rtype: RecordType, text: &str) {
        let err = ResourceRecord::from_text(&rtype, text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_record_type_parse_is_total() {
        assert_eq!(RecordType::parse("AAAA"), RecordType::Aaaa);
        assert_eq!("CAA".parse::<RecordType>().unwrap(), RecordType::Unknown("CAA".into()));
        assert_eq!(RecordType::Unknown("CAA".into()).to_string(), "CAA");
    }
}
