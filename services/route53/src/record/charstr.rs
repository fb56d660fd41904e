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

//! Character strings in record text.
//!
//! Quoted strings escape `"` and `\` with a backslash. On input,
//! `\DDD` is read as an octal byte the way Route53 renders
//! non-printable characters.

use awsdns_core::{Error, Result};

/// Longest character string a single segment may carry, in bytes.
pub const MAX_SEGMENT_LEN: usize = 255;

/// A whitespace separated piece of record text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// Written inside double quotes.
    Quoted(String),
    /// Written bare.
    Bare(String),
}

impl Token {
    pub(crate) fn into_string(self) -> String {
        match self {
            Token::Quoted(s) | Token::Bare(s) => s,
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            Token::Quoted(s) | Token::Bare(s) => s,
        }
    }
}

/// Append `s` as one quoted string.
pub(crate) fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

/// Append `s` as quoted segments of at most [`MAX_SEGMENT_LEN`] bytes,
/// separated by spaces.
///
/// Splits only on character boundaries. An empty string becomes `""`.
pub(crate) fn push_segmented(out: &mut String, s: &str) {
    for (idx, seg) in segments(s).into_iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        push_quoted(out, seg);
    }
}

fn segments(s: &str) -> Vec<&str> {
    let mut segs = Vec::new();
    let mut rest = s;
    while rest.len() > MAX_SEGMENT_LEN {
        let mut cut = MAX_SEGMENT_LEN;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        segs.push(head);
        rest = tail;
    }
    segs.push(rest);
    segs
}

/// Split record text into tokens.
pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };

        let quoted = first == '"';
        if quoted {
            chars.next();
        }

        let mut buf: Vec<u8> = Vec::new();
        let mut closed = !quoted;
        while let Some(c) = chars.next() {
            match c {
                '"' if quoted => {
                    closed = true;
                    break;
                }
                c if !quoted && c.is_whitespace() => break,
                '\\' => {
                    let Some(next) = chars.next() else {
                        return Err(Error::decode("dangling escape in record text")
                            .with_context(format!("text: {text}")));
                    };
                    if let Some(d0) = next.to_digit(8) {
                        let d1 = chars.next().and_then(|c| c.to_digit(8));
                        let d2 = chars.next().and_then(|c| c.to_digit(8));
                        let (Some(d1), Some(d2)) = (d1, d2) else {
                            return Err(Error::decode("invalid octal escape in record text")
                                .with_context(format!("text: {text}")));
                        };
                        let value = d0 * 64 + d1 * 8 + d2;
                        let byte = u8::try_from(value).map_err(|_| {
                            Error::decode("octal escape out of range")
                                .with_context(format!("text: {text}"))
                        })?;
                        buf.push(byte);
                    } else {
                        push_char(&mut buf, next);
                    }
                }
                c => push_char(&mut buf, c),
            }
        }

        if !closed {
            return Err(Error::decode("unterminated quoted string in record text")
                .with_context(format!("text: {text}")));
        }

        let s = String::from_utf8(buf)?;
        tokens.push(if quoted {
            Token::Quoted(s)
        } else {
            Token::Bare(s)
        });
    }

    Ok(tokens)
}

fn push_char(buf: &mut Vec<u8>, c: char) {
    let mut tmp = [0u8; 4];
    buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
}
