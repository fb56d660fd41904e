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

//! Hash related utils.

use hmac::Hmac;
use hmac::Mac;
use sha2::Digest;
use sha2::Sha256;

/// Hex encoded SHA256 hash of an empty payload.
pub const EMPTY_STRING_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Hex encoded SHA256 hash.
///
/// Use this function instead of `hex::encode(sha256(content))` can reduce
/// extra copy.
pub fn hex_sha256(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content).as_slice())
}

/// HMAC with SHA256 hash.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Vec<u8> {
    sha256_mac(key, content).finalize().into_bytes().to_vec()
}

/// Hex encoded HMAC with SHA256 hash.
///
/// Use this function instead of `hex::encode(hmac_sha256(key, content))` can
/// reduce extra copy.
pub fn hex_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    hex::encode(sha256_mac(key, content).finalize().into_bytes())
}

fn sha256_mac(key: &[u8], content: &[u8]) -> Hmac<Sha256> {
    // SAFETY: HMAC accepts keys of any length, new_from_slice never fails.
    let mut h = Hmac::<Sha256>::new_from_slice(key).expect("hmac accepts any key length");
    h.update(content);
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_empty_string_sha256() {
        assert_eq!(hex_sha256(b""), EMPTY_STRING_SHA256);
    }

    // RFC 4231 test cases 1 and 2.
    #[test_case(
        &[0x0b; 20], b"Hi There",
        "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7";
        "rfc4231 case 1"
    )]
    #[test_case(
        b"Jefe", b"what do ya want for nothing?",
        "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843";
        "rfc4231 case 2"
    )]
    fn test_hex_hmac_sha256(key: &[u8], content: &[u8], expected: &str) {
        assert_eq!(hex_hmac_sha256(key, content), expected);
        assert_eq!(hex::encode(hmac_sha256(key, content)), expected);
    }
}
