// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use multibase::Base;
use serde::{Deserialize, Serialize};

use crate::{bbs::PUBLIC_KEY_LENGTH, errors::Error};

pub const MULTIKEY_TYPE: &str = "Multikey";

/// Multicodec `bls12_381-g2-pub` (0xeb) as an unsigned varint.
const BLS12_381_G2_PUB_HEADER: [u8; 2] = [0xeb, 0x01];

/// Multikey verification method carrying a BLS12-381 G2 public key.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Multikey {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub controller: String,
    pub public_key_multibase: String,
}

impl Multikey {
    pub fn public_key(&self) -> Result<Vec<u8>, Error> {
        if self.type_ != MULTIKEY_TYPE {
            return Err(Error::InvalidKey(format!("unsupported verification method type \"{}\"", self.type_)));
        }
        decode_public_key_multibase(&self.public_key_multibase)
    }
}

/// `z` + base58btc(0xeb 0x01 || pk)
pub fn encode_public_key_multibase(public_key: &[u8]) -> String {
    let bytes = [&BLS12_381_G2_PUB_HEADER[..], public_key].concat();
    multibase::encode(Base::Base58Btc, bytes)
}

pub fn decode_public_key_multibase(value: &str) -> Result<Vec<u8>, Error> {
    let (base, bytes) = multibase::decode(value).map_err(|e| Error::InvalidKey(e.to_string()))?;
    if base != Base::Base58Btc {
        return Err(Error::InvalidKey("publicKeyMultibase must be base58btc encoded".to_owned()));
    }
    match bytes.strip_prefix(&BLS12_381_G2_PUB_HEADER[..]) {
        Some(key) if key.len() == PUBLIC_KEY_LENGTH => Ok(key.to_vec()),
        Some(key) => Err(Error::InvalidKey(format!(
            "expected a {} bytes public key, found {}",
            PUBLIC_KEY_LENGTH,
            key.len()
        ))),
        None => Err(Error::InvalidKey("missing bls12_381-g2-pub multicodec header".to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_other_codecs() {
        // ed25519-pub header
        let encoded = multibase::encode(Base::Base58Btc, [&[0xed, 0x01][..], &[1u8; 32][..]].concat());
        assert!(decode_public_key_multibase(&encoded).is_err());
    }

    #[test]
    fn rejects_other_bases() {
        let encoded = multibase::encode(Base::Base64Url, [&BLS12_381_G2_PUB_HEADER[..], &[1u8; 96][..]].concat());
        assert!(decode_public_key_multibase(&encoded).is_err());
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::json!({
            "id": "did:example:issuer#key-1",
            "type": "Multikey",
            "controller": "did:example:issuer",
            "publicKeyMultibase": encode_public_key_multibase(&[3u8; 96]),
        });
        let multikey: Multikey = serde_json::from_value(json).unwrap();
        assert_eq!(multikey.public_key().unwrap(), vec![3u8; 96]);
    }
}
