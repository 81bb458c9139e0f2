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


use ::hmac::{Hmac, Mac};
use multibase::Base;
use rand::RngCore;
use sha2::Sha256;

use crate::errors::Error;

type HmacSha256 = Hmac<Sha256>;

pub const HMAC_KEY_LENGTH: usize = 32;

/// HMAC-SHA-256 key used to randomize blank node labels.
///
/// Generated by the issuer, carried inside the base proof and re-imported by the holder.
#[derive(Clone, PartialEq, Eq)]
pub struct HmacKey([u8; HMAC_KEY_LENGTH]);

impl HmacKey {
    pub fn generate() -> Self {
        let mut key = [0u8; HMAC_KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut key);
        Self(key)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let key: [u8; HMAC_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| Error::Hmac(format!("key must be {} bytes, found {}", HMAC_KEY_LENGTH, bytes.len())))?;
        Ok(Self(key))
    }

    pub fn to_bytes(&self) -> [u8; HMAC_KEY_LENGTH] {
        self.0
    }

    pub fn digest(&self, data: &[u8]) -> Result<[u8; 32], Error> {
        let mut mac = HmacSha256::new_from_slice(&self.0).map_err(|e| Error::Hmac(e.to_string()))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().into())
    }

    /// `u` + base64url-no-pad(HMAC(label))
    pub fn label_id(&self, label: &str) -> Result<String, Error> {
        let digest = self.digest(label.as_bytes())?;
        Ok(multibase::encode(Base::Base64Url, digest))
    }
}

impl core::fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("HmacKey(..)")
    }
}
