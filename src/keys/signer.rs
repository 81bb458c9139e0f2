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


use rand::RngCore;
use zkryptium::{
    bbsplus::keys::{BBSplusPublicKey, BBSplusSecretKey},
    keys::pair::KeyPair,
    schemes::algorithms::BbsBls12381Sha256,
};

use crate::{
    bbs::{self, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH},
    errors::Error,
    suite::REQUIRED_ALGORITHMS,
};

use super::multikey::{encode_public_key_multibase, Multikey, MULTIKEY_TYPE};

/// Signing capability handed to the issuer.
///
/// `multisign` signs the ordered list of non-mandatory statements under the
/// given header and must return a raw 80 bytes BBS signature.
pub trait Signer: Send + Sync {
    /// Algorithm identifier, checked against the suite's supported algorithms.
    fn algorithm(&self) -> &str;

    /// Verification method IRI placed in the proof.
    fn verification_method(&self) -> &str;

    /// Compressed G2 public key embedded in the base proof.
    fn public_key(&self) -> &[u8];

    fn multisign(&self, header: &[u8], messages: &[Vec<u8>]) -> Result<[u8; SIGNATURE_LENGTH], Error>;
}

/// BBS_BLS12381G1_XMD:SHA-256_SSWU_RO_ key pair bound to a verification method.
#[derive(Clone, Debug)]
pub struct Bls12381Sha256Signer {
    verification_method: String,
    secret_key: BBSplusSecretKey,
    public_key: BBSplusPublicKey,
    public_key_bytes: [u8; PUBLIC_KEY_LENGTH],
}

impl Bls12381Sha256Signer {
    /// Minimum length of the key material fed to KeyGen.
    pub const IKM_LENGTH: usize = 32;

    /// Generates a fresh key pair from 32 random bytes.
    pub fn generate(verification_method: impl Into<String>) -> Result<Self, Error> {
        let mut key_material = [0u8; Self::IKM_LENGTH];
        rand::thread_rng().fill_bytes(&mut key_material);
        Self::from_key_material(&key_material, verification_method)
    }

    /// Deterministic KeyGen from the given key material (at least 32 bytes).
    pub fn from_key_material(key_material: &[u8], verification_method: impl Into<String>) -> Result<Self, Error> {
        if key_material.len() < Self::IKM_LENGTH {
            return Err(Error::InvalidKey(format!(
                "key material must be at least {} bytes",
                Self::IKM_LENGTH
            )));
        }
        let (secret_key, public_key) = KeyPair::<BbsBls12381Sha256>::generate(key_material, None, None)
            .map_err(|e| Error::InvalidKey(e.to_string()))?
            .into_parts();

        Ok(Self::new(verification_method.into(), secret_key, public_key))
    }

    /// Imports an existing key pair from its raw encodings.
    pub fn from_bytes(secret_key: &[u8], public_key: &[u8], verification_method: impl Into<String>) -> Result<Self, Error> {
        let secret_key = bbs::import_secret_key(secret_key)?;
        let public_key = bbs::import_public_key(public_key)?;
        Ok(Self::new(verification_method.into(), secret_key, public_key))
    }

    fn new(verification_method: String, secret_key: BBSplusSecretKey, public_key: BBSplusPublicKey) -> Self {
        let public_key_bytes = public_key.to_bytes();
        Self {
            verification_method,
            secret_key,
            public_key,
            public_key_bytes,
        }
    }

    pub fn public_key_multibase(&self) -> String {
        encode_public_key_multibase(&self.public_key_bytes)
    }

    /// Verification method document for this key.
    pub fn to_multikey(&self, controller: impl Into<String>) -> Multikey {
        Multikey {
            id: self.verification_method.clone(),
            type_: MULTIKEY_TYPE.to_owned(),
            controller: controller.into(),
            public_key_multibase: self.public_key_multibase(),
        }
    }
}

impl Signer for Bls12381Sha256Signer {
    fn algorithm(&self) -> &str {
        REQUIRED_ALGORITHMS[0]
    }

    fn verification_method(&self) -> &str {
        &self.verification_method
    }

    fn public_key(&self) -> &[u8] {
        &self.public_key_bytes
    }

    fn multisign(&self, header: &[u8], messages: &[Vec<u8>]) -> Result<[u8; SIGNATURE_LENGTH], Error> {
        bbs::sign(&self.secret_key, &self.public_key, header, messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_material_is_deterministic() {
        let ikm = [0x42u8; 32];
        let a = Bls12381Sha256Signer::from_key_material(&ikm, "did:example:issuer#a").unwrap();
        let b = Bls12381Sha256Signer::from_key_material(&ikm, "did:example:issuer#b").unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.public_key().len(), PUBLIC_KEY_LENGTH);
        assert_eq!(a.algorithm(), "BBS-BLS12-381-SHA-256");
    }

    #[test]
    fn short_key_material() {
        assert!(matches!(
            Bls12381Sha256Signer::from_key_material(&[0u8; 16], "did:example:issuer#a"),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn multikey_document() {
        let signer = Bls12381Sha256Signer::generate("did:example:issuer#key-1").unwrap();
        let multikey = signer.to_multikey("did:example:issuer");
        assert_eq!(multikey.id, "did:example:issuer#key-1");
        assert_eq!(multikey.type_, MULTIKEY_TYPE);
        let decoded = crate::keys::decode_public_key_multibase(&multikey.public_key_multibase).unwrap();
        assert_eq!(decoded.as_slice(), signer.public_key());
    }
}
