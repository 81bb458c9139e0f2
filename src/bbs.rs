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

//! BBS signature primitive used by the cryptosuite.
//!
//! The suite is pinned to the `BBS_BLS12381G1_XMD:SHA-256_SSWU_RO_` ciphersuite
//! of the [BBS draft](https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-bbs-signatures-06),
//! so every length below is a constant of that ciphersuite.

use std::collections::BTreeMap;

use zkryptium::{
    bbsplus::keys::{BBSplusPublicKey, BBSplusSecretKey},
    schemes::{
        algorithms::BbsBls12381Sha256,
        generics::{PoKSignature, Signature},
    },
};

use crate::errors::Error;

/// `A` (compressed G1 point) || `e` (scalar)
pub const SIGNATURE_LENGTH: usize = 80;
/// Compressed G2 point
pub const PUBLIC_KEY_LENGTH: usize = 96;
pub const SECRET_KEY_LENGTH: usize = 32;

const G1_LENGTH: usize = 48;
const SCALAR_LENGTH: usize = 32;
/// `Abar, Bbar, D` followed by `e^, r1^, r3^` and the challenge
const MIN_PROOF_LENGTH: usize = 3 * G1_LENGTH + 4 * SCALAR_LENGTH;

/// Sparse message vector handed to proof verification: signed message index -> disclosed message.
pub type SparseMessages = BTreeMap<usize, Vec<u8>>;

/// Imports a BBS public key from its 96 bytes compressed form.
pub fn import_public_key(bytes: &[u8]) -> Result<BBSplusPublicKey, Error> {
    if bytes.len() != PUBLIC_KEY_LENGTH {
        return Err(Error::InvalidKey(format!(
            "public key must be {} bytes, found {}",
            PUBLIC_KEY_LENGTH,
            bytes.len()
        )));
    }
    BBSplusPublicKey::from_bytes(bytes).map_err(|e| Error::InvalidKey(e.to_string()))
}

/// Imports a BBS secret key from its 32 bytes big-endian form.
pub fn import_secret_key(bytes: &[u8]) -> Result<BBSplusSecretKey, Error> {
    if bytes.len() != SECRET_KEY_LENGTH {
        return Err(Error::InvalidKey(format!(
            "secret key must be {} bytes, found {}",
            SECRET_KEY_LENGTH,
            bytes.len()
        )));
    }
    BBSplusSecretKey::from_bytes(bytes).map_err(|e| Error::InvalidKey(e.to_string()))
}

/// https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-bbs-signatures-06#name-signature-generation-sign -> signature = Sign(SK, PK, header, messages)
///
/// # Inputs:
/// * `sk` (REQUIRED), the signer's secret key.
/// * `pk` (REQUIRED), the public key matching `sk`.
/// * `header` (REQUIRED), here always `proofHash || mandatoryHash`.
/// * `messages` (REQUIRED), the UTF-8 encoded non-mandatory statements.
pub fn sign(
    sk: &BBSplusSecretKey,
    pk: &BBSplusPublicKey,
    header: &[u8],
    messages: &[Vec<u8>],
) -> Result<[u8; SIGNATURE_LENGTH], Error> {
    let signature = Signature::<BbsBls12381Sha256>::sign(Some(messages), sk, pk, Some(header))
        .map_err(|e| Error::Primitive(e.to_string()))?;
    Ok(signature.to_bytes())
}

/// https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-bbs-signatures-06#name-proof-generation-proofgen -> proof = ProofGen(PK, signature, header, ph, messages, disclosed_indexes)
///
/// # Description
/// Derives a zero-knowledge proof of knowledge of `signature` that reveals only the
/// messages at `disclosed_indexes` (ascending, relative to `messages`).
pub fn derive_proof(
    public_key: &[u8],
    signature: &[u8; SIGNATURE_LENGTH],
    header: &[u8],
    messages: &[Vec<u8>],
    presentation_header: &[u8],
    disclosed_indexes: &[usize],
) -> Result<Vec<u8>, Error> {
    let pk = import_public_key(public_key)?;
    if let Some(&index) = disclosed_indexes.iter().find(|&&i| i >= messages.len()) {
        return Err(Error::Primitive(format!(
            "disclosed index {} out of range for {} messages",
            index,
            messages.len()
        )));
    }

    let proof = PoKSignature::<BbsBls12381Sha256>::proof_gen(
        &pk,
        signature,
        Some(header),
        Some(presentation_header),
        Some(messages),
        Some(disclosed_indexes),
    )
    .map_err(|e| Error::Primitive(e.to_string()))?;

    Ok(proof.to_bytes())
}

/// https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-bbs-signatures-06#name-proof-verification-proofver -> result = ProofVerify(PK, proof, header, ph, disclosed_messages, disclosed_indexes)
///
/// Any failure (undecodable key or proof, wrong header, wrong messages) yields `false`.
pub fn verify_proof(
    proof: &[u8],
    header: &[u8],
    presentation_header: &[u8],
    messages: &SparseMessages,
    public_key: &[u8],
) -> bool {
    let pk = match import_public_key(public_key) {
        Ok(pk) => pk,
        Err(e) => {
            log::debug!("proof verification rejected public key: {}", e);
            return false;
        }
    };

    if proof.len() < MIN_PROOF_LENGTH || (proof.len() - MIN_PROOF_LENGTH) % SCALAR_LENGTH != 0 {
        log::debug!("proof verification rejected proof of {} bytes", proof.len());
        return false;
    }
    let proof = match PoKSignature::<BbsBls12381Sha256>::from_bytes(proof) {
        Ok(proof) => proof,
        Err(e) => {
            log::debug!("proof verification rejected proof encoding: {}", e);
            return false;
        }
    };

    let disclosed_indexes: Vec<usize> = messages.keys().copied().collect();
    let disclosed_messages: Vec<Vec<u8>> = messages.values().cloned().collect();

    proof
        .proof_verify(
            &pk,
            Some(&disclosed_messages),
            Some(&disclosed_indexes),
            Some(header),
            Some(presentation_header),
        )
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Bls12381Sha256Signer, Signer};

    fn messages() -> Vec<Vec<u8>> {
        ["first", "second", "third"]
            .iter()
            .map(|m| m.as_bytes().to_vec())
            .collect()
    }

    #[test]
    fn derive_and_verify() {
        let signer = Bls12381Sha256Signer::generate("did:example:issuer#key-1").unwrap();
        let header = [7u8; 64];
        let messages = messages();

        let signature = signer.multisign(&header, &messages).unwrap();
        let proof = derive_proof(signer.public_key(), &signature, &header, &messages, b"nonce", &[0, 2]).unwrap();

        let disclosed: SparseMessages = [(0, messages[0].clone()), (2, messages[2].clone())].into_iter().collect();
        assert!(verify_proof(&proof, &header, b"nonce", &disclosed, signer.public_key()));

        // wrong presentation header
        assert!(!verify_proof(&proof, &header, b"other", &disclosed, signer.public_key()));

        // wrong disclosed message
        let tampered: SparseMessages = [(0, b"forged".to_vec()), (2, messages[2].clone())].into_iter().collect();
        assert!(!verify_proof(&proof, &header, b"nonce", &tampered, signer.public_key()));
    }

    #[test]
    fn truncated_proof_is_rejected() {
        let signer = Bls12381Sha256Signer::generate("did:example:issuer#key-1").unwrap();
        assert!(!verify_proof(&[0u8; 100], &[0u8; 64], &[], &SparseMessages::new(), signer.public_key()));
    }

    #[test]
    fn out_of_range_index() {
        let signer = Bls12381Sha256Signer::generate("did:example:issuer#key-1").unwrap();
        let header = [1u8; 64];
        let messages = messages();
        let signature = signer.multisign(&header, &messages).unwrap();
        let result = derive_proof(signer.public_key(), &signature, &header, &messages, &[], &[3]);
        assert!(matches!(result, Err(Error::Primitive(_))));
    }

    #[test]
    fn public_key_length() {
        assert!(matches!(import_public_key(&[0u8; 48]), Err(Error::InvalidKey(_))));
    }
}
