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


use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::errors::Error;

use super::{canonicalize::canonicalize, context::DocumentLoader};

/// SHA-256 over the canonical N-Quads of the proof configuration.
///
/// The configuration is the proof without `proofValue`, evaluated under the
/// document's `@context` unless the proof carries its own.
pub fn hash_canonized_proof(document: &Value, proof: &Value, loader: &dyn DocumentLoader) -> Result<[u8; 32], Error> {
    let mut configuration = proof
        .as_object()
        .cloned()
        .ok_or_else(|| Error::InvalidOptions("proof must be a JSON object".to_owned()))?;
    configuration.remove("proofValue");
    if !configuration.contains_key("@context") {
        if let Some(context) = document.get("@context") {
            configuration.insert("@context".to_owned(), context.clone());
        }
    }

    let nquads = canonicalize(&Value::Object(configuration), loader)?;
    Ok(Sha256::digest(nquads.concat().as_bytes()).into())
}

/// SHA-256 over the concatenated mandatory N-Quads.
pub fn hash_mandatory<'a>(mandatory: impl IntoIterator<Item = &'a String>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for nquad in mandatory {
        hasher.update(nquad.as_bytes());
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::context::StaticLoader;
    use serde_json::json;

    #[test]
    fn proof_value_is_not_hashed() {
        let document = json!({"@context": "https://www.w3.org/ns/credentials/v2"});
        let proof = json!({
            "type": "DataIntegrityProof",
            "cryptosuite": "bbs-2023",
            "verificationMethod": "did:example:issuer#key-1",
            "proofPurpose": "assertionMethod"
        });
        let mut signed = proof.clone();
        signed["proofValue"] = json!("u2V0CoQ");

        let loader = StaticLoader::new();
        let hash = hash_canonized_proof(&document, &proof, &loader).unwrap();
        assert_eq!(hash, hash_canonized_proof(&document, &signed, &loader).unwrap());

        let mut other = proof.clone();
        other["proofPurpose"] = json!("authentication");
        assert_ne!(hash, hash_canonized_proof(&document, &other, &loader).unwrap());
    }

    #[test]
    fn mandatory_hash_of_nothing() {
        assert_eq!(
            hex::encode(hash_mandatory(&Vec::new())),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        let nquads = vec!["<a> <b> <c> .\n".to_owned(), "<d> <e> <f> .\n".to_owned()];
        assert_eq!(
            hash_mandatory(&nquads),
            <[u8; 32]>::from(Sha256::digest(nquads.concat().as_bytes()))
        );
    }
}
