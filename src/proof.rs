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


//! Data Integrity proof envelope: the `proof` entry of a secured document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    errors::{Error, ProofValueError},
    suite::{CRYPTOSUITE_NAME, PROOF_TYPE},
};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataIntegrityProof {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub cryptosuite: String,
    pub verification_method: String,
    pub proof_purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
}

impl DataIntegrityProof {
    /// Proof options for this cryptosuite, without `proofValue`.
    pub fn new(verification_method: impl Into<String>, proof_purpose: impl Into<String>) -> Self {
        Self {
            id: None,
            type_: PROOF_TYPE.to_owned(),
            cryptosuite: CRYPTOSUITE_NAME.to_owned(),
            verification_method: verification_method.into(),
            proof_purpose: proof_purpose.into(),
            created: None,
            proof_value: None,
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, Error> {
        Self::deserialize(value).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value, Error> {
        serde_json::to_value(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Splits a secured document into the unsecured document and its proof set.
pub fn strip_proof(document: &Value) -> Result<(Value, Vec<Value>), Error> {
    let mut unsecured = document
        .as_object()
        .cloned()
        .ok_or_else(|| Error::InvalidOptions("document must be a JSON object".to_owned()))?;
    let proofs = match unsecured.remove("proof") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(proofs)) => proofs,
        Some(proof) => vec![proof],
    };
    Ok((Value::Object(unsecured), proofs))
}

/// Every proof attached to `document`, whether `proof` holds one object or a set.
pub fn proof_set(document: &Value) -> Vec<&Value> {
    match document.get("proof") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(proofs)) => proofs.iter().collect(),
        Some(proof) => vec![proof],
    }
}

/// Inverse of [`strip_proof`]: a single proof is attached as an object, several as an array.
pub fn attach_proofs(document: Value, mut proofs: Vec<Value>) -> Result<Value, Error> {
    let mut secured: Map<String, Value> = match document {
        Value::Object(map) => map,
        _ => return Err(Error::InvalidOptions("document must be a JSON object".to_owned())),
    };
    match proofs.len() {
        0 => {}
        1 => {
            secured.insert("proof".to_owned(), proofs.remove(0));
        }
        _ => {
            secured.insert("proof".to_owned(), Value::Array(proofs));
        }
    }
    Ok(Value::Object(secured))
}

/// Whether `proof` is a `DataIntegrityProof` produced by this cryptosuite.
pub fn matches_suite(proof: &Value) -> bool {
    proof.get("type").and_then(Value::as_str) == Some(PROOF_TYPE)
        && proof.get("cryptosuite").and_then(Value::as_str) == Some(CRYPTOSUITE_NAME)
}

/// The proof with identifier `proof_id`, or else the only proof of this cryptosuite.
pub fn find_proof<'a>(proofs: &'a [Value], proof_id: Option<&str>) -> Result<&'a Value, Error> {
    if let Some(proof_id) = proof_id {
        let proof = proofs
            .iter()
            .find(|proof| proof.get("id").and_then(Value::as_str) == Some(proof_id))
            .ok_or(Error::MissingProof)?;
        if !matches_suite(proof) {
            return Err(Error::UnsupportedCryptosuite(format!(
                "proof \"{}\" is not a {} {} proof",
                proof_id, CRYPTOSUITE_NAME, PROOF_TYPE
            )));
        }
        return Ok(proof);
    }

    let mut matching = proofs.iter().filter(|proof| matches_suite(proof));
    match (matching.next(), matching.next()) {
        (Some(proof), None) => Ok(proof),
        (Some(_), Some(_)) => Err(Error::AmbiguousProof),
        (None, _) => Err(Error::MissingProof),
    }
}

pub fn check_purpose(proof: &Value, expected: &str) -> Result<(), Error> {
    match proof.get("proofPurpose").and_then(Value::as_str) {
        Some(found) if found == expected => Ok(()),
        found => Err(Error::PurposeMismatch {
            expected: expected.to_owned(),
            found: found.unwrap_or_default().to_owned(),
        }),
    }
}

pub fn proof_value(proof: &Value) -> Result<&str, ProofValueError> {
    proof
        .get("proofValue")
        .and_then(Value::as_str)
        .ok_or(ProofValueError::NotAString)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proof(id: &str) -> Value {
        let mut proof = DataIntegrityProof::new("did:example:issuer#key-1", "assertionMethod");
        proof.id = Some(id.to_owned());
        proof.to_value().unwrap()
    }

    #[test]
    fn serde_shape() {
        let value = DataIntegrityProof::new("did:example:issuer#key-1", "assertionMethod")
            .to_value()
            .unwrap();
        assert_eq!(
            value,
            json!({
                "type": "DataIntegrityProof",
                "cryptosuite": "bbs-2023",
                "verificationMethod": "did:example:issuer#key-1",
                "proofPurpose": "assertionMethod"
            })
        );
        assert!(matches_suite(&value));
        assert_eq!(DataIntegrityProof::from_value(&value).unwrap().proof_value, None);
    }

    #[test]
    fn proof_selection() {
        let ecdsa = json!({"type": "DataIntegrityProof", "cryptosuite": "ecdsa-sd-2023", "id": "urn:ecdsa"});
        let proofs = vec![ecdsa, proof("urn:a")];
        assert_eq!(find_proof(&proofs, None).unwrap()["id"], "urn:a");
        assert!(matches!(
            find_proof(&proofs, Some("urn:ecdsa")),
            Err(Error::UnsupportedCryptosuite(_))
        ));

        let proofs = vec![proof("urn:a"), proof("urn:b")];
        assert!(matches!(find_proof(&proofs, None), Err(Error::AmbiguousProof)));
        assert_eq!(find_proof(&proofs, Some("urn:b")).unwrap()["id"], "urn:b");
        assert!(matches!(find_proof(&proofs, Some("urn:c")), Err(Error::MissingProof)));
        assert!(matches!(find_proof(&[], None), Err(Error::MissingProof)));
    }

    #[test]
    fn strip_and_attach() {
        let document = json!({"name": "x", "proof": [proof("urn:a"), proof("urn:b")]});
        let (unsecured, proofs) = strip_proof(&document).unwrap();
        assert_eq!(unsecured, json!({"name": "x"}));
        assert_eq!(proofs.len(), 2);
        assert_eq!(proof_set(&document).len(), 2);
        assert!(proof_set(&unsecured).is_empty());
        assert_eq!(attach_proofs(unsecured, proofs).unwrap(), document);
    }

    #[test]
    fn purpose() {
        assert!(check_purpose(&proof("urn:a"), "assertionMethod").is_ok());
        assert!(matches!(
            check_purpose(&proof("urn:a"), "authentication"),
            Err(Error::PurposeMismatch { .. })
        ));
    }

    #[test]
    fn proof_value_must_be_a_string() {
        let mut value = proof("urn:a");
        assert_eq!(super::proof_value(&value), Err(ProofValueError::NotAString));
        value["proofValue"] = json!(42);
        assert_eq!(super::proof_value(&value), Err(ProofValueError::NotAString));
    }
}
