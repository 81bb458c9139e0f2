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


//! `proofValue` encoding for base and derived proofs.
//!
//! `u` + base64url-no-pad(`0xd9 0x5d <mode>` || CBOR field array), with mode
//! `0x02` for base proofs and `0x03` for derived proofs.

use std::collections::BTreeMap;

use ciborium::value::{Integer, Value};
use multibase::Base;

use crate::{
    bbs::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH},
    errors::{Error, ProofValueError, ProofValueKind},
    primitives::{hmac::HMAC_KEY_LENGTH, labels::LabelMap},
};

pub const BASE_PROOF_HEADER: [u8; 3] = [0xd9, 0x5d, 0x02];
pub const DERIVED_PROOF_HEADER: [u8; 3] = [0xd9, 0x5d, 0x03];

/// CBOR tag for a byte string carrying a typed array of `u8`.
const TYPED_ARRAY_UINT8_TAG: u64 = 64;

const CANONICAL_LABEL_PREFIX: &str = "c14n";
const RANDOMIZED_LABEL_PREFIX: &str = "b";

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BaseProofValue {
    pub signature: [u8; SIGNATURE_LENGTH],
    pub public_key: [u8; PUBLIC_KEY_LENGTH],
    pub hmac_key: [u8; HMAC_KEY_LENGTH],
    pub mandatory_pointers: Vec<String>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DerivedProofValue {
    pub bbs_proof: Vec<u8>,
    /// `c14n<N>` -> `b<M>`
    pub label_map: LabelMap,
    pub mandatory_indexes: Vec<usize>,
    pub selective_indexes: Vec<usize>,
    pub presentation_header: Vec<u8>,
}

impl BaseProofValue {
    pub fn encode(&self) -> Result<String, Error> {
        let fields = Value::Array(vec![
            Value::Bytes(self.signature.to_vec()),
            Value::Bytes(self.public_key.to_vec()),
            Value::Bytes(self.hmac_key.to_vec()),
            Value::Array(
                self.mandatory_pointers
                    .iter()
                    .map(|pointer| Value::Text(pointer.clone()))
                    .collect(),
            ),
        ]);
        serialize(&BASE_PROOF_HEADER, &fields)
    }

    pub fn decode(proof_value: &str) -> Result<Self, Error> {
        let mut fields = deserialize(proof_value, ProofValueKind::Base, 4)?.into_iter();
        let mut next = || fields.next().ok_or(ProofValueError::ComponentCount { expected: 4, found: 0 });

        Ok(Self {
            signature: fixed_bytes("bbsSignature", next()?)?,
            public_key: fixed_bytes("publicKey", next()?)?,
            hmac_key: fixed_bytes("hmacKey", next()?)?,
            mandatory_pointers: text_array("mandatoryPointers", next()?)?,
        })
    }
}

impl DerivedProofValue {
    pub fn encode(&self) -> Result<String, Error> {
        let label_map = compress_label_map(&self.label_map)?
            .into_iter()
            .map(|(k, v)| (Value::Integer(k.into()), Value::Integer(v.into())))
            .collect();
        let indexes = |indexes: &[usize]| {
            Value::Array(
                indexes
                    .iter()
                    .map(|&index| Value::Integer(Integer::from(index as u64)))
                    .collect(),
            )
        };

        let fields = Value::Array(vec![
            Value::Bytes(self.bbs_proof.clone()),
            Value::Map(label_map),
            indexes(&self.mandatory_indexes),
            indexes(&self.selective_indexes),
            Value::Bytes(self.presentation_header.clone()),
        ]);
        serialize(&DERIVED_PROOF_HEADER, &fields)
    }

    pub fn decode(proof_value: &str) -> Result<Self, Error> {
        let mut fields = deserialize(proof_value, ProofValueKind::Derived, 5)?.into_iter();
        let mut next = || fields.next().ok_or(ProofValueError::ComponentCount { expected: 5, found: 0 });

        Ok(Self {
            bbs_proof: bytes("bbsProof", next()?)?,
            label_map: decompress_label_map(&uint_map("labelMap", next()?)?),
            mandatory_indexes: uint_array("mandatoryIndexes", next()?)?,
            selective_indexes: uint_array("selectiveIndexes", next()?)?,
            presentation_header: bytes("presentationHeader", next()?)?,
        })
    }
}

fn kind_of(bytes: &[u8]) -> Option<ProofValueKind> {
    if bytes.starts_with(&BASE_PROOF_HEADER) {
        Some(ProofValueKind::Base)
    } else if bytes.starts_with(&DERIVED_PROOF_HEADER) {
        Some(ProofValueKind::Derived)
    } else {
        None
    }
}

/// `c14n<k>` -> `b<v>` becomes `k` -> `v`.
pub fn compress_label_map(label_map: &LabelMap) -> Result<BTreeMap<u64, u64>, Error> {
    label_map
        .iter()
        .map(|(canonical, randomized)| -> Result<(u64, u64), Error> {
            Ok((
                label_ordinal(canonical, CANONICAL_LABEL_PREFIX)?,
                label_ordinal(randomized, RANDOMIZED_LABEL_PREFIX)?,
            ))
        })
        .collect()
}

pub fn decompress_label_map(compressed: &BTreeMap<u64, u64>) -> LabelMap {
    compressed
        .iter()
        .map(|(k, v)| {
            (
                format!("{}{}", CANONICAL_LABEL_PREFIX, k),
                format!("{}{}", RANDOMIZED_LABEL_PREFIX, v),
            )
        })
        .collect()
}

fn label_ordinal(label: &str, prefix: &str) -> Result<u64, ProofValueError> {
    label
        .strip_prefix(prefix)
        .filter(|ordinal| !ordinal.is_empty() && ordinal.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|ordinal| ordinal.parse().ok())
        .ok_or_else(|| ProofValueError::InvalidField {
            field: "labelMap",
            reason: format!("contains label \"{}\" that is not of the form {}<N>", label, prefix),
        })
}

fn serialize(header: &[u8; 3], fields: &Value) -> Result<String, Error> {
    let mut bytes = header.to_vec();
    ciborium::ser::into_writer(fields, &mut bytes).map_err(|e| Error::Serialization(e.to_string()))?;
    Ok(multibase::encode(Base::Base64Url, bytes))
}

fn decode_multibase(proof_value: &str) -> Result<Vec<u8>, ProofValueError> {
    if !proof_value.starts_with('u') {
        return Err(ProofValueError::UnsupportedEncoding);
    }
    let (_, bytes) = multibase::decode(proof_value).map_err(|e| ProofValueError::Multibase(e.to_string()))?;
    Ok(bytes)
}

fn deserialize(proof_value: &str, expected: ProofValueKind, components: usize) -> Result<Vec<Value>, ProofValueError> {
    let bytes = decode_multibase(proof_value)?;
    let found = kind_of(&bytes);
    if found != Some(expected) {
        return Err(ProofValueError::UnexpectedKind { expected, found });
    }

    let mut payload = &bytes[BASE_PROOF_HEADER.len()..];
    let value: Value = ciborium::de::from_reader(&mut payload).map_err(|e| ProofValueError::Cbor(e.to_string()))?;
    if !payload.is_empty() {
        return Err(ProofValueError::Cbor(format!("{} trailing bytes", payload.len())));
    }

    match value {
        Value::Array(fields) if fields.len() == components => Ok(fields),
        Value::Array(fields) => Err(ProofValueError::ComponentCount {
            expected: components,
            found: fields.len(),
        }),
        _ => Err(ProofValueError::Cbor("payload is not an array".to_owned())),
    }
}

fn bytes(field: &'static str, value: Value) -> Result<Vec<u8>, ProofValueError> {
    match value {
        Value::Bytes(bytes) => Ok(bytes),
        Value::Tag(TYPED_ARRAY_UINT8_TAG, inner) => match *inner {
            Value::Bytes(bytes) => Ok(bytes),
            _ => Err(invalid(field, "must be a byte string")),
        },
        _ => Err(invalid(field, "must be a byte string")),
    }
}

fn fixed_bytes<const N: usize>(field: &'static str, value: Value) -> Result<[u8; N], ProofValueError> {
    let bytes = bytes(field, value)?;
    let length = bytes.len();
    bytes
        .try_into()
        .map_err(|_| invalid(field, &format!("must be {} bytes, found {}", N, length)))
}

fn text_array(field: &'static str, value: Value) -> Result<Vec<String>, ProofValueError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Text(text) => Ok(text),
                _ => Err(invalid(field, "must be an array of strings")),
            })
            .collect(),
        _ => Err(invalid(field, "must be an array of strings")),
    }
}

fn uint(field: &'static str, value: &Value) -> Result<u64, ProofValueError> {
    match value {
        Value::Integer(integer) => u64::try_from(*integer).map_err(|_| invalid(field, "must contain unsigned integers")),
        _ => Err(invalid(field, "must contain unsigned integers")),
    }
}

fn uint_array(field: &'static str, value: Value) -> Result<Vec<usize>, ProofValueError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let index = uint(field, item)?;
                usize::try_from(index).map_err(|_| invalid(field, "index out of range"))
            })
            .collect(),
        _ => Err(invalid(field, "must be an array of unsigned integers")),
    }
}

fn uint_map(field: &'static str, value: Value) -> Result<BTreeMap<u64, u64>, ProofValueError> {
    match value {
        Value::Map(entries) => {
            let mut map = BTreeMap::new();
            for (key, value) in &entries {
                if map.insert(uint(field, key)?, uint(field, value)?).is_some() {
                    return Err(invalid(field, "contains duplicate keys"));
                }
            }
            Ok(map)
        }
        _ => Err(invalid(field, "must be a map of unsigned integers")),
    }
}

fn invalid(field: &'static str, reason: &str) -> ProofValueError {
    ProofValueError::InvalidField {
        field,
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BaseProofValue {
        BaseProofValue {
            signature: [1u8; SIGNATURE_LENGTH],
            public_key: [2u8; PUBLIC_KEY_LENGTH],
            hmac_key: [3u8; HMAC_KEY_LENGTH],
            mandatory_pointers: vec!["/issuer".to_owned(), "/credentialSubject/a~1b".to_owned()],
        }
    }

    fn derived(labels: usize) -> DerivedProofValue {
        DerivedProofValue {
            bbs_proof: vec![7u8; 304],
            label_map: (0..labels)
                .map(|i| (format!("c14n{}", i), format!("b{}", labels - 1 - i)))
                .collect(),
            mandatory_indexes: vec![0, 2, 5],
            selective_indexes: vec![1, 3],
            presentation_header: b"presentation".to_vec(),
        }
    }

    fn decode_fails_with(result: Result<impl core::fmt::Debug, Error>) -> ProofValueError {
        match result {
            Err(Error::MalformedProofValue(cause)) => cause,
            other => panic!("expected malformed proof value, got {:?}", other),
        }
    }

    #[test]
    fn base_round_trip() {
        let encoded = base().encode().unwrap();
        assert!(encoded.starts_with("u2V0C"));
        assert_eq!(BaseProofValue::decode(&encoded).unwrap(), base());
        assert_eq!(kind_of(&decode_multibase(&encoded).unwrap()), Some(ProofValueKind::Base));
    }

    #[test]
    fn derived_round_trip() {
        for labels in [0, 1, 12] {
            let value = derived(labels);
            let encoded = value.encode().unwrap();
            assert!(encoded.starts_with("u2V0D"));
            assert_eq!(DerivedProofValue::decode(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn tag_discrimination() {
        let base = base().encode().unwrap();
        let derived = derived(2).encode().unwrap();

        let cause = decode_fails_with(DerivedProofValue::decode(&base));
        assert_eq!(
            cause,
            ProofValueError::UnexpectedKind {
                expected: ProofValueKind::Derived,
                found: Some(ProofValueKind::Base)
            }
        );
        let cause = decode_fails_with(BaseProofValue::decode(&derived));
        assert_eq!(
            cause,
            ProofValueError::UnexpectedKind {
                expected: ProofValueKind::Base,
                found: Some(ProofValueKind::Derived)
            }
        );
    }

    #[test]
    fn only_base64url() {
        let base58 = multibase::encode(Base::Base58Btc, BASE_PROOF_HEADER);
        assert_eq!(decode_fails_with(BaseProofValue::decode(&base58)), ProofValueError::UnsupportedEncoding);
    }

    #[test]
    fn wrong_signature_length() {
        let mut fields = vec![
            Value::Bytes(vec![1u8; 79]),
            Value::Bytes(vec![2u8; PUBLIC_KEY_LENGTH]),
            Value::Bytes(vec![3u8; HMAC_KEY_LENGTH]),
            Value::Array(vec![]),
        ];
        let encoded = serialize(&BASE_PROOF_HEADER, &Value::Array(fields.clone())).unwrap();
        assert!(matches!(
            decode_fails_with(BaseProofValue::decode(&encoded)),
            ProofValueError::InvalidField { field: "bbsSignature", .. }
        ));

        fields.pop();
        let encoded = serialize(&BASE_PROOF_HEADER, &Value::Array(fields)).unwrap();
        assert_eq!(
            decode_fails_with(BaseProofValue::decode(&encoded)),
            ProofValueError::ComponentCount { expected: 4, found: 3 }
        );
    }

    #[test]
    fn typed_array_byte_strings() {
        let tagged = |bytes: Vec<u8>| Value::Tag(TYPED_ARRAY_UINT8_TAG, Box::new(Value::Bytes(bytes)));
        let fields = Value::Array(vec![
            tagged(vec![9u8; 272]),
            Value::Map(vec![(Value::Integer(0.into()), Value::Integer(1.into()))]),
            Value::Array(vec![Value::Integer(0.into())]),
            Value::Array(vec![]),
            tagged(vec![]),
        ]);
        let encoded = serialize(&DERIVED_PROOF_HEADER, &fields).unwrap();
        let decoded = DerivedProofValue::decode(&encoded).unwrap();
        assert_eq!(decoded.bbs_proof, vec![9u8; 272]);
        assert_eq!(decoded.label_map["c14n0"], "b1");
        assert!(decoded.presentation_header.is_empty());
    }

    #[test]
    fn negative_indexes() {
        let fields = Value::Array(vec![
            Value::Bytes(vec![]),
            Value::Map(vec![]),
            Value::Array(vec![Value::Integer((-1).into())]),
            Value::Array(vec![]),
            Value::Bytes(vec![]),
        ]);
        let encoded = serialize(&DERIVED_PROOF_HEADER, &fields).unwrap();
        assert!(matches!(
            decode_fails_with(DerivedProofValue::decode(&encoded)),
            ProofValueError::InvalidField { field: "mandatoryIndexes", .. }
        ));
    }

    #[test]
    fn label_compression() {
        let map = derived(3).label_map;
        let compressed = compress_label_map(&map).unwrap();
        assert_eq!(compressed, [(0, 2), (1, 1), (2, 0)].into_iter().collect());
        assert_eq!(decompress_label_map(&compressed), map);

        let bad: LabelMap = [("_:c14n0".to_owned(), "b0".to_owned())].into_iter().collect();
        assert!(compress_label_map(&bad).is_err());
    }
}
