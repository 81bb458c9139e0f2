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


use std::collections::BTreeSet;

use serde_json::Value;

use crate::{
    bbs::{self, SparseMessages},
    errors::Error,
    keys::KeyResolver,
    primitives::{
        hash_canonized_proof, hash_mandatory, label_replacement_canonicalize, DocumentLoader, ExplicitLabelMap,
        StaticLoader,
    },
    proof::{check_purpose, find_proof, proof_value, strip_proof},
    proof_value::DerivedProofValue,
};

use super::{bbs_header, options::VerifierOptions};

/// Outcome of [`Verifier::verify`]. `error` is set exactly when `verified` is false.
#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub verified: bool,
    pub error: Option<Error>,
    /// Presentation header of the derived proof, reported when the verifier does not expect one.
    pub presentation_header: Option<Vec<u8>>,
}

/// Inputs of the BBS proof verification recovered from a reveal document.
#[derive(Clone, Debug)]
pub struct DerivedVerifyData {
    pub bbs_proof: Vec<u8>,
    pub proof_hash: [u8; 32],
    pub mandatory_hash: [u8; 32],
    pub selective_indexes: Vec<usize>,
    pub presentation_header: Vec<u8>,
    /// Revealed statements not covered by the mandatory pointers, in canonical order.
    pub non_mandatory: Vec<String>,
}

impl DerivedVerifyData {
    pub fn header(&self) -> Vec<u8> {
        bbs_header(&self.proof_hash, &self.mandatory_hash)
    }

    /// Disclosed messages keyed by their index in the signed message list.
    pub fn messages(&self) -> SparseMessages {
        self.selective_indexes
            .iter()
            .zip(&self.non_mandatory)
            .map(|(&index, statement)| (index, statement.as_bytes().to_vec()))
            .collect()
    }
}

/// Verifier role.
pub struct Verifier<R: KeyResolver> {
    resolver: R,
    options: VerifierOptions,
    loader: Box<dyn DocumentLoader>,
}

impl<R: KeyResolver> Verifier<R> {
    pub fn new(resolver: R, options: VerifierOptions) -> Self {
        Self {
            resolver,
            options,
            loader: Box::new(StaticLoader::new()),
        }
    }

    pub fn with_document_loader(mut self, loader: impl DocumentLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn options(&self) -> &VerifierOptions {
        &self.options
    }

    /// Verifies the derived proof attached to `document`. Never fails: every
    /// problem is reported through [`VerificationResult::error`].
    pub fn verify(&self, document: &Value) -> VerificationResult {
        let mut presentation_header = None;
        match self.try_verify(document, &mut presentation_header) {
            Ok(()) => {
                log::info!("derived proof verified");
                VerificationResult {
                    verified: true,
                    error: None,
                    presentation_header,
                }
            }
            Err(error) => {
                log::info!("derived proof rejected: {}", error);
                VerificationResult {
                    verified: false,
                    error: Some(error),
                    presentation_header,
                }
            }
        }
    }

    fn try_verify(&self, document: &Value, presentation_header: &mut Option<Vec<u8>>) -> Result<(), Error> {
        let (unsecured, proofs) = strip_proof(document)?;
        let proof = find_proof(&proofs, None)?;
        check_purpose(proof, &self.options.proof_purpose)?;

        let verify_data = self.create_verify_data(&unsecured, proof)?;
        if self.options.expected_presentation_header.is_none() {
            *presentation_header = Some(verify_data.presentation_header.clone());
        }

        let verification_method = proof
            .get("verificationMethod")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::KeyResolution("proof has no \"verificationMethod\"".to_owned()))?;
        let public_key = self.resolver.resolve(verification_method)?;

        if bbs::verify_proof(
            &verify_data.bbs_proof,
            &verify_data.header(),
            &verify_data.presentation_header,
            &verify_data.messages(),
            &public_key,
        ) {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }

    /// # Description
    /// Decodes the derived proof and recomputes, from the reveal document alone,
    /// the header and disclosed messages the BBS proof must verify against.
    ///
    /// # Inputs:
    /// * `document` (REQUIRED), the reveal document without its proof.
    /// * `proof` (REQUIRED), the derived proof.
    ///
    /// # Output:
    /// [`DerivedVerifyData`] or an [`Error`]; a statement count that disagrees with
    /// `selectiveIndexes` is reported here, before any pairing is computed.
    pub fn create_verify_data(&self, document: &Value, proof: &Value) -> Result<DerivedVerifyData, Error> {
        let derived = DerivedProofValue::decode(proof_value(proof)?)?;
        if let Some(expected) = &self.options.expected_presentation_header {
            if *expected != derived.presentation_header {
                return Err(Error::PresentationHeaderMismatch);
            }
        }

        let loader = self.loader.as_ref();
        let label_map_factory = ExplicitLabelMap::new(derived.label_map);
        let (proof_hash, canonical) = join!(
            hash_canonized_proof(document, proof, loader),
            label_replacement_canonicalize(document, loader, &label_map_factory)
        );
        let proof_hash = proof_hash?;
        let (nquads, _) = canonical?;

        // Statements not claimed as mandatory must be exactly the selected ones.
        let mandatory_indexes: BTreeSet<usize> = derived.mandatory_indexes.iter().copied().collect();
        let disclosed = nquads.len().saturating_sub(mandatory_indexes.len());
        let out_of_range = mandatory_indexes.range(nquads.len()..).next().is_some();
        if disclosed != derived.selective_indexes.len() || out_of_range {
            return Err(Error::DisclosureCountMismatch {
                disclosed,
                selective: derived.selective_indexes.len(),
            });
        }

        let (mandatory, non_mandatory): (Vec<(usize, String)>, Vec<(usize, String)>) = nquads
            .into_iter()
            .enumerate()
            .partition(|(index, _)| mandatory_indexes.contains(index));
        log::debug!(
            "reveal document has {} mandatory and {} selected statements",
            mandatory.len(),
            non_mandatory.len()
        );

        Ok(DerivedVerifyData {
            bbs_proof: derived.bbs_proof,
            proof_hash,
            mandatory_hash: hash_mandatory(mandatory.iter().map(|(_, statement)| statement)),
            selective_indexes: derived.selective_indexes,
            presentation_header: derived.presentation_header,
            non_mandatory: non_mandatory.into_iter().map(|(_, statement)| statement).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        keys::{Bls12381Sha256Signer, Signer, StaticKeyResolver},
        suite::{
            disclose::Discloser,
            issue::Issuer,
            options::{DisclosureOptions, IssuerOptions},
        },
    };
    use serde_json::json;

    const VERIFICATION_METHOD: &str = "did:example:issuer#key-1";

    fn derived(presentation_header: &[u8]) -> (Value, StaticKeyResolver) {
        let signer = Bls12381Sha256Signer::from_key_material(&[9u8; 32], VERIFICATION_METHOD).unwrap();
        let resolver = StaticKeyResolver::new().with_key(VERIFICATION_METHOD, signer.public_key());
        let issuer = Issuer::new(
            signer,
            IssuerOptions {
                mandatory_pointers: vec!["/issuer".to_owned()],
                ..IssuerOptions::default()
            },
        )
        .unwrap();
        let signed = issuer
            .sign(&json!({
                "@context": {"@vocab": "https://example.org/vocab#"},
                "issuer": "did:example:issuer",
                "subject": {"name": "Alice", "age": 42}
            }))
            .unwrap();
        let discloser = Discloser::new(DisclosureOptions {
            selective_pointers: vec!["/subject/name".to_owned()],
            presentation_header: presentation_header.to_vec(),
            ..DisclosureOptions::default()
        });
        (discloser.derive(&signed).unwrap(), resolver)
    }

    #[test]
    fn verifies_and_reports_presentation_header() {
        let (document, resolver) = derived(b"nonce");
        let result = Verifier::new(resolver, VerifierOptions::default()).verify(&document);
        assert!(result.verified, "{:?}", result.error);
        assert!(result.error.is_none());
        assert_eq!(result.presentation_header, Some(b"nonce".to_vec()));
    }

    #[test]
    fn expected_presentation_header() {
        let (document, resolver) = derived(b"nonce");
        let verifier = Verifier::new(
            resolver.clone(),
            VerifierOptions {
                expected_presentation_header: Some(b"nonce".to_vec()),
                ..VerifierOptions::default()
            },
        );
        let result = verifier.verify(&document);
        assert!(result.verified);
        assert_eq!(result.presentation_header, None);

        let verifier = Verifier::new(
            resolver,
            VerifierOptions {
                expected_presentation_header: Some(b"other".to_vec()),
                ..VerifierOptions::default()
            },
        );
        let result = verifier.verify(&document);
        assert!(!result.verified);
        assert!(matches!(result.error, Some(Error::PresentationHeaderMismatch)));
    }

    #[test]
    fn removed_mandatory_statement() {
        let (mut document, resolver) = derived(&[]);
        document.as_object_mut().unwrap().remove("issuer");
        let result = Verifier::new(resolver, VerifierOptions::default()).verify(&document);
        assert!(!result.verified);
        assert!(matches!(
            result.error,
            Some(Error::DisclosureCountMismatch { disclosed, selective }) if disclosed + 1 == selective
        ));
    }

    #[test]
    fn unknown_verification_method() {
        let (document, _) = derived(&[]);
        let result = Verifier::new(StaticKeyResolver::new(), VerifierOptions::default()).verify(&document);
        assert!(matches!(result.error, Some(Error::KeyResolution(_))));
    }

    #[test]
    fn base_proof_is_not_a_derived_proof() {
        let signer = Bls12381Sha256Signer::from_key_material(&[9u8; 32], VERIFICATION_METHOD).unwrap();
        let resolver = StaticKeyResolver::new().with_key(VERIFICATION_METHOD, signer.public_key());
        let signed = Issuer::new(signer, IssuerOptions::default())
            .unwrap()
            .sign(&json!({"@context": {"@vocab": "https://example.org/vocab#"}, "name": "Alice"}))
            .unwrap();

        let result = Verifier::new(resolver, VerifierOptions::default()).verify(&signed);
        assert!(matches!(result.error, Some(Error::MalformedProofValue(_))));
    }
}
