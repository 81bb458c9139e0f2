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


use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    bbs::PUBLIC_KEY_LENGTH,
    errors::Error,
    keys::Signer,
    primitives::{
        canonicalize_and_group, hash_canonized_proof, hash_mandatory, DocumentLoader, HmacKey,
        ShuffledHmacLabelMap, StaticLoader,
    },
    proof::{attach_proofs, strip_proof, DataIntegrityProof},
    proof_value::BaseProofValue,
};

use super::{bbs_header, options::IssuerOptions, REQUIRED_ALGORITHMS};

/// Everything the base signature commits to.
#[derive(Clone, Debug)]
pub struct BaseVerifyData {
    pub proof_hash: [u8; 32],
    pub mandatory_hash: [u8; 32],
    pub mandatory_pointers: Vec<String>,
    /// Canonical index -> statement, for statements matched by the mandatory pointers.
    pub mandatory: BTreeMap<usize, String>,
    pub non_mandatory: BTreeMap<usize, String>,
    pub hmac_key: HmacKey,
}

pub struct Issuer<S: Signer> {
    signer: S,
    options: IssuerOptions,
    loader: Box<dyn DocumentLoader>,
}

impl<S: Signer> Issuer<S> {
    /// Fails with [`Error::UnsupportedAlgorithm`] unless the signer reports one of
    /// [`REQUIRED_ALGORITHMS`].
    pub fn new(signer: S, options: IssuerOptions) -> Result<Self, Error> {
        if !REQUIRED_ALGORITHMS.contains(&signer.algorithm()) {
            return Err(Error::UnsupportedAlgorithm {
                algorithm: signer.algorithm().to_owned(),
                supported: REQUIRED_ALGORITHMS.join(", "),
            });
        }
        Ok(Self {
            signer,
            options,
            loader: Box::new(StaticLoader::new()),
        })
    }

    pub fn with_document_loader(mut self, loader: impl DocumentLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn options(&self) -> &IssuerOptions {
        &self.options
    }

    /// Proof options (the proof without `proofValue`) for the next signature.
    pub fn proof_options(&self) -> DataIntegrityProof {
        let mut proof = DataIntegrityProof::new(self.signer.verification_method(), self.options.proof_purpose.as_str());
        proof.id = self.options.proof_id.clone();
        proof
    }

    /// Signs `document`, returning it with the new proof attached.
    ///
    /// Proofs already on the document are kept, the new proof is appended to the set.
    pub fn sign(&self, document: &Value) -> Result<Value, Error> {
        let (unsecured, mut proofs) = strip_proof(document)?;
        let mut proof = self.proof_options();

        let verify_data = self.create_verify_data(&unsecured, &proof.to_value()?)?;
        proof.proof_value = Some(self.create_proof_value(&verify_data)?);

        log::info!(
            "issued {} proof with {} mandatory and {} non-mandatory statements",
            proof.cryptosuite,
            verify_data.mandatory.len(),
            verify_data.non_mandatory.len()
        );
        proofs.push(proof.to_value()?);
        attach_proofs(unsecured, proofs)
    }

    /// # Description
    /// Canonicalizes `document` with a fresh HMAC label randomizer, splits the
    /// statements by the mandatory pointers and hashes the proof options.
    ///
    /// # Inputs:
    /// * `document` (REQUIRED), the unsecured document.
    /// * `proof_options` (REQUIRED), the proof without `proofValue`; `created` is ignored.
    ///
    /// # Output:
    /// [`BaseVerifyData`] or an [`Error`].
    pub fn create_verify_data(&self, document: &Value, proof_options: &Value) -> Result<BaseVerifyData, Error> {
        let mut proof_options = proof_options
            .as_object()
            .cloned()
            .ok_or_else(|| Error::InvalidOptions("proof options must be a JSON object".to_owned()))?;
        proof_options.remove("created");
        let proof_options = Value::Object(proof_options);

        let hmac_key = HmacKey::generate();
        let label_map_factory = ShuffledHmacLabelMap::new(hmac_key.clone());
        let loader = self.loader.as_ref();
        let mandatory_pointers = self.options.mandatory_pointers.as_slice();

        let (proof_hash, grouped) = join!(
            hash_canonized_proof(document, &proof_options, loader),
            canonicalize_and_group(document, loader, &label_map_factory, &[mandatory_pointers])
        );
        let proof_hash = proof_hash?;
        let group = grouped?
            .groups
            .into_iter()
            .next()
            .ok_or_else(|| Error::Canonicalization("missing mandatory group".to_owned()))?;

        let mandatory_hash = hash_mandatory(group.matching.values());
        log::debug!(
            "base verify data: {} mandatory, {} non-mandatory statements",
            group.matching.len(),
            group.non_matching.len()
        );

        Ok(BaseVerifyData {
            proof_hash,
            mandatory_hash,
            mandatory_pointers: self.options.mandatory_pointers.clone(),
            mandatory: group.matching,
            non_mandatory: group.non_matching,
            hmac_key,
        })
    }

    /// Signs the non-mandatory statements under `proofHash || mandatoryHash` and
    /// serializes the base proof value.
    pub fn create_proof_value(&self, verify_data: &BaseVerifyData) -> Result<String, Error> {
        let header = bbs_header(&verify_data.proof_hash, &verify_data.mandatory_hash);
        let messages: Vec<Vec<u8>> = verify_data
            .non_mandatory
            .values()
            .map(|statement| statement.as_bytes().to_vec())
            .collect();

        let signature = self.signer.multisign(&header, &messages)?;
        let public_key: [u8; PUBLIC_KEY_LENGTH] = self.signer.public_key().try_into().map_err(|_| {
            Error::InvalidKey(format!(
                "public key must be {} bytes, found {}",
                PUBLIC_KEY_LENGTH,
                self.signer.public_key().len()
            ))
        })?;

        BaseProofValue {
            signature,
            public_key,
            hmac_key: verify_data.hmac_key.to_bytes(),
            mandatory_pointers: verify_data.mandatory_pointers.clone(),
        }
        .encode()
    }
}
