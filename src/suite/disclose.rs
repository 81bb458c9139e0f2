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

use crate::{
    bbs,
    errors::Error,
    primitives::{
        canonical_id_map, canonicalize_and_group, hash_canonized_proof, hash_mandatory, select_json_ld,
        DocumentLoader, Group, HmacKey, LabelMap, ShuffledHmacLabelMap, StaticLoader,
    },
    proof::{attach_proofs, check_purpose, find_proof, proof_value, strip_proof},
    proof_value::{BaseProofValue, DerivedProofValue},
};

use super::{bbs_header, options::DisclosureOptions};

/// Output of the holder side before it is wrapped in a proof.
#[derive(Clone, Debug)]
pub struct DisclosureData {
    pub bbs_proof: Vec<u8>,
    /// Verifier label map: `c14n<N>` of the revealed document -> `b<M>`.
    pub label_map: LabelMap,
    /// Positions of the mandatory statements among the revealed ones.
    pub mandatory_indexes: Vec<usize>,
    /// Positions of the selected statements among the signed (non-mandatory) ones.
    pub selective_indexes: Vec<usize>,
    pub presentation_header: Vec<u8>,
    pub reveal_document: Value,
}

impl DisclosureData {
    pub fn proof_value(&self) -> DerivedProofValue {
        DerivedProofValue {
            bbs_proof: self.bbs_proof.clone(),
            label_map: self.label_map.clone(),
            mandatory_indexes: self.mandatory_indexes.clone(),
            selective_indexes: self.selective_indexes.clone(),
            presentation_header: self.presentation_header.clone(),
        }
    }
}

/// Holder role: derives selective disclosure proofs from base proofs.
pub struct Discloser {
    options: DisclosureOptions,
    loader: Box<dyn DocumentLoader>,
}

impl Discloser {
    pub fn new(options: DisclosureOptions) -> Self {
        Self {
            options,
            loader: Box::new(StaticLoader::new()),
        }
    }

    pub fn with_document_loader(mut self, loader: impl DocumentLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn options(&self) -> &DisclosureOptions {
        &self.options
    }

    /// Derives the reveal document of `document`, secured by a single derived proof.
    pub fn derive(&self, document: &Value) -> Result<Value, Error> {
        let (unsecured, proofs) = strip_proof(document)?;
        let base_proof = find_proof(&proofs, self.options.proof_id.as_deref())?;
        check_purpose(base_proof, &self.options.proof_purpose)?;

        let disclosure_data = self.create_disclosure_data(&unsecured, base_proof)?;

        let mut derived_proof = base_proof
            .as_object()
            .cloned()
            .ok_or_else(|| Error::InvalidOptions("proof must be a JSON object".to_owned()))?;
        derived_proof.remove("@context");
        derived_proof.insert(
            "proofValue".to_owned(),
            Value::String(disclosure_data.proof_value().encode()?),
        );

        log::info!(
            "derived proof revealing {} mandatory and {} selected statements",
            disclosure_data.mandatory_indexes.len(),
            disclosure_data.selective_indexes.len()
        );
        attach_proofs(disclosure_data.reveal_document, vec![Value::Object(derived_proof)])
    }

    /// # Description
    /// Rebuilds the issuer's statement partition from the base proof, then proves
    /// knowledge of the signature while revealing only the selected statements.
    ///
    /// # Inputs:
    /// * `document` (REQUIRED), the unsecured document.
    /// * `proof` (REQUIRED), the base proof.
    ///
    /// # Output:
    /// [`DisclosureData`] or an [`Error`].
    pub fn create_disclosure_data(&self, document: &Value, proof: &Value) -> Result<DisclosureData, Error> {
        let base = BaseProofValue::decode(proof_value(proof)?)?;
        let selective_pointers = &self.options.selective_pointers;
        if base.mandatory_pointers.is_empty() && selective_pointers.is_empty() {
            return Err(Error::NothingSelected);
        }

        let label_map_factory = ShuffledHmacLabelMap::new(HmacKey::from_bytes(&base.hmac_key)?);
        let loader = self.loader.as_ref();
        let combined_pointers: Vec<String> = base
            .mandatory_pointers
            .iter()
            .chain(selective_pointers)
            .cloned()
            .collect();

        let (proof_hash, grouped) = join!(
            hash_canonized_proof(document, proof, loader),
            canonicalize_and_group(
                document,
                loader,
                &label_map_factory,
                &[
                    base.mandatory_pointers.as_slice(),
                    selective_pointers.as_slice(),
                    combined_pointers.as_slice(),
                ],
            )
        );
        let proof_hash = proof_hash?;
        let grouped = grouped?;
        let [mandatory, selective, combined] = <[Group; 3]>::try_from(grouped.groups)
            .map_err(|groups| Error::Canonicalization(format!("expected 3 groups, found {}", groups.len())))?;

        let header = bbs_header(&proof_hash, &hash_mandatory(mandatory.matching.values()));

        let mandatory_indexes: Vec<usize> = combined
            .matching
            .keys()
            .enumerate()
            .filter(|(_, index)| mandatory.matching.contains_key(index))
            .map(|(relative, _)| relative)
            .collect();
        let selective_indexes: Vec<usize> = mandatory
            .non_matching
            .keys()
            .enumerate()
            .filter(|(_, index)| selective.matching.contains_key(index))
            .map(|(relative, _)| relative)
            .collect();
        log::debug!(
            "disclosing {} of {} statements ({} mandatory, {} selected of {} signed)",
            combined.matching.len(),
            grouped.nquads.len(),
            mandatory_indexes.len(),
            selective_indexes.len(),
            mandatory.non_matching.len()
        );

        let messages: Vec<Vec<u8>> = mandatory
            .non_matching
            .values()
            .map(|statement| statement.as_bytes().to_vec())
            .collect();
        let bbs_proof = bbs::derive_proof(
            &base.public_key,
            &base.signature,
            &header,
            &messages,
            &self.options.presentation_header,
            &selective_indexes,
        )?;

        let reveal_document = select_json_ld(document, &combined_pointers)?.ok_or(Error::NothingSelected)?;

        let label_map = canonical_id_map(&combined.deskolemized)?
            .into_iter()
            .map(|(input, canonical)| {
                grouped
                    .label_map
                    .get(&input)
                    .map(|label| (canonical, label.clone()))
                    .ok_or_else(|| Error::Canonicalization(format!("blank node \"{}\" has no randomized label", input)))
            })
            .collect::<Result<LabelMap, Error>>()?;

        Ok(DisclosureData {
            bbs_proof,
            label_map,
            mandatory_indexes,
            selective_indexes,
            presentation_header: self.options.presentation_header.clone(),
            reveal_document,
        })
    }
}
