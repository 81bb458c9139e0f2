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

use crate::errors::Error;

use super::{canonicalize::CanonicalIdMap, hmac::HmacKey};

/// Input blank node label -> replacement label (both without the `_:` prefix).
pub type LabelMap = BTreeMap<String, String>;

/// Builds the label map applied to a canonicalized dataset.
pub trait LabelMapFactory: Send + Sync {
    /// `canonical_id_map` maps every input blank node label to its RDFC-1.0 canonical label.
    fn create_label_map(&self, canonical_id_map: &CanonicalIdMap) -> Result<LabelMap, Error>;
}

/// Issuer/holder side: HMAC the canonical labels, then replace each one with
/// `b` + the rank of its HMAC output among all outputs.
///
/// The ranking hides the HMAC values themselves while keeping the map a
/// deterministic bijection for a given key and dataset.
#[derive(Clone, Debug)]
pub struct ShuffledHmacLabelMap {
    key: HmacKey,
}

impl ShuffledHmacLabelMap {
    pub fn new(key: HmacKey) -> Self {
        Self { key }
    }
}

impl LabelMapFactory for ShuffledHmacLabelMap {
    fn create_label_map(&self, canonical_id_map: &CanonicalIdMap) -> Result<LabelMap, Error> {
        let hmac_ids = canonical_id_map
            .iter()
            .map(|(input, canonical)| Ok((input.clone(), self.key.label_id(canonical)?)))
            .collect::<Result<BTreeMap<String, String>, Error>>()?;

        let mut sorted: Vec<&String> = hmac_ids.values().collect();
        sorted.sort();

        Ok(hmac_ids
            .iter()
            .map(|(input, id)| {
                let rank = sorted.partition_point(|other| *other < id);
                (input.clone(), format!("b{}", rank))
            })
            .collect())
    }
}

/// Verifier side: reuses the `c14n<N>` -> `b<M>` map transported in the derived proof.
#[derive(Clone, Debug)]
pub struct ExplicitLabelMap {
    label_map: LabelMap,
}

impl ExplicitLabelMap {
    pub fn new(label_map: LabelMap) -> Self {
        Self { label_map }
    }
}

impl LabelMapFactory for ExplicitLabelMap {
    fn create_label_map(&self, canonical_id_map: &CanonicalIdMap) -> Result<LabelMap, Error> {
        canonical_id_map
            .iter()
            .map(|(input, canonical)| {
                self.label_map
                    .get(canonical)
                    .map(|label| (input.clone(), label.clone()))
                    .ok_or_else(|| Error::LabelMapMismatch(canonical.clone()))
            })
            .collect()
    }
}
