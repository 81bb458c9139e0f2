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

use oxrdf::{BlankNode, Dataset, GraphName, Quad, Subject, Term};
use serde_json::Value;

use crate::errors::Error;

use super::{
    context::DocumentLoader,
    labels::{LabelMap, LabelMapFactory},
    rdf::to_rdf,
};

/// Input blank node label -> RDFC-1.0 canonical label (`c14n<N>`).
pub type CanonicalIdMap = BTreeMap<String, String>;

/// Runs RDFC-1.0 over the statements and returns the issued canonical labels.
pub fn canonical_id_map(quads: &[Quad]) -> Result<CanonicalIdMap, Error> {
    let mut dataset = Dataset::new();
    for quad in quads {
        dataset.insert(quad);
    }
    let issued = rdf_canon::issue(&dataset).map_err(|e| Error::Canonicalization(e.to_string()))?;
    Ok(issued.into_iter().collect())
}

/// Replaces every blank node label through `label_map`.
pub fn relabel(quads: &[Quad], label_map: &LabelMap) -> Result<Vec<Quad>, Error> {
    quads
        .iter()
        .map(|quad| {
            let subject = match &quad.subject {
                Subject::BlankNode(node) => Subject::BlankNode(replace(node, label_map)?),
                other => other.clone(),
            };
            let object = match &quad.object {
                Term::BlankNode(node) => Term::BlankNode(replace(node, label_map)?),
                other => other.clone(),
            };
            let graph_name = match &quad.graph_name {
                GraphName::BlankNode(node) => GraphName::BlankNode(replace(node, label_map)?),
                other => other.clone(),
            };
            Ok(Quad::new(subject, quad.predicate.clone(), object, graph_name))
        })
        .collect()
}

fn replace(node: &BlankNode, label_map: &LabelMap) -> Result<BlankNode, Error> {
    let label = label_map
        .get(node.as_str())
        .ok_or_else(|| Error::Canonicalization(format!("no replacement for blank node \"_:{}\"", node.as_str())))?;
    BlankNode::new(label.as_str()).map_err(|e| Error::Canonicalization(e.to_string()))
}

/// Serializes statements as sorted, de-duplicated N-Quads lines (each ending in `" .\n"`).
pub fn to_nquads(quads: &[Quad]) -> Vec<String> {
    let mut nquads: Vec<String> = quads.iter().map(|quad| format!("{} .\n", quad)).collect();
    nquads.sort();
    nquads.dedup();
    nquads
}

/// Canonical N-Quads with `c14n<N>` blank node labels.
pub fn canonicalize_quads(quads: &[Quad]) -> Result<Vec<String>, Error> {
    let canonical_id_map = canonical_id_map(quads)?;
    Ok(to_nquads(&relabel(quads, &canonical_id_map)?))
}

pub fn canonicalize(document: &Value, loader: &dyn DocumentLoader) -> Result<Vec<String>, Error> {
    canonicalize_quads(&to_rdf(document, loader)?)
}

/// Canonicalizes, then swaps the canonical labels for the ones produced by `factory`.
///
/// Returns the sorted N-Quads and the label map (input label -> replacement label).
pub fn label_replacement_canonicalize_quads(
    quads: &[Quad],
    factory: &dyn LabelMapFactory,
) -> Result<(Vec<String>, LabelMap), Error> {
    let canonical_id_map = canonical_id_map(quads)?;
    let label_map = factory.create_label_map(&canonical_id_map)?;
    let nquads = to_nquads(&relabel(quads, &label_map)?);
    log::trace!("label replacement canonicalization produced {} statements", nquads.len());
    Ok((nquads, label_map))
}

pub fn label_replacement_canonicalize(
    document: &Value,
    loader: &dyn DocumentLoader,
    factory: &dyn LabelMapFactory,
) -> Result<(Vec<String>, LabelMap), Error> {
    label_replacement_canonicalize_quads(&to_rdf(document, loader)?, factory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{context::StaticLoader, hmac::HmacKey, labels::ShuffledHmacLabelMap};
    use serde_json::json;

    fn document() -> Value {
        json!({
            "@context": {"@vocab": "https://example.org/#"},
            "name": "root",
            "child": [{"name": "a"}, {"name": "b"}]
        })
    }

    #[test]
    fn canonical_labels() {
        let nquads = canonicalize(&document(), &StaticLoader::new()).unwrap();
        assert_eq!(nquads.len(), 5);
        assert!(nquads.iter().all(|nquad| nquad.ends_with(" .\n")));
        assert!(nquads.windows(2).all(|pair| pair[0] < pair[1]));
        for label in ["_:c14n0", "_:c14n1", "_:c14n2"] {
            assert!(nquads.iter().any(|nquad| nquad.contains(label)));
        }
    }

    #[test]
    fn canonicalization_ignores_input_labels() {
        let relabeled = json!({
            "@context": {"@vocab": "https://example.org/#"},
            "@id": "_:zzz",
            "name": "root",
            "child": [{"@id": "_:y", "name": "b"}, {"@id": "_:x", "name": "a"}]
        });
        let loader = StaticLoader::new();
        assert_eq!(canonicalize(&document(), &loader).unwrap(), canonicalize(&relabeled, &loader).unwrap());
    }

    #[test]
    fn hmac_labels() {
        let factory = ShuffledHmacLabelMap::new(HmacKey::from_bytes(&[5u8; 32]).unwrap());
        let (nquads, label_map) =
            label_replacement_canonicalize(&document(), &StaticLoader::new(), &factory).unwrap();
        assert_eq!(label_map.len(), 3);
        assert!(nquads.iter().all(|nquad| !nquad.contains("c14n")));
        for label in label_map.values() {
            assert!(nquads.iter().any(|nquad| nquad.contains(&format!("_:{} ", label))));
        }
    }
}
