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


use std::collections::{BTreeMap, HashSet};

use oxrdf::Quad;
use serde_json::Value;

use crate::errors::Error;

use super::{
    canonicalize::{label_replacement_canonicalize_quads, relabel},
    context::DocumentLoader,
    labels::{LabelMap, LabelMapFactory},
    rdf::{to_rdf, SKOLEM_PREFIX},
    select::select_json_ld,
};

/// Statements of the canonical document split by one set of pointers.
///
/// Keys are absolute positions in the canonical (sorted) N-Quads.
#[derive(Clone, Debug, Default)]
pub struct Group {
    pub matching: BTreeMap<usize, String>,
    pub non_matching: BTreeMap<usize, String>,
    /// Statements of the selection before label replacement, blank nodes keep their skolem labels.
    pub deskolemized: Vec<Quad>,
}

#[derive(Clone, Debug)]
pub struct Grouped {
    /// One entry per requested pointer set, in request order.
    pub groups: Vec<Group>,
    pub label_map: LabelMap,
    pub nquads: Vec<String>,
}

/// Gives every node object an identifier so that selections of the document keep
/// referring to the same nodes: blank `_:x` ids become `urn:bnid:x`, nodes without
/// an id get a fresh `urn:bnid:` IRI.
///
/// Fresh labels live under a random per-call namespace, so they cannot collide
/// with labels already present in the document.
pub fn skolemize(document: &Value) -> Value {
    let namespace = format!("_sk{}_", hex::encode(rand::random::<[u8; 8]>()));
    let mut skolemized = document.clone();
    let mut counter = 0;
    skolemize_node(&mut skolemized, &namespace, &mut counter);
    skolemized
}

fn skolemize_node(value: &mut Value, namespace: &str, counter: &mut usize) {
    match value {
        Value::Array(items) => {
            for item in items {
                skolemize_node(item, namespace, counter);
            }
        }
        Value::Object(map) => {
            if map.contains_key("@value") {
                return;
            }
            if let Some(container) = ["@list", "@set"].into_iter().find(|key| map.contains_key(*key)) {
                if let Some(items) = map.get_mut(container) {
                    skolemize_node(items, namespace, counter);
                }
                return;
            }
            let id_key = ["id", "@id"].into_iter().find(|key| map.contains_key(*key));
            match id_key {
                Some(key) => {
                    if let Some(Value::String(id)) = map.get_mut(key) {
                        if let Some(label) = id.strip_prefix("_:") {
                            let skolem = format!("{}{}", SKOLEM_PREFIX, label);
                            *id = skolem;
                        }
                    }
                }
                None => {
                    map.insert(
                        "@id".to_owned(),
                        Value::String(format!("{}{}{}", SKOLEM_PREFIX, namespace, counter)),
                    );
                    *counter += 1;
                }
            }
            for (key, child) in map.iter_mut() {
                if key != "@context" {
                    skolemize_node(child, namespace, counter);
                }
            }
        }
        _ => {}
    }
}

/// Canonicalizes `document` with the labels from `factory` and splits the resulting
/// statements once per pointer set.
///
/// A statement matches a pointer set when it is among the statements of the
/// selection made by those pointers; an empty pointer set matches nothing.
pub fn canonicalize_and_group(
    document: &Value,
    loader: &dyn DocumentLoader,
    factory: &dyn LabelMapFactory,
    pointer_sets: &[&[String]],
) -> Result<Grouped, Error> {
    let skolemized = skolemize(document);
    let deskolemized = to_rdf(&skolemized, loader)?;
    let (nquads, label_map) = label_replacement_canonicalize_quads(&deskolemized, factory)?;

    let groups = pointer_sets
        .iter()
        .map(|pointers| {
            let selected = match select_json_ld(&skolemized, pointers)? {
                Some(selection) => to_rdf(&selection, loader)?,
                None => Vec::new(),
            };
            let selected_nquads: HashSet<String> = relabel(&selected, &label_map)?
                .iter()
                .map(|quad| format!("{} .\n", quad))
                .collect();

            let mut group = Group {
                deskolemized: selected,
                ..Group::default()
            };
            for (index, nquad) in nquads.iter().enumerate() {
                if selected_nquads.contains(nquad) {
                    group.matching.insert(index, nquad.clone());
                } else {
                    group.non_matching.insert(index, nquad.clone());
                }
            }
            Ok(group)
        })
        .collect::<Result<Vec<Group>, Error>>()?;

    log::debug!(
        "grouped {} canonical statements into {} groups",
        nquads.len(),
        groups.len()
    );
    Ok(Grouped {
        groups,
        label_map,
        nquads,
    })
}
