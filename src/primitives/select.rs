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

use serde_json::{Map, Value};

use crate::errors::Error;

use super::pointer::{array_index, child, parse_pointer};

/// Partially built selection. Arrays stay sparse until the selection is finished.
#[derive(Debug)]
enum Selection {
    Object(BTreeMap<String, Selection>),
    Array(BTreeMap<usize, Selection>),
    Value(Value),
}

impl Selection {
    /// Starting point for a node: its identifier (unless blank) and its types.
    fn initial(source: &Value) -> Self {
        match source {
            Value::Array(_) => Selection::Array(BTreeMap::new()),
            Value::Object(map) => Selection::Object(
                map.iter()
                    .filter(|(key, value)| match key.as_str() {
                        "id" | "@id" => !value.as_str().map_or(false, |id| id.starts_with("_:")),
                        "type" | "@type" => true,
                        _ => false,
                    })
                    .map(|(key, value)| (key.clone(), Selection::Value(value.clone())))
                    .collect(),
            ),
            _ => Selection::Object(BTreeMap::new()),
        }
    }

    /// Reopens a fully copied value so that a deeper pointer can walk through it.
    fn open(&mut self) {
        if let Selection::Value(value) = self {
            let opened = match value {
                Value::Object(map) => Selection::Object(
                    map.iter()
                        .map(|(key, value)| (key.clone(), Selection::Value(value.clone())))
                        .collect(),
                ),
                Value::Array(items) => Selection::Array(
                    items
                        .iter()
                        .enumerate()
                        .map(|(index, value)| (index, Selection::Value(value.clone())))
                        .collect(),
                ),
                _ => return,
            };
            *self = opened;
        }
    }

    fn child(&mut self, token: &str, source: &Value) -> Result<&mut Selection, Error> {
        self.open();
        match self {
            Selection::Object(map) => Ok(map
                .entry(token.to_owned())
                .or_insert_with(|| Selection::initial(source))),
            Selection::Array(items) => {
                let index = array_index(token)
                    .ok_or_else(|| Error::Pointer(format!("\"{}\" is not an array index", token)))?;
                Ok(items.entry(index).or_insert_with(|| Selection::initial(source)))
            }
            Selection::Value(_) => Err(Error::Pointer(format!("cannot select \"{}\" inside a literal", token))),
        }
    }

    /// Copies the selected value: objects are merged into what is already selected.
    fn select(&mut self, source: &Value) {
        match (self, source) {
            (Selection::Object(selected), Value::Object(map)) => {
                for (key, value) in map {
                    selected.insert(key.clone(), Selection::Value(value.clone()));
                }
            }
            (selection, value) => *selection = Selection::Value(value.clone()),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Selection::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, selection)| (key, selection.into_value()))
                    .collect::<Map<String, Value>>(),
            ),
            Selection::Array(items) => Value::Array(items.into_values().map(Selection::into_value).collect()),
            Selection::Value(value) => value,
        }
    }
}

/// Builds the smallest JSON-LD document containing the values addressed by `pointers`.
///
/// Every node on the way to a selected value keeps its (non blank) identifier and
/// types, so the selection expands to a subset of the document's statements.
/// Identifiers and types are recognized by the literal keys `id`, `@id`, `type`
/// and `@type`; other aliases a context may define for them are not followed.
/// The document `@context` is always copied. Returns `None` when `pointers` is empty.
pub fn select_json_ld(document: &Value, pointers: &[String]) -> Result<Option<Value>, Error> {
    if pointers.is_empty() {
        return Ok(None);
    }
    if !document.is_object() {
        return Err(Error::Pointer("selection requires a JSON object document".to_owned()));
    }

    let mut selection = Selection::initial(document);
    if let (Selection::Object(map), Some(context)) = (&mut selection, document.get("@context")) {
        map.insert("@context".to_owned(), Selection::Value(context.clone()));
    }

    for pointer in pointers {
        let tokens = parse_pointer(pointer)?;
        let mut source = document;
        let mut selected = &mut selection;
        for token in &tokens {
            source = child(source, token)
                .ok_or_else(|| Error::Pointer(format!("JSON pointer \"{}\" does not match document", pointer)))?;
            selected = selected.child(token, source)?;
        }
        selected.select(source);
    }

    Ok(Some(selection.into_value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pointers(pointers: &[&str]) -> Vec<String> {
        pointers.iter().map(|p| p.to_string()).collect()
    }

    fn credential() -> Value {
        json!({
            "@context": ["https://www.w3.org/ns/credentials/v2", {"@vocab": "https://windsurf.grotto-networking.com/selective#"}],
            "type": ["VerifiableCredential"],
            "issuer": "https://vc.example/windsurf/racecommittee",
            "credentialSubject": {
                "id": "_:subject",
                "sailNumber": "Earth101",
                "sails": [
                    {"size": 5.5, "sailName": "Kihei", "year": 2023},
                    {"size": 6.1, "sailName": "Lahaina", "year": 2023},
                    {"size": 7.0, "sailName": "Lahaina", "year": 2020}
                ],
                "boards": [
                    {"boardName": "CompFoil170", "brand": "Wailea", "year": 2022},
                    {"boardName": "Kanaha Custom", "brand": "Wailea", "year": 2019}
                ]
            }
        })
    }

    #[test]
    fn empty_pointers() {
        assert_eq!(select_json_ld(&credential(), &[]).unwrap(), None);
    }

    #[test]
    fn selection_shape() {
        let selected = select_json_ld(
            &credential(),
            &pointers(&["/issuer", "/credentialSubject/sailNumber", "/credentialSubject/sails/1", "/credentialSubject/boards/0/year"]),
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            selected,
            json!({
                "@context": ["https://www.w3.org/ns/credentials/v2", {"@vocab": "https://windsurf.grotto-networking.com/selective#"}],
                "type": ["VerifiableCredential"],
                "issuer": "https://vc.example/windsurf/racecommittee",
                "credentialSubject": {
                    "sailNumber": "Earth101",
                    "sails": [{"size": 6.1, "sailName": "Lahaina", "year": 2023}],
                    "boards": [{"year": 2022}]
                }
            })
        );
    }

    #[test]
    fn overlapping_pointers() {
        let selected = select_json_ld(
            &credential(),
            &pointers(&["/credentialSubject/sails/2/year", "/credentialSubject/sails", "/credentialSubject/sails/0/size"]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(selected["credentialSubject"]["sails"], credential()["credentialSubject"]["sails"]);
    }

    #[test]
    fn keeps_node_identifiers() {
        let document = json!({
            "id": "urn:uuid:1",
            "type": "Thing",
            "child": {"@id": "urn:bnid:sk3", "type": "Child", "name": "x", "other": "y"}
        });
        let selected = select_json_ld(&document, &pointers(&["/child/name"])).unwrap().unwrap();
        assert_eq!(
            selected,
            json!({
                "id": "urn:uuid:1",
                "type": "Thing",
                "child": {"@id": "urn:bnid:sk3", "type": "Child", "name": "x"}
            })
        );
    }

    #[test]
    fn unmatched_pointer() {
        let result = select_json_ld(&credential(), &pointers(&["/credentialSubject/missing"]));
        assert!(matches!(result, Err(Error::Pointer(_))));
        let result = select_json_ld(&credential(), &pointers(&["/credentialSubject/sails/7"]));
        assert!(matches!(result, Err(Error::Pointer(_))));
    }
}
