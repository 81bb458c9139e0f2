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


//! Remote JSON-LD contexts.
//!
//! Context processing itself is done by the `json-ld` processor; this module
//! only decides where context documents come from. Every context a document
//! refers to is resolved up front through a [`DocumentLoader`] and handed to
//! the processor as an in-memory map, so expansion never touches the network.

use std::collections::{BTreeMap, HashMap};

use json_ld::{IriBuf, RemoteDocument};
use serde_json::Value;

use crate::errors::Error;

pub const CREDENTIALS_V2_URL: &str = "https://www.w3.org/ns/credentials/v2";
pub const DATA_INTEGRITY_V2_URL: &str = "https://w3id.org/security/data-integrity/v2";

const BUILTIN_CONTEXTS: [(&str, &str); 2] = [
    (CREDENTIALS_V2_URL, include_str!("../../contexts/credentials-v2.json")),
    (DATA_INTEGRITY_V2_URL, include_str!("../../contexts/data-integrity-v2.json")),
];

/// Bound on the number of distinct remote contexts pulled in by one document.
const MAX_REMOTE_CONTEXTS: usize = 64;

/// Resolves a context URL to its JSON document (an object with an `@context` entry).
pub trait DocumentLoader: Send + Sync {
    fn load(&self, url: &str) -> Result<Value, Error>;
}

/// Offline loader: explicitly registered documents, then the bundled
/// credentials v2 and data integrity v2 contexts.
#[derive(Clone, Debug, Default)]
pub struct StaticLoader {
    documents: HashMap<String, Value>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.insert(url, document);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, document: Value) {
        self.documents.insert(url.into(), document);
    }
}

impl DocumentLoader for StaticLoader {
    fn load(&self, url: &str) -> Result<Value, Error> {
        if let Some(document) = self.documents.get(url) {
            return Ok(document.clone());
        }
        let (_, source) = BUILTIN_CONTEXTS
            .iter()
            .find(|(builtin, _)| *builtin == url)
            .ok_or_else(|| Error::JsonLd(format!("unable to load context \"{}\"", url)))?;
        serde_json::from_str(source).map_err(|e| Error::JsonLd(format!("invalid bundled context \"{}\": {}", url, e)))
    }
}

/// Loads every remote context reachable from `document`, following references
/// made by the loaded contexts themselves.
pub(crate) fn remote_documents(
    document: &Value,
    loader: &dyn DocumentLoader,
) -> Result<BTreeMap<IriBuf, RemoteDocument>, Error> {
    let mut documents = BTreeMap::new();
    let mut pending = Vec::new();
    collect_context_urls(document, &mut pending);

    while let Some(url) = pending.pop() {
        let iri = IriBuf::new(url.clone()).map_err(|_| Error::JsonLd(format!("invalid context IRI \"{}\"", url)))?;
        if documents.contains_key(&iri) {
            continue;
        }
        if documents.len() == MAX_REMOTE_CONTEXTS {
            return Err(Error::JsonLd("too many remote contexts".to_owned()));
        }
        let context = loader.load(&url)?;
        collect_context_urls(&context, &mut pending);
        log::trace!("loaded context {}", url);
        documents.insert(
            iri.clone(),
            RemoteDocument::new(Some(iri), None, json_ld::syntax::Value::from(context)),
        );
    }
    Ok(documents)
}

fn collect_context_urls(value: &Value, urls: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("@context", Value::String(url)) | ("@import", Value::String(url)) => urls.push(url.clone()),
                    ("@context", Value::Array(contexts)) => urls.extend(
                        contexts
                            .iter()
                            .filter_map(|context| context.as_str().map(str::to_owned)),
                    ),
                    _ => {}
                }
                collect_context_urls(child, urls);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_context_urls(item, urls)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn urls(document: Value) -> Vec<String> {
        remote_documents(&document, &StaticLoader::new())
            .unwrap()
            .keys()
            .map(|iri| iri.as_str().to_owned())
            .collect()
    }

    #[test]
    fn bundled_contexts_are_loaded() {
        assert_eq!(
            urls(json!({"@context": [CREDENTIALS_V2_URL, DATA_INTEGRITY_V2_URL, {"@vocab": "https://example.org/#"}]})),
            vec![CREDENTIALS_V2_URL.to_owned(), DATA_INTEGRITY_V2_URL.to_owned()]
        );
        assert!(urls(json!({"@context": {"@vocab": "https://example.org/#"}})).is_empty());
    }

    #[test]
    fn bundled_credentials_context() {
        let context = StaticLoader::new().load(CREDENTIALS_V2_URL).unwrap();
        assert_eq!(context["@context"]["@protected"], true);
        assert_eq!(
            context["@context"]["BitstringStatusListEntry"]["@id"],
            "https://www.w3.org/ns/credentials/status#BitstringStatusListEntry"
        );
    }

    #[test]
    fn nested_references_are_followed() {
        let loader = StaticLoader::new()
            .with_document("https://example.org/outer/v1", json!({"@context": ["https://example.org/inner/v1"]}))
            .with_document(
                "https://example.org/inner/v1",
                json!({"@context": {"@vocab": "https://example.org/terms#"}}),
            );
        let documents = remote_documents(&json!({"@context": "https://example.org/outer/v1"}), &loader).unwrap();
        assert_eq!(documents.len(), 2);
    }

    #[test]
    fn unknown_remote_context() {
        let result = remote_documents(&json!({"@context": "https://example.org/unknown/v1"}), &StaticLoader::new());
        assert!(matches!(result, Err(Error::JsonLd(_))));
    }

    #[test]
    fn relative_context_reference() {
        let result = remote_documents(&json!({"@context": "contexts/v1"}), &StaticLoader::new());
        assert!(matches!(result, Err(Error::JsonLd(_))));
    }
}
