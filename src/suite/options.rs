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


use serde::{Deserialize, Serialize};

use super::ASSERTION_METHOD;

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssuerOptions {
    /// JSON pointers to the statements every disclosure must reveal.
    pub mandatory_pointers: Vec<String>,
    pub proof_purpose: String,
    /// Optional `id` given to the created proof.
    pub proof_id: Option<String>,
}

impl Default for IssuerOptions {
    fn default() -> Self {
        Self {
            mandatory_pointers: Vec::new(),
            proof_purpose: ASSERTION_METHOD.to_owned(),
            proof_id: None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisclosureOptions {
    /// Selects the base proof when the document carries more than one.
    pub proof_id: Option<String>,
    pub selective_pointers: Vec<String>,
    #[serde(with = "hex_bytes")]
    pub presentation_header: Vec<u8>,
    pub proof_purpose: String,
}

impl Default for DisclosureOptions {
    fn default() -> Self {
        Self {
            proof_id: None,
            selective_pointers: Vec::new(),
            presentation_header: Vec::new(),
            proof_purpose: ASSERTION_METHOD.to_owned(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifierOptions {
    /// When set, derived proofs bound to any other presentation header are rejected.
    #[serde(with = "hex_bytes_opt", skip_serializing_if = "Option::is_none")]
    pub expected_presentation_header: Option<Vec<u8>>,
    pub proof_purpose: String,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            expected_presentation_header: None,
            proof_purpose: ASSERTION_METHOD.to_owned(),
        }
    }
}

mod hex_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        hex::decode(encoded).map_err(D::Error::custom)
    }
}

mod hex_bytes_opt {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|encoded| hex::decode(encoded).map_err(D::Error::custom))
            .transpose()
    }
}
