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


//! Selective disclosure building blocks shared by the three protocol roles:
//! blank node label randomization, JSON-LD to RDF, RDFC-1.0 canonicalization,
//! JSON pointer selection, statement grouping and hashing.

pub mod canonicalize;
pub mod context;
pub mod group;
pub mod hash;
pub mod hmac;
pub mod labels;
pub mod pointer;
pub mod rdf;
pub mod select;

pub use self::canonicalize::{canonical_id_map, canonicalize, label_replacement_canonicalize, CanonicalIdMap};
pub use self::context::{DocumentLoader, StaticLoader};
pub use self::group::{canonicalize_and_group, Group, Grouped};
pub use self::hash::{hash_canonized_proof, hash_mandatory};
pub use self::hmac::{HmacKey, HMAC_KEY_LENGTH};
pub use self::labels::{ExplicitLabelMap, LabelMap, LabelMapFactory, ShuffledHmacLabelMap};
pub use self::select::select_json_ld;
