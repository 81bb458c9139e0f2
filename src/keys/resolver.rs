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


use std::collections::HashMap;

use crate::errors::Error;

use super::multikey::Multikey;

/// Resolves the `verificationMethod` of a proof to raw public key bytes.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, verification_method: &str) -> Result<Vec<u8>, Error>;
}

/// In-memory resolver keyed by verification method id.
#[derive(Clone, Debug, Default)]
pub struct StaticKeyResolver {
    keys: HashMap<String, Vec<u8>>,
}

impl StaticKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, verification_method: impl Into<String>, public_key: impl Into<Vec<u8>>) -> Self {
        self.insert(verification_method, public_key);
        self
    }

    pub fn insert(&mut self, verification_method: impl Into<String>, public_key: impl Into<Vec<u8>>) {
        self.keys.insert(verification_method.into(), public_key.into());
    }

    pub fn insert_multikey(&mut self, multikey: &Multikey) -> Result<(), Error> {
        let public_key = multikey.public_key()?;
        self.keys.insert(multikey.id.clone(), public_key);
        Ok(())
    }
}

impl KeyResolver for StaticKeyResolver {
    fn resolve(&self, verification_method: &str) -> Result<Vec<u8>, Error> {
        self.keys
            .get(verification_method)
            .cloned()
            .ok_or_else(|| Error::KeyResolution(format!("unknown verification method \"{}\"", verification_method)))
    }
}
