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


//! Key material used by the cryptosuite: the issuer-side [`Signer`] capability,
//! Multikey encoding of BLS12-381 G2 public keys and verification method resolution.

mod multikey;
mod resolver;
mod signer;

pub use multikey::{decode_public_key_multibase, encode_public_key_multibase, Multikey, MULTIKEY_TYPE};
pub use resolver::{KeyResolver, StaticKeyResolver};
pub use signer::{Bls12381Sha256Signer, Signer};
