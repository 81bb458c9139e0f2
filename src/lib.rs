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


//! `bbs-2023`: selective disclosure Data Integrity proofs over JSON-LD documents,
//! backed by BBS signatures on BLS12-381.
//!
//! An [`Issuer`] signs every canonical statement of a document, a holder's
//! [`Discloser`] reveals a subset of them together with a zero-knowledge proof,
//! and a [`Verifier`] checks that proof against the revealed document only.

#[macro_use]
mod macros;

pub mod bbs;
pub mod errors;
pub mod keys;
pub mod primitives;
pub mod proof;
pub mod proof_value;
pub mod suite;

pub use errors::Error;
pub use suite::{
    DisclosureOptions, Discloser, Issuer, IssuerOptions, VerificationResult, Verifier, VerifierOptions,
    CRYPTOSUITE_NAME,
};
