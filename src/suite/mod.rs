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


//! The `bbs-2023` cryptosuite: issuer, holder and verifier roles.
//!
//! Each role is its own type, configured once and reused across documents:
//!
//! * [`Issuer`] signs a document, committing to every statement and fixing the
//!   mandatory ones through the BBS header.
//! * [`Discloser`] turns a base proof into a derived proof revealing the mandatory
//!   statements plus a holder chosen selection.
//! * [`Verifier`] checks a derived proof against the revealed document.

pub mod disclose;
pub mod issue;
pub mod options;
pub mod verify;

pub use disclose::{DisclosureData, Discloser};
pub use issue::{BaseVerifyData, Issuer};
pub use options::{DisclosureOptions, IssuerOptions, VerifierOptions};
pub use verify::{DerivedVerifyData, VerificationResult, Verifier};

pub const CRYPTOSUITE_NAME: &str = "bbs-2023";
pub const PROOF_TYPE: &str = "DataIntegrityProof";
/// Algorithm identifiers a [`Signer`](crate::keys::Signer) may report.
pub const REQUIRED_ALGORITHMS: [&str; 2] = ["BBS-BLS12-381-SHA-256", "Bls12381G2"];
pub const ASSERTION_METHOD: &str = "assertionMethod";

/// BBS header: `proofHash || mandatoryHash`.
pub(crate) fn bbs_header(proof_hash: &[u8; 32], mandatory_hash: &[u8; 32]) -> Vec<u8> {
    [proof_hash.as_slice(), mandatory_hash.as_slice()].concat()
}
