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

use thiserror::Error;

/// Kind of a `proofValue`, identified by the last byte of its tag prefix.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProofValueKind {
    Base,
    Derived,
}

impl core::fmt::Display for ProofValueKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProofValueKind::Base => write!(f, "base"),
            ProofValueKind::Derived => write!(f, "derived"),
        }
    }
}

/// Cause attached to [`Error::MalformedProofValue`].
#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum ProofValueError {
    #[error("\"proof.proofValue\" must be a string")]
    NotAString,
    #[error("Only base64url multibase encoding is supported")]
    UnsupportedEncoding,
    #[error("Invalid multibase string: {0}")]
    Multibase(String),
    #[error("\"proof.proofValue\" must be a {expected} proof")]
    UnexpectedKind {
        expected: ProofValueKind,
        found: Option<ProofValueKind>,
    },
    #[error("Invalid CBOR payload: {0}")]
    Cbor(String),
    #[error("Expected {expected} components, found {found}")]
    ComponentCount { expected: usize, found: usize },
    #[error("\"{field}\" {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Error, Clone, Debug)]
pub enum Error {
    #[error("Invalid cryptosuite options: {0}")]
    InvalidOptions(String),
    #[error("The signer's algorithm \"{algorithm}\" is not a supported algorithm for the cryptosuite. The supported algorithms are: \"{supported}\".")]
    UnsupportedAlgorithm { algorithm: String, supported: String },
    #[error("Unsupported proof type or cryptosuite: {0}")]
    UnsupportedCryptosuite(String),

    #[error("Nothing selected for disclosure")]
    NothingSelected,
    #[error("Multiple matching proofs; a \"proofId\" must be specified")]
    AmbiguousProof,
    #[error("No matching base proof found from which to derive a disclosure proof")]
    MissingProof,
    #[error("Proof purpose \"{found}\" does not match expected purpose \"{expected}\"")]
    PurposeMismatch { expected: String, found: String },

    #[error("The proof does not include a valid \"proofValue\" property")]
    MalformedProofValue(#[source] ProofValueError),

    #[error("Number of disclosed messages ({disclosed}) does not equal number of \"selectiveIndexes\" ({selective})")]
    DisclosureCountMismatch { disclosed: usize, selective: usize },
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Presentation header does not match the expected value")]
    PresentationHeaderMismatch,
    #[error("No randomized label for canonical blank node \"{0}\"")]
    LabelMapMismatch(String),

    #[error("JSON-LD processing failed: {0}")]
    JsonLd(String),
    #[error("Canonicalization failed: {0}")]
    Canonicalization(String),
    #[error("Invalid JSON pointer: {0}")]
    Pointer(String),
    #[error("BBS primitive failure: {0}")]
    Primitive(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Unable to resolve verification method: {0}")]
    KeyResolution(String),
    #[error("HMAC failure: {0}")]
    Hmac(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<ProofValueError> for Error {
    fn from(err: ProofValueError) -> Self {
        Error::MalformedProofValue(err)
    }
}
