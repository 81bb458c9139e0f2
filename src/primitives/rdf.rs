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


//! JSON-LD (compacted form) to RDF statements.

use std::future::Future;

use json_ld::{
    expansion::{Action, Policy},
    IriBuf, JsonLdProcessor, RemoteDocument,
};
use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
use rdf_types::{generator, Id, LexicalQuad, LiteralType};
use serde_json::Value;

use crate::errors::Error;

use super::context::{remote_documents, DocumentLoader};

/// Skolem IRIs minted by [`crate::primitives::group`] are turned back into
/// blank nodes carrying the suffix as label.
pub const SKOLEM_PREFIX: &str = "urn:bnid:";

#[derive(Clone, Debug)]
enum Node {
    Named(NamedNode),
    Blank(BlankNode),
}

impl Node {
    fn subject(self) -> Subject {
        match self {
            Node::Named(node) => node.into(),
            Node::Blank(node) => node.into(),
        }
    }

    fn term(self) -> Term {
        match self {
            Node::Named(node) => node.into(),
            Node::Blank(node) => node.into(),
        }
    }

    fn graph_name(self) -> GraphName {
        match self {
            Node::Named(node) => node.into(),
            Node::Blank(node) => node.into(),
        }
    }
}

/// Converts a JSON-LD document into its RDF statements.
///
/// The top level `proof` entry is never part of the statements. Expansion runs
/// with a strict policy: terms that neither the active context nor `@vocab`
/// define are rejected instead of being dropped.
pub fn to_rdf(document: &Value, loader: &dyn DocumentLoader) -> Result<Vec<Quad>, Error> {
    let mut document = document.clone();
    match &mut document {
        Value::Object(node) => {
            node.remove("proof");
        }
        Value::Array(_) => {}
        _ => return Err(Error::JsonLd("document must be a JSON object".to_owned())),
    }

    let mut documents = remote_documents(&document, loader)?;
    let input: RemoteDocument<IriBuf, json_syntax::Value> =
        RemoteDocument::new(Option::<IriBuf>::None, None, json_ld::syntax::Value::from(document));
    let options = json_ld::Options {
        expansion_policy: Policy {
            invalid: Action::Reject,
            vocab: Action::Keep,
            allow_undefined: false,
        },
        ..Default::default()
    };

    let expanded = block_on(input.expand_full(&mut (), &mut documents, options, ()))?
        .map_err(|e| Error::JsonLd(format!("expansion failed: {:?}", e)))?;
    let quads = linked_data::to_lexical_quads(generator::Blank::new(), &expanded)
        .map_err(|e| Error::JsonLd(format!("unable to convert to RDF: {}", e)))?;

    quads.into_iter().map(deskolemize).collect()
}

/// Expansion only waits on the in-memory context map, a single threaded
/// runtime is enough to drive it.
fn block_on<F: Future>(future: F) -> Result<F::Output, Error> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| Error::JsonLd(format!("unable to start the JSON-LD runtime: {}", e)))?;
    Ok(runtime.block_on(future))
}

fn deskolemize(quad: LexicalQuad) -> Result<Quad, Error> {
    let subject = node(&quad.0)?.subject();
    let predicate = named(quad.1.as_str())?;
    let object = match &quad.2 {
        rdf_types::Term::Id(id) => node(id)?.term(),
        rdf_types::Term::Literal(literal) => literal_term(literal)?.into(),
    };
    let graph_name = match &quad.3 {
        Some(graph) => node(graph)?.graph_name(),
        None => GraphName::DefaultGraph,
    };
    Ok(Quad::new(subject, predicate, object, graph_name))
}

/// Skolem IRIs and blank identifiers become blank nodes, anything else stays an IRI.
fn node(id: &Id) -> Result<Node, Error> {
    match id {
        Id::Iri(iri) => match iri.as_str().strip_prefix(SKOLEM_PREFIX) {
            Some(label) => blank(label),
            None => named(iri.as_str()).map(Node::Named),
        },
        Id::Blank(label) => blank(label.suffix()),
    }
}

fn literal_term(literal: &rdf_types::Literal) -> Result<Literal, Error> {
    match &literal.type_ {
        LiteralType::Any(datatype) => Ok(Literal::new_typed_literal(
            literal.value.as_str(),
            named(datatype.as_str())?,
        )),
        LiteralType::LangString(language) => {
            Literal::new_language_tagged_literal(literal.value.as_str(), language.as_str())
                .map_err(|e| Error::JsonLd(format!("invalid language tag \"{}\": {}", language.as_str(), e)))
        }
    }
}

fn blank(label: &str) -> Result<Node, Error> {
    BlankNode::new(label)
        .map(Node::Blank)
        .map_err(|e| Error::JsonLd(format!("invalid blank node label \"{}\": {}", label, e)))
}

fn named(iri: &str) -> Result<NamedNode, Error> {
    NamedNode::new(iri).map_err(|e| Error::JsonLd(format!("invalid IRI \"{}\": {}", iri, e)))
}
