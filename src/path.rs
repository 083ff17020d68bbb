//! Path expressions selecting nodes from a [`Document`](crate::tree::Document).
//!
//! The language is the location-path core of XPath 1.0: steps separated by
//! `/` and `//`, the usual axes and their abbreviations, node tests, unions
//! and predicates. Predicates support positions, `last()`, `position()`,
//! comparisons, `contains`, `starts-with`, `not`, `and` and `or`.
//!
//! ```
//! use pluck::{path::Query, tree::Document};
//!
//! let document = Document::parse_html("<ul><li>0</li><li>1</li></ul>");
//! let query = Query::compile("/ul/li[last()]")?;
//! let last = query.iter(document.root()).next().unwrap();
//!
//! assert_eq!(last.text(), "1");
//! # Ok::<_, pluck::path::Error>(())
//! ```

use alloc::{string::String, vec, vec::Vec};
use core::{fmt, str::FromStr};

use thiserror::Error;

use crate::tree::{Document, Node, NodeId};

mod cache;
mod eval;
mod lexer;
mod parser;

pub use cache::QueryCache;

/// Errors occurring while compiling a path expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Expression contains no steps.
    #[error("Path expression is empty.")]
    Empty,
    /// Found a token where it cannot appear.
    #[error("Unexpected `{found}` at offset {offset}.")]
    Unexpected { found: String, offset: usize },
    /// Expression ended part way through a step or predicate.
    #[error("Unexpected end of path expression.")]
    UnexpectedEnd,
    /// String literal has no closing quote.
    #[error("Unterminated string literal at offset {offset}.")]
    UnterminatedLiteral { offset: usize },
    /// Named axis does not exist.
    #[error("Unknown axis `{name}` at offset {offset}.")]
    UnknownAxis { name: String, offset: usize },
    /// Named function is not supported.
    #[error("Unknown function `{name}` at offset {offset}.")]
    UnknownFunction { name: String, offset: usize },
}

/// A compiled path expression, reusable across nodes and documents.
#[derive(Debug, Clone)]
pub struct Query {
    text: String,
    branches: Vec<parser::LocationPath>,
}

impl Query {
    pub fn compile(text: &str) -> Result<Self, Error> {
        Ok(Self {
            text: text.into(),
            branches: parser::parse(text)?,
        })
    }

    /// The expression this query was compiled from.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Evaluate the query with `node` as the context node.
    ///
    /// Matches are yielded once each, in document order.
    pub fn iter<'d>(&self, node: Node<'d>) -> Matches<'d> {
        let document = node.document();

        Matches {
            document,
            ids: eval::select(document, node.id(), &self.branches).into_iter(),
        }
    }
}

impl FromStr for Query {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Nodes matched by a [`Query`].
#[derive(Debug)]
pub struct Matches<'d> {
    document: &'d Document,
    ids: vec::IntoIter<NodeId>,
}

impl<'d> Iterator for Matches<'d> {
    type Item = Node<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|id| Node::new(self.document, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl ExactSizeIterator for Matches<'_> {}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec::Vec};

    use super::*;

    #[test]
    fn matches_are_one_shot() {
        let document = Document::parse_html("<ul><li>0</li><li>1</li><li>2</li></ul>");
        let query = Query::compile("/ul/li").unwrap();
        let mut matches = query.iter(document.root());

        assert_eq!(matches.len(), 3);
        assert_eq!(matches.by_ref().count(), 3);
        assert_eq!(matches.next(), None);

        let texts: Vec<_> = query.iter(document.root()).map(|n| n.text()).collect();
        assert_eq!(texts, ["0", "1", "2"]);
    }

    #[test]
    fn lone_slash_selects_the_document() {
        let document = Document::parse_html("<p>x</p>");
        let query: Query = "/".parse().unwrap();

        assert_eq!(query.iter(document.root()).next(), Some(document.root()));
    }

    #[test]
    fn no_match_is_empty() {
        let document = Document::parse_html("<p>x</p>");
        let query = Query::compile("//span").unwrap();

        assert_eq!(query.iter(document.root()).count(), 0);
    }

    #[test]
    fn display_is_the_source_text() {
        let query = Query::compile("//a/@href").unwrap();

        assert_eq!(query.to_string(), "//a/@href");
        assert_eq!(query.as_str(), "//a/@href");
    }

    #[test]
    fn compile_errors_describe_the_problem() {
        let error = Query::compile("//li[").unwrap_err();

        assert_eq!(error.to_string(), "Unexpected end of path expression.");
    }
}
