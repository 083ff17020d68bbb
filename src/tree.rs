//! Immutable document trees and the node handles decoders read from.
//!
//! A [`Document`] owns its source text and an arena of nodes built by a
//! lenient, single-pass parser. Nodes are addressed by [`NodeId`]s assigned in
//! document order, with an element's attributes numbered directly after the
//! element itself. A [`Node`] is a cheap, copyable handle borrowing its
//! document, exposing the two renderings decoding relies on:
//!
//! - [`Node::raw`]: the node's source bytes. For elements this is the markup
//! between the start and end tag; for attributes, the undecoded value.
//!
//! - [`Node::text`]: the node's text rendering. For elements this is the
//! concatenated, entity-decoded text of every descendant text node.

use alloc::{borrow::Cow, boxed::Box, string::String, vec::Vec};
use core::{fmt, ops::Range};

use thiserror::Error;

mod entities;
mod parse;

/// Index of a node within its [`Document`].
pub type NodeId = u32;

/// Markup dialect accepted by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// Forgiving HTML: lower-cased names, void and raw-text elements, and
    /// implicit closing of unbalanced tags.
    #[default]
    Html,
    /// Well-formed XML: names kept verbatim, unbalanced tags rejected.
    Xml,
}

/// Errors occurring while parsing a document.
#[derive(Debug, Error)]
pub enum Error {
    /// The document is not valid UTF-8.
    #[error("Document is not valid UTF-8: {0}.")]
    Utf8(#[from] core::str::Utf8Error),
    /// A closing tag does not match the innermost open element.
    #[error("Found closing tag `{found}` at offset {offset}, expected `{expected}`.")]
    Mismatched {
        expected: String,
        found: String,
        offset: usize,
    },
    /// A closing tag appeared with no element open.
    #[error("Found closing tag `{found}` at offset {offset} with no open element.")]
    Unopened { found: String, offset: usize },
    /// An element was still open at the end of the document.
    #[error("Element `{name}` is never closed.")]
    Unclosed { name: String },
    /// Markup could not be tokenized.
    #[error("Malformed markup at offset {offset}.")]
    Malformed { offset: usize },
    /// An error from the supplied reader.
    #[cfg(feature = "std")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
}

#[derive(Debug)]
pub(crate) struct NodeData {
    kind: NodeKind,
    /// Element or attribute name, empty otherwise.
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<NodeId>,
    /// One past the last id of this node's subtree.
    end: NodeId,
    /// Span of the node's content in the source.
    raw: Range<usize>,
    /// Decoded text of text and attribute nodes.
    text: String,
}

/// A parsed, read-only document.
pub struct Document {
    source: Box<str>,
    nodes: Vec<NodeData>,
}

impl Document {
    /// Parse an HTML document. HTML parsing never fails.
    pub fn parse_html(source: &str) -> Self {
        Self {
            source: source.into(),
            nodes: parse::Builder::html(source),
        }
    }

    /// Parse a well-formed XML document.
    pub fn parse_xml(source: &str) -> Result<Self, Error> {
        Self::parse_str(source, Syntax::Xml)
    }

    /// Parse a document of the given syntax.
    pub fn parse_str(source: &str, syntax: Syntax) -> Result<Self, Error> {
        let nodes = match syntax {
            Syntax::Html => parse::Builder::html(source),
            Syntax::Xml => parse::Builder::xml(source)?,
        };

        Ok(Self {
            source: source.into(),
            nodes,
        })
    }

    /// Parse a document from UTF-8 bytes.
    pub fn parse_bytes(source: &[u8], syntax: Syntax) -> Result<Self, Error> {
        Self::parse_str(core::str::from_utf8(source)?, syntax)
    }

    /// Parse a document from a reader, consuming it whole.
    ///
    /// _Requires Cargo feature `std`._
    #[cfg(feature = "std")]
    pub fn from_reader(r: &mut impl std::io::Read, syntax: Syntax) -> Result<Self, Error> {
        let mut buffer = Vec::new();
        r.read_to_end(&mut buffer)?;
        Self::parse_bytes(&buffer, syntax)
    }

    /// The document node, parent of all top-level content.
    pub fn root(&self) -> Node<'_> {
        Node::new(self, 0)
    }

    /// Retrieve a node by id.
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        ((id as usize) < self.nodes.len()).then(|| Node::new(self, id))
    }

    /// Number of nodes, including the document node and attributes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The source text the document was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id as usize]
    }

    pub(crate) fn kind(&self, id: NodeId) -> NodeKind {
        self.data(id).kind
    }

    pub(crate) fn name(&self, id: NodeId) -> &str {
        &self.data(id).name
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    pub(crate) fn attributes(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).attributes
    }

    /// Descendants of a node in document order, excluding attributes.
    pub(crate) fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        (id + 1..self.data(id).end).filter(|&d| self.kind(d) != NodeKind::Attribute)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

/// A handle to a node within a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'d> {
    document: &'d Document,
    id: NodeId,
}

impl<'d> Node<'d> {
    pub(crate) fn new(document: &'d Document, id: NodeId) -> Self {
        Self { document, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.document.kind(self.id)
    }

    pub fn document(&self) -> &'d Document {
        self.document
    }

    /// Element or attribute name.
    pub fn name(&self) -> Option<&'d str> {
        match self.kind() {
            NodeKind::Element | NodeKind::Attribute => Some(self.document.name(self.id)),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<Node<'d>> {
        let document = self.document;
        document.parent(self.id).map(|id| Node::new(document, id))
    }

    /// Child elements and text, in document order.
    pub fn children(self) -> impl Iterator<Item = Node<'d>> + 'd {
        let document = self.document;
        document
            .children(self.id)
            .iter()
            .map(move |&id| Node::new(document, id))
    }

    /// Attribute nodes, in source order.
    pub fn attributes(self) -> impl Iterator<Item = Node<'d>> + 'd {
        let document = self.document;
        document
            .attributes(self.id)
            .iter()
            .map(move |&id| Node::new(document, id))
    }

    /// Decoded value of the named attribute.
    pub fn attribute(&self, name: &str) -> Option<&'d str> {
        let document = self.document;
        document
            .attributes(self.id)
            .iter()
            .map(|&id| document.data(id))
            .find(|data| data.name == name)
            .map(|data| data.text.as_str())
    }

    /// Source bytes of the node's content.
    pub fn raw(&self) -> &'d [u8] {
        let document = self.document;
        let span = document.data(self.id).raw.clone();
        &document.source.as_bytes()[span]
    }

    /// Text rendering of the node's subtree.
    pub fn text(&self) -> Cow<'d, str> {
        let document = self.document;
        let data = document.data(self.id);

        match data.kind {
            NodeKind::Text | NodeKind::Attribute => Cow::Borrowed(&data.text),
            NodeKind::Document | NodeKind::Element => {
                let mut pieces = document
                    .descendants(self.id)
                    .map(|id| document.data(id))
                    .filter(|data| data.kind == NodeKind::Text)
                    .map(|data| data.text.as_str());

                let Some(first) = pieces.next() else {
                    return Cow::Borrowed("");
                };

                // Borrow when a single text node makes up the rendering.
                match pieces.next() {
                    None => Cow::Borrowed(first),
                    Some(second) => {
                        let mut text = String::from(first);
                        text.push_str(second);
                        pieces.for_each(|piece| text.push_str(piece));
                        Cow::Owned(text)
                    }
                }
            }
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.document, other.document) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}
