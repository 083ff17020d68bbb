//! Single-pass markup parser building the node arena.

use alloc::{string::String, vec, vec::Vec};
use core::ops::Range;

use memchr::{memchr, memmem};

use super::{Error, NodeData, NodeId, NodeKind, Syntax, entities};

/// Elements that never have content in HTML.
const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is kept as a single, undecoded text node in HTML.
const RAW_TEXT: &[&str] = &["script", "style"];

/// Elements implicitly closed by an immediately nested sibling of the same
/// name in HTML (`<li>a<li>b`).
const SELF_NESTING: &[&str] = &["p", "li", "option", "tr", "td", "th", "dt", "dd"];

pub(super) struct Builder<'s> {
    source: &'s str,
    bytes: &'s [u8],
    syntax: Syntax,
    nodes: Vec<NodeData>,
    /// Currently open elements, innermost last.
    open: Vec<NodeId>,
    pos: usize,
}

impl<'s> Builder<'s> {
    fn new(source: &'s str, syntax: Syntax) -> Self {
        let document = NodeData {
            kind: NodeKind::Document,
            name: String::new(),
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            end: 1,
            raw: 0..source.len(),
            text: String::new(),
        };

        Self {
            source,
            bytes: source.as_bytes(),
            syntax,
            nodes: vec![document],
            open: Vec::new(),
            pos: 0,
        }
    }

    /// Build the arena for lenient HTML. Every input yields a document.
    pub(super) fn html(source: &'s str) -> Vec<NodeData> {
        let mut builder = Self::new(source, Syntax::Html);

        if let Err(error) = builder.parse() {
            tracing::debug!(%error, "keeping nodes parsed before the error");
        }

        builder.finish()
    }

    /// Build the arena for well-formed XML.
    pub(super) fn xml(source: &'s str) -> Result<Vec<NodeData>, Error> {
        let mut builder = Self::new(source, Syntax::Xml);
        builder.parse()?;

        Ok(builder.finish())
    }

    fn parse(&mut self) -> Result<(), Error> {
        while self.pos < self.bytes.len() {
            match memchr(b'<', &self.bytes[self.pos..]) {
                Some(i) => {
                    let at = self.pos + i;
                    self.text(self.pos..at, true);
                    self.markup(at)?;
                }
                None => {
                    self.text(self.pos..self.bytes.len(), true);
                    self.pos = self.bytes.len();
                }
            }
        }

        if self.syntax == Syntax::Xml {
            if let Some(&id) = self.open.last() {
                Err(Error::Unclosed {
                    name: self.nodes[id as usize].name.clone(),
                })?
            }
        }

        Ok(())
    }

    /// Close elements left open at end of input and seal the arena.
    fn finish(mut self) -> Vec<NodeData> {
        while let Some(id) = self.open.pop() {
            self.close(id, self.bytes.len());
        }

        self.nodes[0].end = self.nodes.len() as NodeId;
        self.nodes
    }

    /// Dispatch on the markup construct starting at `at` (a `<`).
    fn markup(&mut self, at: usize) -> Result<(), Error> {
        let rest = &self.bytes[at..];

        if rest.starts_with(b"<!--") {
            self.pos = self.skip_past(at + 4, b"-->")?;
        } else if rest.starts_with(b"<![CDATA[") {
            let start = at + 9;
            let end = self.find(start, b"]]>")?;
            self.text(start..end, false);
            self.pos = (end + 3).min(self.bytes.len());
        } else if rest.starts_with(b"<!") || rest.starts_with(b"<?") {
            self.pos = self.skip_past(at + 2, b">")?;
        } else if rest.starts_with(b"</") {
            self.close_tag(at)?;
        } else if rest
            .get(1)
            .is_some_and(|&b| b.is_ascii_alphabetic() || b == b'_' || b == b':')
        {
            self.start_tag(at)?;
        } else {
            match self.syntax {
                Syntax::Html => {
                    self.text(at..at + 1, true);
                    self.pos = at + 1;
                }
                Syntax::Xml => Err(Error::Malformed { offset: at })?,
            }
        }

        Ok(())
    }

    fn start_tag(&mut self, at: usize) -> Result<(), Error> {
        let name_end = self.scan(at + 1, |b| is_space(b) || b == b'/' || b == b'>');
        let name = self.name(at + 1..name_end);

        let mut attributes: Vec<(String, Range<usize>)> = Vec::new();
        let mut i = name_end;

        let self_closing = loop {
            i = self.scan(i, |b| !is_space(b));

            match self.bytes.get(i) {
                None => match self.syntax {
                    Syntax::Html => break false,
                    Syntax::Xml => Err(Error::Unclosed { name: name.clone() })?,
                },
                Some(b'>') => {
                    i += 1;
                    break false;
                }
                Some(b'/') if self.bytes.get(i + 1) == Some(&b'>') => {
                    i += 2;
                    break true;
                }
                Some(b'/') => i += 1,
                Some(_) => {
                    let start = i;
                    i = self.scan(i, |b| is_space(b) || matches!(b, b'=' | b'>' | b'/'));

                    if i == start {
                        // A stray `=` with no name in front of it.
                        i += 1;
                        continue;
                    }

                    let attribute = self.name(start..i);
                    let (value, next) = self.attribute_value(i)?;
                    attributes.push((attribute, value));
                    i = next;
                }
            }
        };

        let end = i.min(self.bytes.len());

        if self.syntax == Syntax::Html {
            if let Some(&top) = self.open.last() {
                if self.nodes[top as usize].name == name && SELF_NESTING.contains(&name.as_str()) {
                    self.open.pop();
                    self.close(top, at);
                }
            }
        }

        let id = self.push(NodeKind::Element, name, end..end, String::new());

        for (attribute, value) in attributes {
            let text = entities::decode(&self.source[value.clone()]).into_owned();
            let attribute_id = self.nodes.len() as NodeId;

            self.nodes.push(NodeData {
                kind: NodeKind::Attribute,
                name: attribute,
                parent: Some(id),
                children: Vec::new(),
                attributes: Vec::new(),
                end: attribute_id + 1,
                raw: value,
                text,
            });
            self.nodes[id as usize].attributes.push(attribute_id);
        }

        self.pos = end;

        let html = self.syntax == Syntax::Html;
        let name = self.nodes[id as usize].name.as_str();
        let void = html && VOID.contains(&name);
        let raw_text = html && RAW_TEXT.contains(&name);

        if self_closing || void {
            self.close(id, end);
        } else if raw_text {
            let (content_end, next) = self.raw_text_end(end, id);
            self.open.push(id);
            self.text(end..content_end, false);
            self.open.pop();
            self.close(id, content_end);
            self.pos = next;
        } else {
            self.open.push(id);
        }

        Ok(())
    }

    /// Parse an optional `= value` following an attribute name at `i`.
    fn attribute_value(&self, i: usize) -> Result<(Range<usize>, usize), Error> {
        let j = self.scan(i, |b| !is_space(b));

        if self.bytes.get(j) != Some(&b'=') {
            return Ok((i..i, i));
        }

        let j = self.scan(j + 1, |b| !is_space(b));

        Ok(match self.bytes.get(j) {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = j + 1;
                match memchr(quote, &self.bytes[start..]) {
                    Some(k) => (start..start + k, start + k + 1),
                    None if self.syntax == Syntax::Html => {
                        (start..self.bytes.len(), self.bytes.len())
                    }
                    None => Err(Error::Malformed { offset: j })?,
                }
            }
            Some(_) => {
                let end = self.scan(j, |b| is_space(b) || b == b'>');
                (j..end, end)
            }
            None => (j..j, j),
        })
    }

    /// Locate the end of a raw-text element's content, returning the content
    /// end and the offset just past the closing tag.
    fn raw_text_end(&self, from: usize, id: NodeId) -> (usize, usize) {
        let name = self.nodes[id as usize].name.as_bytes();
        let mut i = from;

        while let Some(k) = memmem::find(&self.bytes[i..], b"</") {
            let at = i + k;
            let candidate = &self.bytes[at + 2..];

            if candidate.len() >= name.len() && candidate[..name.len()].eq_ignore_ascii_case(name) {
                let next = memchr(b'>', &self.bytes[at..])
                    .map_or(self.bytes.len(), |j| at + j + 1);
                return (at, next);
            }

            i = at + 2;
        }

        (self.bytes.len(), self.bytes.len())
    }

    fn close_tag(&mut self, at: usize) -> Result<(), Error> {
        let name_end = self.scan(at + 2, |b| is_space(b) || b == b'>');
        let name = self.name(at + 2..name_end);
        let next = memchr(b'>', &self.bytes[name_end..]).map(|j| name_end + j + 1);

        match self.syntax {
            Syntax::Html => {
                let depth = self
                    .open
                    .iter()
                    .rposition(|&id| self.nodes[id as usize].name == name);

                // Unmatched closing tags are dropped.
                if let Some(depth) = depth {
                    while self.open.len() > depth {
                        if let Some(id) = self.open.pop() {
                            self.close(id, at);
                        }
                    }
                }

                self.pos = next.unwrap_or(self.bytes.len());
            }
            Syntax::Xml => {
                let Some(next) = next else {
                    Err(Error::Malformed { offset: at })?
                };

                match self.open.pop() {
                    Some(id) if self.nodes[id as usize].name == name => self.close(id, at),
                    Some(id) => Err(Error::Mismatched {
                        expected: self.nodes[id as usize].name.clone(),
                        found: name,
                        offset: at,
                    })?,
                    None => Err(Error::Unopened {
                        found: name,
                        offset: at,
                    })?,
                }

                self.pos = next;
            }
        }

        Ok(())
    }

    /// Add a text node, decoding entities when `decode` is set.
    fn text(&mut self, span: Range<usize>, decode: bool) {
        if span.is_empty() {
            return;
        }

        let text = &self.source[span.clone()];
        let text = if decode {
            entities::decode(text).into_owned()
        } else {
            text.into()
        };

        self.push(NodeKind::Text, String::new(), span, text);
    }

    fn push(&mut self, kind: NodeKind, name: String, raw: Range<usize>, text: String) -> NodeId {
        let id = self.nodes.len() as NodeId;
        let parent = self.open.last().copied().unwrap_or(0);

        self.nodes.push(NodeData {
            kind,
            name,
            parent: Some(parent),
            children: Vec::new(),
            attributes: Vec::new(),
            end: id + 1,
            raw,
            text,
        });
        self.nodes[parent as usize].children.push(id);

        id
    }

    /// Finish an element whose content ends at `raw_end`.
    fn close(&mut self, id: NodeId, raw_end: usize) {
        let end = self.nodes.len() as NodeId;
        let node = &mut self.nodes[id as usize];

        node.raw.end = raw_end.max(node.raw.start);
        node.end = end;
    }

    fn name(&self, span: Range<usize>) -> String {
        let name = &self.source[span];

        match self.syntax {
            Syntax::Html => name.to_ascii_lowercase(),
            Syntax::Xml => name.into(),
        }
    }

    /// Advance from `i` until `stop` matches a byte or input ends.
    fn scan(&self, i: usize, stop: impl Fn(u8) -> bool) -> usize {
        let i = i.min(self.bytes.len());

        self.bytes[i..]
            .iter()
            .position(|&b| stop(b))
            .map_or(self.bytes.len(), |j| i + j)
    }

    fn find(&self, from: usize, needle: &[u8]) -> Result<usize, Error> {
        match memmem::find(&self.bytes[from.min(self.bytes.len())..], needle) {
            Some(j) => Ok(from + j),
            None if self.syntax == Syntax::Html => Ok(self.bytes.len()),
            None => Err(Error::Malformed { offset: from }),
        }
    }

    fn skip_past(&self, from: usize, needle: &[u8]) -> Result<usize, Error> {
        Ok((self.find(from, needle)? + needle.len()).min(self.bytes.len()))
    }
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c)
}
