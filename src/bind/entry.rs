use alloc::vec::Vec;

use super::{Decode, Error, Session, Shape};
use crate::tree::{Document, Node};

/// Decode `target` from `root`.
///
/// Decoding continues past recoverable errors, so `target` may be partially
/// populated even when an error is returned.
pub fn decode(root: Node<'_>, target: &mut dyn Decode) -> Result<(), Error> {
    writable(target)?;

    let mut session = Session::new();
    session.decode(root, target);
    session.finish()
}

/// Decode `target` from the nodes `path` selects relative to `root`.
///
/// A sequence target collects every match, while any other target is decoded
/// from the first. Matching nothing is an error, and `target` is left
/// untouched.
pub fn decode_at(root: Node<'_>, path: &str, target: &mut dyn Decode) -> Result<(), Error> {
    writable(target)?;

    let mut session = Session::new();

    let query = session.query(path).map_err(|source| Error::Path {
        path: path.into(),
        source,
    })?;

    let mut matches = query.iter(root);
    let no_match = || Error::NoMatch { path: path.into() };

    tracing::debug!(path, matches = matches.len(), "decoding from sub-root");

    match target.shape() {
        Shape::Sequence => {
            let nodes: Vec<_> = matches.collect();

            if nodes.is_empty() {
                Err(no_match())?
            }

            session.decode_many(&nodes, target);
        }
        _ => {
            let node = matches.next().ok_or_else(no_match)?;
            session.decode(node, target);
        }
    }

    session.finish()
}

fn writable(target: &dyn Decode) -> Result<(), Error> {
    match target.shape() {
        Shape::ReadOnly => Err(Error::InvalidTarget {
            target: target.type_name(),
        }),
        _ => Ok(()),
    }
}

impl Document {
    /// Decode `target` from the document node. See [`decode`].
    pub fn decode(&self, target: &mut dyn Decode) -> Result<(), Error> {
        decode(self.root(), target)
    }

    /// Decode `target` from the nodes `path` selects. See [`decode_at`].
    pub fn decode_at(&self, path: &str, target: &mut dyn Decode) -> Result<(), Error> {
        decode_at(self.root(), path, target)
    }
}
