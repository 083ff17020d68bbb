use alloc::vec::Vec;

use super::{Decode, Error, Session};
use crate::tree::Node;

/// A struct whose fields are bound by path expressions.
///
/// See the [`Decode`](macro@super::Decode) derive macro for an automatic
/// implementation of this trait.
pub trait Fields {
    /// Bind each field in declaration order.
    ///
    /// Fields that are not decoded are not passed to the binder.
    fn bind(&mut self, binder: &mut Binder<'_, '_>);
}

/// Binds the fields of one struct against its node.
#[derive(Debug)]
pub struct Binder<'s, 'd> {
    node: Node<'d>,
    session: &'s mut Session,
}

impl<'s, 'd> Binder<'s, 'd> {
    pub fn new(node: Node<'d>, session: &'s mut Session) -> Self {
        Self { node, session }
    }

    /// Bind one field to the nodes matched by `path`.
    ///
    /// A field matching nothing is left untouched. One match is decoded into
    /// the field directly, while several are collected into it as a sequence.
    pub fn field(&mut self, name: &str, path: &str, slot: &mut dyn Decode) {
        let query = match self.session.query(path) {
            Ok(query) => query,
            Err(source) => {
                self.session.record(Error::Path {
                    path: path.into(),
                    source,
                });
                return;
            }
        };

        let nodes: Vec<_> = query.iter(self.node).collect();

        match nodes.as_slice() {
            [] => tracing::debug!(field = name, path, "no nodes matched, skipping field"),
            [node] => self.session.decode(*node, slot),
            _ => {
                tracing::trace!(field = name, path, matches = nodes.len(), "collecting nodes");
                self.session.decode_many(&nodes, slot);
            }
        }
    }
}
