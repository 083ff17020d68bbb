use alloc::{rc::Rc, string::String};

use super::{Binder, Decode, Error, Shape, Target};
use crate::{
    path::{self, Query, QueryCache},
    tree::Node,
};

/// State of a single decode call.
///
/// Holds the first recoverable error and the compiled queries of the call.
/// Sessions are created by [`decode`](super::decode) and
/// [`decode_at`](super::decode_at) and dropped when they return, so nothing
/// carries over from one call to the next.
#[derive(Debug, Default)]
pub struct Session {
    first: Option<Error>,
    queries: QueryCache,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recoverable error. Only the first is kept.
    pub fn record(&mut self, error: Error) {
        if self.first.is_none() {
            tracing::debug!(%error, "recording decode error");
            self.first = Some(error);
        } else {
            tracing::debug!(%error, "discarding decode error");
        }
    }

    /// The first error recorded, if any.
    pub fn error(&self) -> Option<&Error> {
        self.first.as_ref()
    }

    /// End the session, reporting the first error recorded.
    pub fn finish(self) -> Result<(), Error> {
        match self.first {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Compile a path expression, reusing an earlier compilation of the same
    /// text.
    pub fn query(&mut self, path: &str) -> Result<Rc<Query>, path::Error> {
        self.queries.get_or_compile(path)
    }

    /// Decode a single node into a slot.
    pub fn decode(&mut self, node: Node<'_>, slot: &mut dyn Decode) {
        let ty = slot.type_name();

        // Checked before resolving so skipped slots gain no layers.
        match slot.shape() {
            Shape::ReadOnly => {
                tracing::debug!(ty, "skipping read-only target");
                return;
            }
            Shape::Unsupported => {
                tracing::debug!(ty, "skipping unsupported target");
                return;
            }
            _ => {}
        }

        match slot.target() {
            Target::Html(hook) => {
                if let Err(source) = hook.decode_html(node.raw()) {
                    self.record(Error::Custom { target: ty, source });
                }
            }
            Target::Text(hook) => {
                if let Err(source) = hook.decode_text(&node.text()) {
                    self.record(Error::Custom { target: ty, source });
                }
            }
            Target::Struct(fields) => {
                fields.bind(&mut Binder::new(node, self));
            }
            Target::Scalar(scalar) => {
                if let Err(error) = scalar.materialize(node) {
                    self.record(error);
                }
            }
            Target::Sequence(sequence) => {
                sequence.bind_many(&[node], self);
            }
            Target::ReadOnly | Target::Unsupported => {}
        }
    }

    /// Decode several nodes into a sequence slot.
    ///
    /// Any other shape records a type error, leaving the slot untouched.
    pub fn decode_many(&mut self, nodes: &[Node<'_>], slot: &mut dyn Decode) {
        let ty = slot.type_name();

        match slot.shape() {
            Shape::Sequence => {}
            Shape::ReadOnly => {
                tracing::debug!(ty, "skipping read-only target");
                return;
            }
            _ => {
                self.record(Error::Type {
                    value: String::from("multi-node result"),
                    target: ty,
                });
                return;
            }
        }

        if let Target::Sequence(sequence) = slot.target() {
            sequence.bind_many(nodes, self);
        }
    }
}
