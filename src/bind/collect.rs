use alloc::vec::Vec;

use super::{Decode, Session, Shape, Target};
use crate::tree::Node;

/// A sequence filled from successive nodes, in document order.
pub trait Sequence {
    /// Decode `nodes[i]` into element `i`, for as many elements as fit.
    fn bind_many(&mut self, nodes: &[Node<'_>], session: &mut Session);
}

/// Elements are overwritten in place from the start; elements beyond the last
/// node are kept.
impl<T: Decode + Default> Sequence for Vec<T> {
    fn bind_many(&mut self, nodes: &[Node<'_>], session: &mut Session) {
        for (i, &node) in nodes.iter().enumerate() {
            if i >= self.capacity() {
                let capacity = (self.capacity() + self.capacity() / 2).max(4);
                self.reserve_exact(capacity - self.len());
            }

            if i >= self.len() {
                self.push(T::default());
            }

            session.decode(node, &mut self[i]);
        }
    }
}

impl<T: Decode + Default> Decode for Vec<T> {
    fn shape(&self) -> Shape {
        T::vec_shape()
    }

    fn target(&mut self) -> Target<'_> {
        T::vec_target(self)
    }
}

/// Nodes beyond the array's length are dropped.
impl<T: Decode, const N: usize> Sequence for [T; N] {
    fn bind_many(&mut self, nodes: &[Node<'_>], session: &mut Session) {
        if nodes.len() > N {
            tracing::trace!(dropped = nodes.len() - N, "fixed-length sequence is full");
        }

        for (slot, &node) in self.iter_mut().zip(nodes) {
            session.decode(node, slot);
        }
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn shape(&self) -> Shape {
        Shape::Sequence
    }

    fn target(&mut self) -> Target<'_> {
        Target::Sequence(self)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec, vec::Vec};

    use super::*;
    use crate::{bind::Error, tree::Document};

    fn collect(source: &str, slot: &mut dyn Decode) -> Result<(), Error> {
        let document = Document::parse_html(source);
        let nodes: Vec<_> = document.root().children().collect();
        let mut session = Session::new();

        session.decode_many(&nodes, slot);
        session.finish()
    }

    #[test]
    fn growth_is_geometric_with_a_minimum() {
        let document = Document::parse_html("<i>0</i><i>1</i><i>2</i><i>3</i><i>4</i>");
        let nodes: Vec<_> = document.root().children().collect();
        let mut session = Session::new();

        let mut values: Vec<i32> = Vec::new();
        values.bind_many(&nodes[..1], &mut session);
        assert_eq!(values.capacity(), 4);

        let mut values: Vec<i32> = Vec::new();
        values.bind_many(&nodes, &mut session);
        assert_eq!(values.capacity(), 6);
        assert_eq!(values, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn elements_follow_document_order() {
        let mut values: Vec<String> = Vec::new();

        collect("<li>c</li><li>a</li><li>b</li>", &mut values).unwrap();

        assert_eq!(values, ["c", "a", "b"]);
    }

    #[test]
    fn existing_elements_are_overwritten_in_place() {
        let mut values = vec![9u8, 9, 9];

        collect("<li>1</li><li>2</li>", &mut values).unwrap();

        assert_eq!(values, [1, 2, 9]);
    }

    #[test]
    fn failed_elements_do_not_stop_the_rest() {
        let mut values: Vec<u8> = Vec::new();
        let mut numbers: Vec<Option<u8>> = Vec::new();

        let result = collect("<li>1</li><li>x</li><li>300</li><li>4</li>", &mut numbers);

        assert_eq!(numbers, [Some(1), Some(0), Some(0), Some(4)]);
        assert!(matches!(result, Err(Error::Integer { .. })));

        // Byte vectors are scalar, so several nodes don't fit.
        let result = collect("<li>1</li><li>2</li>", &mut values);

        assert!(values.is_empty());
        assert!(matches!(result, Err(Error::Type { .. })));
    }

    #[test]
    fn arrays_drop_excess_nodes() {
        let mut values = [0u16; 2];

        collect("<li>1</li><li>2</li><li>3</li>", &mut values).unwrap();

        assert_eq!(values, [1, 2]);

        let mut values = [7u16; 3];

        collect("<li>1</li><li>2</li>", &mut values).unwrap();

        assert_eq!(values, [1, 2, 7]);
    }

    #[test]
    fn nested_sequences() {
        let document = Document::parse_html("<ul><li>1</li><li>2</li></ul><ul><li>3</li></ul>");
        let mut session = Session::new();
        let mut rows: Vec<Vec<u8>> = Vec::new();
        let mut table: Vec<Vec<u32>> = Vec::new();

        let lists: Vec<_> = document.root().children().collect();
        session.decode_many(&lists, &mut table);
        session.decode_many(&lists, &mut rows);

        // A single node decodes into a one-element sequence.
        assert_eq!(table, [vec![12], vec![3]]);
        assert_eq!(rows, [b"<li>1</li><li>2</li>".to_vec(), b"<li>3</li>".to_vec()]);
        assert!(session.finish().is_ok());
    }
}
