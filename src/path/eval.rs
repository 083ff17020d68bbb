//! Evaluation of parsed paths against a document.

use alloc::{borrow::Cow, format, vec, vec::Vec};
use core::iter;

use either::Either::{self, Left, Right};

use super::parser::{Axis, Comparison, LocationPath, NodeTest, Operand, Predicate, Step};
use crate::tree::{Document, Node, NodeId, NodeKind};

/// Select the nodes matched by any branch, in document order.
pub(super) fn select<'a>(
    document: &'a Document,
    context: NodeId,
    branches: &'a [LocationPath],
) -> Vec<NodeId> {
    let evaluator = Evaluator { document };

    let mut selected: Vec<_> = branches
        .iter()
        .flat_map(|path| evaluator.path(path, context))
        .collect();

    if branches.len() > 1 {
        selected.sort_unstable();
        selected.dedup();
    }

    selected
}

#[derive(Debug, Clone, Copy)]
struct Context {
    node: NodeId,
    position: usize,
    size: usize,
}

#[derive(Debug)]
enum Value<'a> {
    String(Cow<'a, str>),
    Number(f64),
}

impl Value<'_> {
    fn number(&self) -> f64 {
        match self {
            Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
            Value::Number(n) => *n,
        }
    }
}

struct Evaluator<'a> {
    document: &'a Document,
}

impl<'a> Evaluator<'a> {
    fn path(&self, path: &'a LocationPath, context: NodeId) -> Vec<NodeId> {
        let mut current = vec![if path.absolute { 0 } else { context }];

        for step in &path.steps {
            let mut next: Vec<_> = current
                .iter()
                .flat_map(|&node| self.step(step, node))
                .collect();

            // Ids are assigned in document order.
            next.sort_unstable();
            next.dedup();

            current = next;

            if current.is_empty() {
                break;
            }
        }

        current
    }

    fn step(&self, step: &'a Step, node: NodeId) -> Vec<NodeId> {
        let principal = match step.axis {
            Axis::Attribute => NodeKind::Attribute,
            _ => NodeKind::Element,
        };

        let mut candidates: Vec<_> = self
            .axis(step.axis, node)
            .into_iter()
            .filter(|&id| self.test(&step.test, principal, id))
            .collect();

        // Positions count from 1 in axis order, over what the previous
        // predicate left.
        for predicate in &step.predicates {
            let size = candidates.len();

            candidates = candidates
                .iter()
                .enumerate()
                .filter(|&(i, &node)| {
                    let context = Context {
                        node,
                        position: i + 1,
                        size,
                    };
                    self.predicate(predicate, context)
                })
                .map(|(_, &node)| node)
                .collect();
        }

        candidates
    }

    /// Nodes along an axis, nearest first.
    fn axis(&self, axis: Axis, node: NodeId) -> Vec<NodeId> {
        let document = self.document;

        match axis {
            Axis::Child => document.children(node).to_vec(),
            Axis::Descendant => document.descendants(node).collect(),
            Axis::DescendantOrSelf => iter::once(node).chain(document.descendants(node)).collect(),
            Axis::Parent => document.parent(node).into_iter().collect(),
            Axis::Ancestor => iter::successors(document.parent(node), |&id| document.parent(id)).collect(),
            Axis::AncestorOrSelf => iter::successors(Some(node), |&id| document.parent(id)).collect(),
            Axis::FollowingSibling => self
                .siblings(node)
                .map(|(siblings, i)| siblings[i + 1..].to_vec())
                .unwrap_or_default(),
            Axis::PrecedingSibling => self
                .siblings(node)
                .map(|(siblings, i)| siblings[..i].iter().rev().copied().collect())
                .unwrap_or_default(),
            Axis::Attribute => document.attributes(node).to_vec(),
            Axis::Itself => vec![node],
        }
    }

    /// The parent's children and the node's index among them.
    fn siblings(&self, node: NodeId) -> Option<(&'a [NodeId], usize)> {
        let document = self.document;

        // Attributes have no siblings.
        if document.kind(node) == NodeKind::Attribute {
            return None;
        }

        let children = document.children(document.parent(node)?);
        let index = children.binary_search(&node).ok()?;

        Some((children, index))
    }

    fn test(&self, test: &NodeTest, principal: NodeKind, node: NodeId) -> bool {
        let kind = self.document.kind(node);

        match test {
            NodeTest::Name(name) => kind == principal && self.document.name(node) == name,
            NodeTest::Any => kind == principal,
            NodeTest::Node => true,
            NodeTest::Text => kind == NodeKind::Text,
        }
    }

    fn predicate(&self, predicate: &'a Predicate, context: Context) -> bool {
        match predicate {
            Predicate::Or(left, right) => {
                self.predicate(left, context) || self.predicate(right, context)
            }
            Predicate::And(left, right) => {
                self.predicate(left, context) && self.predicate(right, context)
            }
            Predicate::Not(inner) => !self.predicate(inner, context),
            Predicate::Compare(left, comparison, right) => {
                let left = self.values(left, context);
                let right = self.values(right, context);

                left.iter()
                    .any(|l| right.iter().any(|r| compare(l, *comparison, r)))
            }
            Predicate::Contains(haystack, needle) => self
                .string(haystack, context)
                .contains(&*self.string(needle, context)),
            Predicate::StartsWith(haystack, needle) => self
                .string(haystack, context)
                .starts_with(&*self.string(needle, context)),
            Predicate::Test(operand) => match self.operand(operand, context) {
                Left(nodes) => !nodes.is_empty(),
                Right(Value::Number(n)) => n == context.position as f64,
                Right(Value::String(s)) => !s.is_empty(),
            },
        }
    }

    fn operand(&self, operand: &'a Operand, context: Context) -> Either<Vec<NodeId>, Value<'a>> {
        match operand {
            Operand::Path(path) => Left(self.path(path, context.node)),
            Operand::Literal(s) => Right(Value::String(Cow::Borrowed(s))),
            Operand::Number(n) => Right(Value::Number(*n)),
            Operand::Position => Right(Value::Number(context.position as f64)),
            Operand::Last => Right(Value::Number(context.size as f64)),
        }
    }

    /// An operand as the values it compares with: one per selected node.
    fn values(&self, operand: &'a Operand, context: Context) -> Vec<Value<'a>> {
        self.operand(operand, context).either(
            |nodes| {
                nodes
                    .into_iter()
                    .map(|id| Value::String(self.text(id)))
                    .collect()
            },
            |value| vec![value],
        )
    }

    /// An operand's string value; a node set uses its first node.
    fn string(&self, operand: &'a Operand, context: Context) -> Cow<'a, str> {
        match self.operand(operand, context) {
            Left(nodes) => nodes.first().map_or(Cow::Borrowed(""), |&id| self.text(id)),
            Right(Value::String(s)) => s,
            Right(Value::Number(n)) => Cow::Owned(format!("{n}")),
        }
    }

    fn text(&self, id: NodeId) -> Cow<'a, str> {
        Node::new(self.document, id).text()
    }
}

fn compare(left: &Value<'_>, comparison: Comparison, right: &Value<'_>) -> bool {
    if let (Value::String(l), Value::String(r), Comparison::Eq | Comparison::NotEq) =
        (left, right, comparison)
    {
        return (l == r) == (comparison == Comparison::Eq);
    }

    let (l, r) = (left.number(), right.number());

    match comparison {
        Comparison::Eq => l == r,
        Comparison::NotEq => l != r,
        Comparison::Lt => l < r,
        Comparison::LtEq => l <= r,
        Comparison::Gt => l > r,
        Comparison::GtEq => l >= r,
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::path::parser::parse;

    const LIST: &str = r#"<div id="log">
        <ul class="commit-group">
            <li data-n="3"><a href="/c/1">one</a></li>
            <li data-n="10"><a href="/c/2">two</a></li>
            <li class="merge"><a href="/c/3">three</a></li>
        </ul>
        <p>tail</p>
    </div>"#;

    fn texts(source: &str, expression: &str) -> Vec<alloc::string::String> {
        let document = Document::parse_html(source);
        let branches = parse(expression).unwrap();

        select(&document, 0, &branches)
            .into_iter()
            .map(|id| Node::new(&document, id).text().trim().into())
            .collect()
    }

    #[test]
    fn descendant_positions_are_per_parent() {
        let document = Document::parse_html("<p><b>1</b><b>2</b></p><p><b>3</b></p>");
        let branches = parse("//b[1]").unwrap();
        let found: Vec<_> = select(&document, 0, &branches)
            .into_iter()
            .map(|id| Node::new(&document, id).text().into_owned())
            .collect();

        assert_eq!(found, ["1", "3"]);
    }

    #[test]
    fn positional_predicates() {
        assert_eq!(texts(LIST, "//li[2]"), ["two"]);
        assert_eq!(texts(LIST, "//li[last()]"), ["three"]);
        assert_eq!(texts(LIST, "//li[position() > 1]"), ["two", "three"]);
    }

    #[test]
    fn attribute_predicates() {
        assert_eq!(texts(LIST, "//li[@class='merge']"), ["three"]);
        assert_eq!(texts(LIST, "//li[not(@class)]"), ["one", "two"]);
        assert_eq!(texts(LIST, "//li[@data-n > 5]"), ["two"]);
        assert_eq!(texts(LIST, "//a[contains(@href, '/2')]"), ["two"]);
        assert_eq!(texts(LIST, "//a[starts-with(., 't')]"), ["two", "three"]);
    }

    #[test]
    fn attribute_axis_selects_values() {
        assert_eq!(texts(LIST, "//li/a/@href"), ["/c/1", "/c/2", "/c/3"]);
        assert_eq!(texts(LIST, "//ul/@*"), ["commit-group"]);
    }

    #[test]
    fn reverse_and_sibling_axes() {
        assert_eq!(texts(LIST, "//li[2]/following-sibling::li"), ["three"]);
        assert_eq!(texts(LIST, "//li[3]/preceding-sibling::li[1]"), ["two"]);
        assert_eq!(texts(LIST, "//a[.='two']/../@data-n"), ["10"]);
        assert_eq!(
            texts(LIST, "//a[.='one']/ancestor::*[@id]/p"),
            ["tail"]
        );
    }

    #[test]
    fn unions_are_in_document_order() {
        assert_eq!(texts(LIST, "//p | //li[1] | //p"), ["one", "tail"]);
    }

    #[test]
    fn text_node_test() {
        assert_eq!(
            texts("<test><inner>Hello</inner> World</test>", "/test/text()"),
            ["World"]
        );
    }

    #[test]
    fn comparing_node_sets_is_existential() {
        assert_eq!(texts(LIST, "//ul[li/a = 'two']/../p"), ["tail"]);
        assert!(texts(LIST, "//ul[li/a = 'four']").is_empty());
    }

    #[test]
    fn relative_paths_start_at_the_context() {
        let document = Document::parse_html(LIST);
        let ul = parse("//ul").unwrap();
        let ul = select(&document, 0, &ul)[0];
        let a = parse("li/a").unwrap();

        assert_eq!(select(&document, ul, &a).len(), 3);

        let absolute = parse("/div/p").unwrap();

        assert_eq!(select(&document, ul, &absolute).len(), 1);
    }
}
