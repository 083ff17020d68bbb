//! Recursive descent parser for path expressions.

use alloc::{
    boxed::Box,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use super::{
    Error,
    lexer::{Token, tokenize},
};

/// A location path, absolute or relative to the context node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LocationPath {
    pub(crate) absolute: bool,
    pub(crate) steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Step {
    pub(crate) axis: Axis,
    pub(crate) test: NodeTest,
    pub(crate) predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    Attribute,
    Itself,
}

impl Axis {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "parent" => Axis::Parent,
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "following-sibling" => Axis::FollowingSibling,
            "preceding-sibling" => Axis::PrecedingSibling,
            "attribute" => Axis::Attribute,
            "self" => Axis::Itself,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeTest {
    /// `name`: elements (or attributes, on the attribute axis) by name.
    Name(String),
    /// `*`: any element (or attribute).
    Any,
    /// `node()`
    Node,
    /// `text()`
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Predicate {
    Or(Box<Predicate>, Box<Predicate>),
    And(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    Compare(Operand, Comparison, Operand),
    Contains(Operand, Operand),
    StartsWith(Operand, Operand),
    /// A bare operand: a position for numbers, existence for paths.
    Test(Operand),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Path(LocationPath),
    Literal(String),
    Number(f64),
    Position,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comparison {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// Parse an expression into the location paths of its union.
pub(crate) fn parse(input: &str) -> Result<Vec<LocationPath>, Error> {
    let tokens = tokenize(input)?;

    if tokens.is_empty() {
        return Err(Error::Empty);
    }

    let mut parser = Parser {
        tokens,
        index: 0,
        len: input.len(),
    };

    let mut branches = vec![parser.path()?];

    while parser.eat(&Token::Pipe) {
        branches.push(parser.path()?);
    }

    match parser.tokens.get(parser.index) {
        Some((offset, token)) => Err(Error::Unexpected {
            found: token.to_string(),
            offset: *offset,
        }),
        None => Ok(branches),
    }
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    index: usize,
    /// Input length, the offset reported for errors at the end.
    len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.index + n).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.index).map_or(self.len, |(o, _)| *o)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).map(|(_, t)| t.clone());
        self.index += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        let matched = self.peek() == Some(token);
        if matched {
            self.index += 1;
        }
        matched
    }

    fn eat_name(&mut self, name: &str) -> bool {
        let matched = matches!(self.peek(), Some(Token::Name(n)) if n == name);
        if matched {
            self.index += 1;
        }
        matched
    }

    fn expect(&mut self, token: Token) -> Result<(), Error> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> Error {
        match self.peek() {
            Some(token) => Error::Unexpected {
                found: token.to_string(),
                offset: self.offset(),
            },
            None => Error::UnexpectedEnd,
        }
    }

    fn path(&mut self) -> Result<LocationPath, Error> {
        let mut steps = Vec::new();

        let absolute = match self.peek() {
            Some(Token::Slash) => {
                self.advance();

                // A lone `/` selects the document node.
                if !self.starts_step() {
                    return Ok(LocationPath {
                        absolute: true,
                        steps,
                    });
                }

                true
            }
            Some(Token::DoubleSlash) => {
                self.advance();
                steps.push(descendant_or_self());
                true
            }
            _ => false,
        };

        steps.push(self.step()?);

        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(descendant_or_self());
                steps.push(self.step()?);
            } else {
                break;
            }
        }

        Ok(LocationPath { absolute, steps })
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Dot | Token::DoubleDot | Token::At | Token::Star | Token::Name(_))
        )
    }

    fn step(&mut self) -> Result<Step, Error> {
        let axis = match (self.peek(), self.peek_at(1)) {
            (Some(Token::Dot), _) => {
                self.advance();
                return Ok(bare(Axis::Itself));
            }
            (Some(Token::DoubleDot), _) => {
                self.advance();
                return Ok(bare(Axis::Parent));
            }
            (Some(Token::At), _) => {
                self.advance();
                Axis::Attribute
            }
            (Some(Token::Name(name)), Some(Token::DoubleColon)) => {
                let offset = self.offset();
                let Some(axis) = Axis::from_name(name) else {
                    return Err(Error::UnknownAxis {
                        name: name.clone(),
                        offset,
                    });
                };
                self.index += 2;
                axis
            }
            _ => Axis::Child,
        };

        let test = self.node_test()?;

        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            predicates.push(self.or()?);
            self.expect(Token::RightBracket)?;
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn node_test(&mut self) -> Result<NodeTest, Error> {
        let offset = self.offset();

        match self.advance() {
            Some(Token::Star) => Ok(NodeTest::Any),
            Some(Token::Name(name)) if self.peek() == Some(&Token::LeftParen) => {
                let test = match name.as_str() {
                    "text" => NodeTest::Text,
                    "node" => NodeTest::Node,
                    _ => Err(Error::UnknownFunction { name, offset })?,
                };
                self.expect(Token::LeftParen)?;
                self.expect(Token::RightParen)?;
                Ok(test)
            }
            Some(Token::Name(name)) => Ok(NodeTest::Name(name)),
            Some(token) => Err(Error::Unexpected {
                found: token.to_string(),
                offset,
            }),
            None => Err(Error::UnexpectedEnd),
        }
    }

    fn or(&mut self) -> Result<Predicate, Error> {
        let mut left = self.and()?;

        while self.eat_name("or") {
            left = Predicate::Or(Box::new(left), Box::new(self.and()?));
        }

        Ok(left)
    }

    fn and(&mut self) -> Result<Predicate, Error> {
        let mut left = self.comparison()?;

        while self.eat_name("and") {
            left = Predicate::And(Box::new(left), Box::new(self.comparison()?));
        }

        Ok(left)
    }

    fn comparison(&mut self) -> Result<Predicate, Error> {
        let left = self.primary()?;

        let comparison = match self.peek() {
            Some(Token::Eq) => Comparison::Eq,
            Some(Token::NotEq) => Comparison::NotEq,
            Some(Token::Lt) => Comparison::Lt,
            Some(Token::LtEq) => Comparison::LtEq,
            Some(Token::Gt) => Comparison::Gt,
            Some(Token::GtEq) => Comparison::GtEq,
            _ => return Ok(left),
        };

        let Predicate::Test(left) = left else {
            return Err(self.unexpected());
        };

        self.advance();

        Ok(Predicate::Compare(left, comparison, self.operand()?))
    }

    fn primary(&mut self) -> Result<Predicate, Error> {
        if self.eat(&Token::LeftParen) {
            let inner = self.or()?;
            self.expect(Token::RightParen)?;
            return Ok(inner);
        }

        if let (Some(Token::Name(name)), Some(Token::LeftParen)) = (self.peek(), self.peek_at(1)) {
            let function = match name.as_str() {
                "not" => Some(Function::Not),
                "contains" => Some(Function::Contains),
                "starts-with" => Some(Function::StartsWith),
                _ => None,
            };

            if let Some(function) = function {
                self.index += 2;

                let predicate = match function {
                    Function::Not => Predicate::Not(Box::new(self.or()?)),
                    Function::Contains | Function::StartsWith => {
                        let haystack = self.operand()?;
                        self.expect(Token::Comma)?;
                        let needle = self.operand()?;

                        match function {
                            Function::Contains => Predicate::Contains(haystack, needle),
                            _ => Predicate::StartsWith(haystack, needle),
                        }
                    }
                };

                self.expect(Token::RightParen)?;
                return Ok(predicate);
            }
        }

        Ok(Predicate::Test(self.operand()?))
    }

    fn operand(&mut self) -> Result<Operand, Error> {
        match (self.peek(), self.peek_at(1)) {
            (Some(Token::Literal(s)), _) => {
                let s = s.clone();
                self.advance();
                Ok(Operand::Literal(s))
            }
            (Some(Token::Number(n)), _) => {
                let n = *n;
                self.advance();
                Ok(Operand::Number(n))
            }
            (Some(Token::Name(name)), Some(Token::LeftParen))
                if name == "position" || name == "last" =>
            {
                let operand = match name.as_str() {
                    "position" => Operand::Position,
                    _ => Operand::Last,
                };
                self.index += 2;
                self.expect(Token::RightParen)?;
                Ok(operand)
            }
            (None, _) => Err(Error::UnexpectedEnd),
            _ => Ok(Operand::Path(self.path()?)),
        }
    }
}

enum Function {
    Not,
    Contains,
    StartsWith,
}

fn bare(axis: Axis) -> Step {
    Step {
        axis,
        test: NodeTest::Node,
        predicates: Vec::new(),
    }
}

fn descendant_or_self() -> Step {
    bare(Axis::DescendantOrSelf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(name: &str) -> Step {
        Step {
            axis: Axis::Child,
            test: NodeTest::Name(name.into()),
            predicates: Vec::new(),
        }
    }

    #[test]
    fn absolute_path() {
        assert_eq!(
            parse("/ul/li").unwrap(),
            [LocationPath {
                absolute: true,
                steps: vec![child("ul"), child("li")],
            }]
        );
    }

    #[test]
    fn lone_slash_is_the_document() {
        assert_eq!(
            parse("/").unwrap(),
            [LocationPath {
                absolute: true,
                steps: vec![],
            }]
        );
    }

    #[test]
    fn descendant_abbreviation() {
        let paths = parse("div//span").unwrap();

        assert_eq!(
            paths[0].steps,
            [child("div"), descendant_or_self(), child("span")]
        );
        assert!(!paths[0].absolute);
    }

    #[test]
    fn attribute_and_text_steps() {
        let paths = parse("p/a/@title | text()").unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].steps[2].axis, Axis::Attribute);
        assert_eq!(paths[0].steps[2].test, NodeTest::Name("title".into()));
        assert_eq!(paths[1].steps[0].test, NodeTest::Text);
    }

    #[test]
    fn predicate_comparison() {
        let paths = parse("descendant::*[@class='commit-group']/li").unwrap();
        let step = &paths[0].steps[0];

        assert_eq!(step.axis, Axis::Descendant);
        assert_eq!(step.test, NodeTest::Any);

        let Predicate::Compare(Operand::Path(left), Comparison::Eq, Operand::Literal(right)) =
            &step.predicates[0]
        else {
            panic!("unexpected predicate {:?}", step.predicates[0]);
        };

        assert_eq!(left.steps[0].axis, Axis::Attribute);
        assert_eq!(right, "commit-group");
    }

    #[test]
    fn predicate_functions_and_logic() {
        let paths = parse("a[not(@rel) and (contains(@href, 'x') or position() = last())]").unwrap();

        assert!(matches!(
            &paths[0].steps[0].predicates[0],
            Predicate::And(left, right)
                if matches!(**left, Predicate::Not(_)) && matches!(**right, Predicate::Or(..))
        ));
    }

    #[test]
    fn unknown_axis() {
        assert_eq!(
            parse("a/sideways::b"),
            Err(Error::UnknownAxis {
                name: "sideways".into(),
                offset: 2
            })
        );
    }

    #[test]
    fn unknown_function() {
        assert_eq!(
            parse("comment()"),
            Err(Error::UnknownFunction {
                name: "comment".into(),
                offset: 0
            })
        );
    }

    #[test]
    fn malformed_expressions() {
        assert_eq!(parse(""), Err(Error::Empty));
        assert_eq!(parse("a/"), Err(Error::UnexpectedEnd));
        assert_eq!(parse("a[1"), Err(Error::UnexpectedEnd));
        assert_eq!(
            parse("a]"),
            Err(Error::Unexpected {
                found: "]".into(),
                offset: 1
            })
        );
    }
}
