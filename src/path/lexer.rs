//! Tokenizer for path expressions.

use alloc::{string::String, vec::Vec};
use core::fmt;

use super::Error;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Slash,
    DoubleSlash,
    Dot,
    DoubleDot,
    At,
    Pipe,
    Star,
    Comma,
    DoubleColon,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Number(f64),
    Literal(String),
    Name(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Token::Slash => "/",
            Token::DoubleSlash => "//",
            Token::Dot => ".",
            Token::DoubleDot => "..",
            Token::At => "@",
            Token::Pipe => "|",
            Token::Star => "*",
            Token::Comma => ",",
            Token::DoubleColon => "::",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Eq => "=",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Gt => ">",
            Token::GtEq => ">=",
            Token::Number(n) => return write!(f, "{n}"),
            Token::Literal(s) => return write!(f, "'{s}'"),
            Token::Name(s) => s,
        };

        f.write_str(symbol)
    }
}

/// Split an expression into tokens, each paired with its byte offset.
pub(super) fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, Error> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '/' if eat(&mut chars, '/') => Token::DoubleSlash,
            '/' => Token::Slash,
            '.' if eat(&mut chars, '.') => Token::DoubleDot,
            '.' if input[offset + 1..].starts_with(|c: char| c.is_ascii_digit()) => {
                number(input, offset, &mut chars)?
            }
            '.' => Token::Dot,
            ':' if eat(&mut chars, ':') => Token::DoubleColon,
            '@' => Token::At,
            '|' => Token::Pipe,
            '*' => Token::Star,
            ',' => Token::Comma,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            '=' => Token::Eq,
            '!' if eat(&mut chars, '=') => Token::NotEq,
            '<' if eat(&mut chars, '=') => Token::LtEq,
            '<' => Token::Lt,
            '>' if eat(&mut chars, '=') => Token::GtEq,
            '>' => Token::Gt,
            '"' | '\'' => {
                let start = offset + 1;
                let Some(len) = input[start..].find(c) else {
                    return Err(Error::UnterminatedLiteral { offset });
                };

                // Skip the literal's content and its closing quote.
                while chars.next_if(|&(i, _)| i <= start + len).is_some() {}

                Token::Literal(input[start..start + len].into())
            }
            c if c.is_ascii_digit() => number(input, offset, &mut chars)?,
            c if c.is_alphabetic() || c == '_' => {
                let mut end = offset + c.len_utf8();

                while let Some(&(i, c)) = chars.peek() {
                    let prefix = c == ':' && !input[i + 1..].starts_with(':');

                    if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') || prefix {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }

                Token::Name(input[offset..end].into())
            }
            c => Err(Error::Unexpected {
                found: c.into(),
                offset,
            })?,
        };

        tokens.push((offset, token));
    }

    Ok(tokens)
}

type Chars<'a> = core::iter::Peekable<core::str::CharIndices<'a>>;

fn eat(chars: &mut Chars<'_>, expected: char) -> bool {
    chars.next_if(|&(_, c)| c == expected).is_some()
}

fn number(
    input: &str,
    offset: usize,
    chars: &mut Chars<'_>,
) -> Result<Token, Error> {
    let mut end = offset + 1;

    while let Some((i, _)) = chars.next_if(|&(_, c)| c.is_ascii_digit() || c == '.') {
        end = i + 1;
    }

    input[offset..end]
        .parse()
        .map(Token::Number)
        .map_err(|_| Error::Unexpected {
            found: input[offset..end].into(),
            offset,
        })
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec::Vec};

    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|(_, t)| t).collect()
    }

    #[test]
    fn abbreviated_steps() {
        assert_eq!(
            kinds("//a/../@b"),
            [
                Token::DoubleSlash,
                Token::Name("a".into()),
                Token::Slash,
                Token::DoubleDot,
                Token::Slash,
                Token::At,
                Token::Name("b".into()),
            ]
        );
    }

    #[test]
    fn axes_and_prefixed_names() {
        assert_eq!(
            kinds("descendant::svg:path"),
            [
                Token::Name("descendant".into()),
                Token::DoubleColon,
                Token::Name("svg:path".into()),
            ]
        );
    }

    #[test]
    fn predicates_with_literals_and_numbers() {
        assert_eq!(
            kinds("li[@class = \"x y\"][2][. >= .5]"),
            [
                Token::Name("li".into()),
                Token::LeftBracket,
                Token::At,
                Token::Name("class".into()),
                Token::Eq,
                Token::Literal("x y".into()),
                Token::RightBracket,
                Token::LeftBracket,
                Token::Number(2.0),
                Token::RightBracket,
                Token::LeftBracket,
                Token::Dot,
                Token::GtEq,
                Token::Number(0.5),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn hyphenated_names() {
        assert_eq!(
            kinds("starts-with(data-id, 'a')")[0],
            Token::Name("starts-with".into())
        );
    }

    #[test]
    fn offsets_are_byte_positions() {
        let tokens = tokenize("a / 'é' / b").unwrap();
        let offsets: Vec<_> = tokens.iter().map(|(o, _)| *o).collect();

        assert_eq!(offsets, [0, 2, 4, 9, 11]);
    }

    #[test]
    fn unterminated_literal() {
        assert_eq!(
            tokenize("a[@b='c]"),
            Err(Error::UnterminatedLiteral { offset: 5 })
        );
    }

    #[test]
    fn unexpected_character() {
        let error = tokenize("a#b").unwrap_err();

        assert_eq!(error.to_string(), "Unexpected `#` at offset 1.");
    }
}
