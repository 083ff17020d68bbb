#![cfg(feature = "std")]

use std::any::Any;

use pluck::{
    Document, Error,
    bind::{BoxError, Decode, DecodeText, Parsed, Shape, Target},
    tree::Syntax,
};
use proptest::prelude::*;

fn decode_at(source: &str, path: &str, target: &mut dyn Decode) -> Result<(), Error> {
    Document::parse_html(source).decode_at(path, target)
}

#[test]
fn signed_integer() {
    let mut value = 0i64;
    decode_at("<test>-555</test>", "/test", &mut value).unwrap();
    assert_eq!(value, -555);
}

#[test]
fn unsigned_integer() {
    let mut value = 0u32;
    decode_at("<test>444</test>", "/test", &mut value).unwrap();
    assert_eq!(value, 444);
}

#[test]
fn runes() {
    let mut value: Vec<char> = Vec::new();
    decode_at("<test>林原め</test>", "/test", &mut value).unwrap();
    assert_eq!(value, "林原め".chars().collect::<Vec<_>>());
}

#[test]
fn string() {
    let mut value = String::new();
    decode_at("<test>Hello World</test>", "/test", &mut value).unwrap();
    assert_eq!(value, "Hello World");
}

#[test]
fn string_of_nested_markup() {
    let mut value = String::new();
    decode_at("<test><inner>Hello</inner> World</test>", "/test", &mut value).unwrap();
    assert_eq!(value, "Hello World");
}

#[test]
fn bytes() {
    let mut value: Vec<u8> = Vec::new();
    decode_at("<test>Hello World</test>", "/test", &mut value).unwrap();
    assert_eq!(value, b"Hello World");
}

#[test]
fn integer_sequence() {
    let mut value: Vec<i32> = Vec::new();
    decode_at("<ul><li>0</li><li>1</li><li>2</li></ul>", "/ul/li", &mut value).unwrap();
    assert_eq!(value, [0, 1, 2]);
}

#[test]
fn untyped_receives_bytes() {
    let mut value: Box<dyn Any> = Box::new(0u8);
    decode_at("<test>Hello <b>World</b></test>", "/test", &mut value).unwrap();
    assert_eq!(
        value.downcast_ref::<Vec<u8>>().map(Vec::as_slice),
        Some(&b"Hello <b>World</b>"[..])
    );
}

#[test]
fn no_match_reports_the_path() {
    let mut value = 0u8;
    let error = decode_at("<test>1</test>", "/nothing", &mut value).unwrap_err();

    assert_eq!(error.to_string(), "No nodes match `/nothing`.");
    assert_eq!(value, 0);
}

#[test]
fn xml_documents() {
    let document = Document::parse_xml("<Feed><Entry id='1'/><Entry id='22'/></Feed>").unwrap();
    let mut ids: Vec<u16> = Vec::new();

    document.decode_at("/Feed/Entry/@id", &mut ids).unwrap();

    assert_eq!(ids, [1, 22]);
}

#[test]
fn reader_documents() {
    let mut reader = std::io::Cursor::new(b"<p>1.5</p><p>-2.25e1</p>".to_vec());
    let document = Document::from_reader(&mut reader, Syntax::Html).unwrap();
    let mut values: Vec<f32> = Vec::new();

    document.decode_at("//p", &mut values).unwrap();

    assert_eq!(values, [1.5, -22.5]);
}

#[test]
fn dynamic_targets() {
    let mut targets: Vec<Box<dyn Decode>> = vec![
        Box::new(0u16),
        Box::new(String::new()),
        Box::new(Some(Parsed(0.0f64))),
    ];

    for target in &mut targets {
        decode_at("<test> 42 </test>", "/test", target).unwrap();
    }

    assert_eq!(targets[0].shape(), Shape::Scalar);
    assert_eq!(targets[2].shape(), Shape::Hook);
}

#[derive(Debug, Default, PartialEq)]
struct Csv(Vec<String>);

impl DecodeText for Csv {
    fn decode_text(&mut self, text: &str) -> Result<(), BoxError> {
        if text.trim().is_empty() {
            Err("no values")?
        }

        self.0 = text.split(',').map(|s| s.trim().to_string()).collect();
        Ok(())
    }
}

impl Decode for Csv {
    fn shape(&self) -> Shape {
        Shape::Hook
    }

    fn target(&mut self) -> Target<'_> {
        Target::Text(self)
    }
}

#[test]
fn text_hook_uses_the_first_match_only() {
    let mut value = Csv::default();

    decode_at("<p>a, b</p><p>c</p>", "p", &mut value).unwrap();

    assert_eq!(value, Csv(vec!["a".into(), "b".into()]));
}

#[test]
fn hook_failures_are_reported() {
    let mut value = Csv(vec!["kept".into()]);
    let error = decode_at("<p> </p>", "p", &mut value).unwrap_err();

    assert!(matches!(error, Error::Custom { .. }));
    assert_eq!(value, Csv(vec!["kept".into()]));
}

#[test]
fn repeated_decodes_are_identical() {
    let document = Document::parse_html("<li>1</li><li>2x</li><li>3</li>");

    let decode = || {
        let mut values: Vec<Option<i8>> = Vec::new();
        let error = document.decode_at("li", &mut values).err().map(|e| e.to_string());
        (values, error)
    };

    let first = decode();

    assert_eq!(first, decode());
    assert_eq!(first.0, [Some(1), Some(0), Some(3)]);
}

proptest! {
    #[test]
    fn integers_of_every_width(n: i8, m: u64) {
        let source = format!("<a> {n} </a><b>\n{m}\n</b>");

        let mut a = [0i8; 1];
        let mut b: Option<u64> = None;
        decode_at(&source, "/a", &mut a).unwrap();
        decode_at(&source, "/b", &mut b).unwrap();

        prop_assert_eq!(a, [n]);
        prop_assert_eq!(b, Some(m));
    }

    #[test]
    fn overflow_keeps_the_default(n in 65_536u32..) {
        let mut value = 0u16;
        let result = decode_at(&format!("<n>{n}</n>"), "n", &mut value);

        prop_assert!(matches!(result, Err(Error::Overflow { .. })), "{:?}", result);
        prop_assert_eq!(value, 0);
    }

    #[test]
    fn sequences_preserve_length_and_order(values in prop::collection::vec(any::<u32>(), 0..20)) {
        let source: String = values.iter().map(|v| format!("<li>{v}</li>")).collect();
        let mut decoded: Vec<u32> = Vec::new();

        let result = decode_at(&format!("<ul>{source}</ul>"), "/ul/li", &mut decoded);

        if values.is_empty() {
            prop_assert!(matches!(result, Err(Error::NoMatch { .. })), "{:?}", result);
        } else {
            prop_assert!(result.is_ok());
        }

        prop_assert_eq!(decoded, values);
    }
}
