use alloc::{boxed::Box, string::String, vec::Vec};
use core::{
    any::{Any, type_name},
    num::{IntErrorKind, ParseFloatError, ParseIntError},
    str::FromStr,
};

use super::{Decode, Error, Shape, Target};
use crate::tree::Node;

/// A slot for a value parsed from a single node.
#[derive(Debug)]
pub enum Scalar<'a> {
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    I128(&'a mut i128),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    U128(&'a mut u128),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    /// The node's text rendering, verbatim.
    String(&'a mut String),
    /// The node's source markup. Entities and nested tags are kept, unlike
    /// the text rendering given to `String` and `Runes`.
    Bytes(&'a mut Vec<u8>),
    /// The characters of the node's text rendering.
    Runes(&'a mut Vec<char>),
    /// The node's source markup as a `Vec<u8>`.
    Any(&'a mut Box<dyn Any>),
}

impl Scalar<'_> {
    /// Write the value of `node` into the slot.
    ///
    /// Numbers are parsed from the trimmed text rendering. On failure the slot
    /// is left unmodified.
    pub fn materialize(self, node: Node<'_>) -> Result<(), Error> {
        match self {
            Scalar::I8(slot) => integer(slot, &node.text()),
            Scalar::I16(slot) => integer(slot, &node.text()),
            Scalar::I32(slot) => integer(slot, &node.text()),
            Scalar::I64(slot) => integer(slot, &node.text()),
            Scalar::I128(slot) => integer(slot, &node.text()),
            Scalar::Isize(slot) => integer(slot, &node.text()),
            Scalar::U8(slot) => integer(slot, &node.text()),
            Scalar::U16(slot) => integer(slot, &node.text()),
            Scalar::U32(slot) => integer(slot, &node.text()),
            Scalar::U64(slot) => integer(slot, &node.text()),
            Scalar::U128(slot) => integer(slot, &node.text()),
            Scalar::Usize(slot) => integer(slot, &node.text()),
            Scalar::F32(slot) => float(slot, &node.text()),
            Scalar::F64(slot) => float(slot, &node.text()),
            Scalar::String(slot) => {
                *slot = node.text().into_owned();
                Ok(())
            }
            Scalar::Bytes(slot) => {
                *slot = node.raw().to_vec();
                Ok(())
            }
            Scalar::Runes(slot) => {
                *slot = node.text().chars().collect();
                Ok(())
            }
            Scalar::Any(slot) => {
                *slot = Box::new(node.raw().to_vec());
                Ok(())
            }
        }
    }
}

fn integer<T>(slot: &mut T, text: &str) -> Result<(), Error>
where
    T: FromStr<Err = ParseIntError>,
{
    let value = text.trim();

    *slot = value.parse().map_err(|source: ParseIntError| match source.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Error::Overflow {
            value: value.into(),
            target: type_name::<T>(),
        },
        _ => Error::Integer {
            value: value.into(),
            target: type_name::<T>(),
            source,
        },
    })?;

    Ok(())
}

trait Float: FromStr<Err = ParseFloatError> {
    fn is_infinite(&self) -> bool;
}

impl Float for f32 {
    fn is_infinite(&self) -> bool {
        f32::is_infinite(*self)
    }
}

impl Float for f64 {
    fn is_infinite(&self) -> bool {
        f64::is_infinite(*self)
    }
}

fn float<T: Float>(slot: &mut T, text: &str) -> Result<(), Error> {
    let value = text.trim();

    let parsed: T = value.parse().map_err(|source| Error::Float {
        value: value.into(),
        target: type_name::<T>(),
        source,
    })?;

    // Out of range literals parse to infinity.
    let literal = value.trim_start_matches(['+', '-']);
    let infinite = literal.eq_ignore_ascii_case("inf") || literal.eq_ignore_ascii_case("infinity");

    if parsed.is_infinite() && !infinite {
        Err(Error::Overflow {
            value: value.into(),
            target: type_name::<T>(),
        })?
    }

    *slot = parsed;

    Ok(())
}

macro_rules! scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Decode for $ty {
                fn shape(&self) -> Shape {
                    Shape::Scalar
                }

                fn target(&mut self) -> Target<'_> {
                    Target::Scalar(Scalar::$variant(self))
                }
            }
        )*
    };
}

scalar! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
    Box<dyn Any> => Any,
}

impl Decode for u8 {
    fn shape(&self) -> Shape {
        Shape::Scalar
    }

    fn target(&mut self) -> Target<'_> {
        Target::Scalar(Scalar::U8(self))
    }

    fn vec_shape() -> Shape {
        Shape::Scalar
    }

    // `Vec<u8>` holds source markup rather than a sequence of numbers.
    fn vec_target(vec: &mut Vec<u8>) -> Target<'_> {
        Target::Scalar(Scalar::Bytes(vec))
    }
}

impl Decode for char {
    fn shape(&self) -> Shape {
        Shape::Unsupported
    }

    fn target(&mut self) -> Target<'_> {
        Target::Unsupported
    }

    fn vec_shape() -> Shape {
        Shape::Scalar
    }

    fn vec_target(vec: &mut Vec<char>) -> Target<'_> {
        Target::Scalar(Scalar::Runes(vec))
    }
}
