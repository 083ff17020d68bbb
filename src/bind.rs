//! Declarative decoding of document nodes into typed values.
//!
//! A value taking part in decoding implements [`Decode`], which describes the
//! [`Shape`] of its slot and resolves it to a writable [`Target`]. Wrapping
//! layers (`Option`, `Box`, `Rc`, `Arc`) resolve through to the value they
//! hold, allocating it on demand. The resolved target is one of:
//!
//! - A custom hook ([`DecodeHtml`] or [`DecodeText`]), handed the node's
//!   content directly.
//! - A struct ([`Fields`]), whose fields are each bound to the nodes matched by
//!   their own path expression.
//! - A [`Scalar`], parsed from the node's text.
//! - A [`Sequence`], filled from successive nodes.
//!
//! Decoding is best effort. Recoverable failures are recorded against the
//! [`Session`] and the first one is reported once decoding completes, leaving
//! every slot that could be decoded populated.

use alloc::vec::Vec;

mod collect;
mod entry;
mod error;
mod fields;
mod resolve;
mod scalar;
mod session;

pub use collect::Sequence;
pub use entry::{decode, decode_at};
pub use error::{BoxError, Error};
pub use fields::{Binder, Fields};
pub use resolve::Parsed;
pub use scalar::Scalar;
pub use session::Session;

/// Derive [`Decode`] for a struct whose fields are bound by path expressions.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// Add the `query("expr")` attribute to each field that should be decoded,
/// where `expr` is a [path expression](crate::path) evaluated relative to the
/// struct's node. Fields without the attribute are left untouched. A field
/// matching one node is decoded from it; a field matching several must be a
/// sequence such as `Vec<T>`.
///
/// ```
/// #[derive(Debug, Default, Decode)]
/// struct Commit {
///     #[query("a/@href")]
///     url: String,
///     #[query("span[@class='sha']")]
///     sha: String,
///     #[query("ul/li")]
///     tags: Vec<String>,
///     cached: bool,
/// }
/// ```
///
/// To decode a type with a custom hook, add `decode(html)` or `decode(text)`
/// to the type and implement [`DecodeHtml`] or [`DecodeText`] respectively.
///
/// ```
/// #[derive(Debug, Default, Decode)]
/// #[decode(text)]
/// struct Words(Vec<String>);
///
/// impl DecodeText for Words {
///     fn decode_text(&mut self, text: &str) -> Result<(), BoxError> {
///         self.0 = text.split_whitespace().map(String::from).collect();
///         Ok(())
///     }
/// }
/// ```
#[cfg(feature = "derive")]
pub use pluck_derive::Decode;

/// A slot values can be decoded into.
///
/// See the [`Decode`](macro@Decode) derive macro for an implementation on
/// structs and hook types.
pub trait Decode {
    /// The shape [`target`](Decode::target) will resolve to, without
    /// allocating any layers.
    fn shape(&self) -> Shape;

    /// Resolve to a writable target, allocating unset layers.
    fn target(&mut self) -> Target<'_>;

    /// Name of the type reported in errors.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    #[doc(hidden)]
    fn vec_shape() -> Shape
    where
        Self: Sized,
    {
        Shape::Sequence
    }

    #[doc(hidden)]
    fn vec_target(vec: &mut Vec<Self>) -> Target<'_>
    where
        Self: Sized + Default,
    {
        Target::Sequence(vec)
    }
}

/// The kind of [`Target`] a slot resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Hook,
    Struct,
    Scalar,
    Sequence,
    /// Cannot be written to. Skipped when bound to a field.
    ReadOnly,
    /// Not decodable. Always skipped.
    Unsupported,
}

/// A resolved, writable slot.
pub enum Target<'a> {
    Html(&'a mut dyn DecodeHtml),
    Text(&'a mut dyn DecodeText),
    Struct(&'a mut dyn Fields),
    Scalar(Scalar<'a>),
    Sequence(&'a mut dyn Sequence),
    ReadOnly,
    Unsupported,
}

impl Target<'_> {
    pub fn shape(&self) -> Shape {
        match self {
            Target::Html(_) | Target::Text(_) => Shape::Hook,
            Target::Struct(_) => Shape::Struct,
            Target::Scalar(_) => Shape::Scalar,
            Target::Sequence(_) => Shape::Sequence,
            Target::ReadOnly => Shape::ReadOnly,
            Target::Unsupported => Shape::Unsupported,
        }
    }
}

/// Decode from a node's source markup.
///
/// Takes precedence over [`DecodeText`] for types implementing both.
pub trait DecodeHtml {
    fn decode_html(&mut self, raw: &[u8]) -> Result<(), BoxError>;
}

/// Decode from a node's text rendering.
pub trait DecodeText {
    fn decode_text(&mut self, text: &str) -> Result<(), BoxError>;
}
