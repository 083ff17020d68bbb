use alloc::{boxed::Box, string::String};
use core::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::path;

/// Error type returned by custom decode hooks.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Errors occurring while decoding.
///
/// Only [`NoMatch`](Error::NoMatch), [`InvalidTarget`](Error::InvalidTarget)
/// and (at [`decode_at`](super::decode_at)) [`Path`](Error::Path) abort a
/// decode. The rest are recorded against a single slot while decoding
/// continues, and the first of them is reported.
#[derive(Debug, Error)]
pub enum Error {
    /// No nodes match the sub-root expression.
    #[error("No nodes match `{path}`.")]
    NoMatch { path: String },
    /// Value is incompatible with the target type.
    #[error("Cannot decode {value} into `{target}`.")]
    Type { value: String, target: &'static str },
    /// Numeric value is out of range for the target type.
    #[error("Value `{value}` overflows `{target}`.")]
    Overflow { value: String, target: &'static str },
    /// Text is not a valid integer.
    #[error("Cannot parse `{value}` as `{target}`: {source}.")]
    Integer {
        value: String,
        target: &'static str,
        #[source]
        source: ParseIntError,
    },
    /// Text is not a valid floating point number.
    #[error("Cannot parse `{value}` as `{target}`: {source}.")]
    Float {
        value: String,
        target: &'static str,
        #[source]
        source: ParseFloatError,
    },
    /// Target cannot be written to.
    #[error("Cannot decode into `{target}`, it is not writable.")]
    InvalidTarget { target: &'static str },
    /// Path expression failed to compile.
    #[error("Invalid path expression `{path}`: {source}")]
    Path {
        path: String,
        #[source]
        source: path::Error,
    },
    /// A custom decode hook failed.
    #[error("Custom decoding of `{target}` failed: {source}")]
    Custom {
        target: &'static str,
        #[source]
        source: BoxError,
    },
}
