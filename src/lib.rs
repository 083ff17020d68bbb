#![no_std]

//! Declarative decoding of HTML and XML documents into typed Rust values.
//!
//! Pluck populates ordinary Rust structures by running a path expression per
//! field against a parsed document, converting whatever the expression
//! matches into the field's type. Decoding is best-effort: a field that fails
//! to decode is recorded and left untouched while its siblings continue.
//!
//! Most users should begin with the [`Decode`](macro@bind::Decode) derive
//! macro and the entry points in the [`bind`] module. Documents are parsed
//! with the [`tree`] module, and path expressions are compiled and evaluated
//! by the [`path`] module.
//!
//! ```
//! #[derive(Debug, Default, Decode)]
//! struct Greeting {
//!     #[query("div")]
//!     greeting: String,
//!     #[query("span")]
//!     name: String,
//! }
//!
//! let document = Document::parse_html("<test><div>Hello</div><span>World</span></test>");
//! let mut greeting = Greeting::default();
//! document.decode_at("/test", &mut greeting)?;
//! ```
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable reader-based document parsing (default).

extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

// Lets derive output name `::pluck` from inside this crate's own tests.
extern crate self as pluck;

pub mod bind;
pub mod path;
pub mod tree;

pub use bind::{Decode, Error, decode, decode_at};
pub use tree::{Document, Node};
