//! # yangschema
//!
//! A Rust implementation of a YANG (RFC 7950) schema compiler: it parses
//! modules in both surface syntaxes (the native compact form and the
//! XML-encoded form), compiles them into a fully resolved in-memory
//! schema, and types data values against the compiled schema.
//!
//! ## Pipeline
//!
//! - **Parse**: bytes are tokenized ([`lexer`] / [`documents`]), dispatched
//!   ([`keywords`]), and built into a parsed tree ([`parser`], rooted at a
//!   [`schema::parsed::Module`]). The parsed tree is faithful and
//!   lexically resolved, but not checked against other modules.
//! - **Compile**: a [`context::Context`] holds the parsed modules; the
//!   compiler resolves imports and includes, flattens typedef chains,
//!   composes restrictions, links identities and leafrefs, expands
//!   groupings and augments, and freezes a
//!   [`schema::compiled::CompiledModule`].
//! - **Type values**: the compiled types expose `store` / `print` /
//!   `duplicate` / `compare` for data-instance decoders ([`types`]).
//!
//! ## Example
//!
//! ```rust,ignore
//! use yangschema::Context;
//!
//! let mut ctx = Context::new();
//! ctx.parse_module(source, yangschema::SchemaFormat::Yang)?;
//! let compiled = ctx.compile_module("example")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod documents;
pub mod error;
pub mod keywords;
pub mod lexer;
pub mod names;
pub mod namespaces;
pub mod parser;
pub mod printer;
pub mod schema;
pub mod types;

pub use context::{Context, SchemaFormat};
pub use error::{Error, Result};
pub use keywords::YIN_NAMESPACE;

/// Version of the yangschema library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
