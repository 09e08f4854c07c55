//! Statement parsing
//!
//! Both surface forms are first read into a generic statement tree
//! ([`stmt::Statement`]), then a single builder pass turns statements into
//! the typed parsed schema tree while enforcing per-keyword sub-statement
//! rules.

pub mod build;
pub mod stmt;
pub mod tables;
pub mod yang;
pub mod yin;

pub use build::build_module;
pub use stmt::Statement;
