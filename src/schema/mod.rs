//! Schema trees
//!
//! The parsed tree is the faithful, lexically-resolved representation of a
//! module; the compiled tree is the fully resolved schema produced by the
//! compiler from a parsed main module and its imports/includes.

pub mod compiled;
pub mod compiler;
pub mod features;
pub mod identities;
pub mod parsed;

pub use compiled::{CompiledModule, CompiledNode, NodeId};
pub use compiler::compile;
pub use parsed::Module;
