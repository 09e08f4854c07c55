//! Schema printers
//!
//! The parsed tree is lowered back to the generic statement tree once, and
//! each surface form has a small emitter over statements. Printing a parsed
//! module and re-parsing the output yields an equal statement tree.

mod lower;
pub mod yang;
pub mod yin;

pub use lower::module_to_statement;

/// Print a parsed module in the compact form
pub fn print_yang(module: &crate::schema::parsed::Module) -> String {
    yang::print_statement(&module_to_statement(module))
}

/// Print a parsed module in the XML form
pub fn print_yin(module: &crate::schema::parsed::Module) -> String {
    yin::print_statement(&module_to_statement(module))
}
