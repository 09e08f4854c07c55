//! Error types for yangschema
//!
//! This module defines all error types used throughout the library.
//! Every fallible operation returns [`Result`]; diagnostics are emitted
//! once at the point of detection and carry a schema-path breadcrumb.

use std::fmt;
use thiserror::Error;

/// Result type alias using yangschema Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for yangschema operations
#[derive(Error, Debug)]
pub enum Error {
    /// Allocation failure; always fatal to the operation
    #[error("memory error: {0}")]
    Memory(String),

    /// Malformed input in either surface form
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// Input is well-formed but violates a YANG rule
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A reference cannot be bound (import, leafref target, base identity)
    #[error("unresolved reference: {0}")]
    Unresolved(String),

    /// Shape is legal YANG but semantically rejected
    #[error("denied: {0}")]
    Denied(String),

    /// Invariant violated in the core; indicates a library bug
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The schema-path breadcrumb attached to this error, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::Validation(e) => e.path.as_deref(),
            _ => None,
        }
    }
}

/// Syntax error with source position
#[derive(Debug, Clone)]
pub struct SyntaxError {
    /// Error message
    pub message: String,
    /// Line in the source (1-based)
    pub line: usize,
    /// Column in the source (1-based)
    pub column: usize,
}

impl SyntaxError {
    /// Create a new syntax error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: 0,
            column: 0,
        }
    }

    /// Set the source position
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "{} at line {} column {}",
                self.message, self.line, self.column
            )
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for SyntaxError {}

/// YANG rule violation with schema context
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Error message
    pub message: String,
    /// Schema-path breadcrumb `/<module>:<node>/...`
    pub path: Option<String>,
    /// Offending statement or value, verbatim
    pub offending: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            offending: None,
        }
    }

    /// Set the schema path at which the rule was violated
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the offending statement or value
    pub fn with_offending(mut self, offending: impl Into<String>) -> Self {
        self.offending = Some(offending.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref offending) = self.offending {
            write!(f, " (value: '{}')", offending)?;
        }

        if let Some(ref path) = self.path {
            write!(f, " [path: {}]", path)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}
