//! Typed-value engine
//!
//! The closed set of YANG built-in types, the compiled type descriptor
//! the schema compiler produces for every terminal node, and the typed
//! values the engine stores and prints. The only open extension point is
//! the custom-type registrar on the Context.

pub mod restriction;
pub mod value;

use crate::error::Result;
use restriction::IntervalSet;
use std::fmt;
use std::sync::Arc;

pub use value::{IdentityResolver, NoIdentities, Value};

/// The fixed set of YANG built-in types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BuiltinType {
    Binary,
    Bits,
    Boolean,
    Decimal64,
    Empty,
    Enumeration,
    Identityref,
    InstanceIdentifier,
    Int8,
    Int16,
    Int32,
    Int64,
    Leafref,
    String,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Union,
}

impl BuiltinType {
    /// Look up a built-in type by name
    pub fn from_name(name: &str) -> Option<BuiltinType> {
        use BuiltinType::*;
        Some(match name {
            "binary" => Binary,
            "bits" => Bits,
            "boolean" => Boolean,
            "decimal64" => Decimal64,
            "empty" => Empty,
            "enumeration" => Enumeration,
            "identityref" => Identityref,
            "instance-identifier" => InstanceIdentifier,
            "int8" => Int8,
            "int16" => Int16,
            "int32" => Int32,
            "int64" => Int64,
            "leafref" => Leafref,
            "string" => String,
            "uint8" => Uint8,
            "uint16" => Uint16,
            "uint32" => Uint32,
            "uint64" => Uint64,
            "union" => Union,
            _ => return None,
        })
    }

    /// The type name as written in schemas
    pub fn name(&self) -> &'static str {
        use BuiltinType::*;
        match self {
            Binary => "binary",
            Bits => "bits",
            Boolean => "boolean",
            Decimal64 => "decimal64",
            Empty => "empty",
            Enumeration => "enumeration",
            Identityref => "identityref",
            InstanceIdentifier => "instance-identifier",
            Int8 => "int8",
            Int16 => "int16",
            Int32 => "int32",
            Int64 => "int64",
            Leafref => "leafref",
            String => "string",
            Uint8 => "uint8",
            Uint16 => "uint16",
            Uint32 => "uint32",
            Uint64 => "uint64",
            Union => "union",
        }
    }

    /// Whether this is one of the eight integer types
    pub fn is_integer(&self) -> bool {
        use BuiltinType::*;
        matches!(
            self,
            Int8 | Int16 | Int32 | Int64 | Uint8 | Uint16 | Uint32 | Uint64
        )
    }

    /// Natural bounds of an integer type; `None` for other types
    pub fn integer_bounds(&self) -> Option<(i128, i128)> {
        use BuiltinType::*;
        let (signed, bits) = match self {
            Int8 => (true, 8),
            Int16 => (true, 16),
            Int32 => (true, 32),
            Int64 => (true, 64),
            Uint8 => (false, 8),
            Uint16 => (false, 16),
            Uint32 => (false, 32),
            Uint64 => (false, 64),
            _ => return None,
        };
        Some(restriction::integer_bounds(signed, bits))
    }

    /// Whether `range` applies to this type
    pub fn has_range(&self) -> bool {
        self.is_integer() || *self == BuiltinType::Decimal64
    }

    /// Whether `length` applies to this type
    pub fn has_length(&self) -> bool {
        matches!(self, BuiltinType::String | BuiltinType::Binary)
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A compiled pattern restriction
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// The pattern text as written in the schema
    pub expr: String,
    /// Whether the match is inverted
    pub invert_match: bool,
    /// The compiled, anchored regular expression
    pub regex: regex::Regex,
    /// `error-message` override
    pub error_message: Option<String>,
    /// `error-app-tag` override
    pub error_app_tag: Option<String>,
}

impl CompiledPattern {
    /// Compile a pattern, anchoring it the way schema patterns match
    /// (the whole value, not a substring).
    pub fn compile(expr: &str, invert_match: bool) -> Result<Self> {
        let regex = regex::Regex::new(&format!("^(?:{})$", expr)).map_err(|e| {
            crate::error::Error::Validation(
                crate::error::ValidationError::new(format!("invalid pattern: {}", e))
                    .with_offending(expr),
            )
        })?;
        Ok(Self {
            expr: expr.to_string(),
            invert_match,
            regex,
            error_message: None,
            error_app_tag: None,
        })
    }

    /// Whether a value satisfies this pattern
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value) != self.invert_match
    }
}

/// One member of a compiled enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledEnum {
    /// Member name
    pub name: String,
    /// Assigned value
    pub value: i32,
}

/// One member of a compiled bits type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledBit {
    /// Member name
    pub name: String,
    /// Assigned position
    pub position: u32,
}

/// Callbacks a custom type supplies to the Context registrar
pub struct CustomTypeCallbacks {
    /// Validate a lexical value and return its canonical form
    pub store: Box<dyn Fn(&str) -> Result<String> + Send + Sync>,
}

impl fmt::Debug for CustomTypeCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomTypeCallbacks").finish_non_exhaustive()
    }
}

/// A registered custom type bound into a compiled type
#[derive(Debug, Clone)]
pub struct CustomTypeHook {
    /// The type name the registrar matched
    pub name: String,
    /// The supplied callbacks
    pub callbacks: Arc<CustomTypeCallbacks>,
}

/// A fully resolved type: the built-in root of a typedef chain with the
/// composed restrictions of the whole derivation.
#[derive(Debug, Clone, Default)]
pub struct CompiledType {
    /// The built-in root of the derivation chain
    pub base: BuiltinType,
    /// Composed range set (integers, decimal64)
    pub range: Option<IntervalSet>,
    /// `error-message` override of the innermost range restriction
    pub range_error_message: Option<String>,
    /// Composed length set (string, binary)
    pub length: Option<IntervalSet>,
    /// `error-message` override of the innermost length restriction
    pub length_error_message: Option<String>,
    /// Accumulated patterns along the chain, all checked
    pub patterns: Vec<CompiledPattern>,
    /// Fraction digits (decimal64); fixed along the whole chain
    pub fraction_digits: u8,
    /// Canonical enum member set
    pub enums: Vec<CompiledEnum>,
    /// Canonical bit member set, ascending position
    pub bits: Vec<CompiledBit>,
    /// Leafref path as written
    pub path: Option<String>,
    /// The leafref referent's compiled type
    pub realtype: Option<Box<CompiledType>>,
    /// `require-instance`; defaults to true
    pub require_instance: bool,
    /// Resolved base identities for identityref, as `(module, name)` keys
    pub bases: Vec<(String, String)>,
    /// Union member types, in declaration order
    pub members: Vec<CompiledType>,
    /// Custom-type hook when the chain roots in a registered custom type
    pub custom: Option<CustomTypeHook>,
}

impl Default for BuiltinType {
    fn default() -> Self {
        BuiltinType::String
    }
}

impl CompiledType {
    /// A bare compiled built-in with no restrictions
    pub fn plain(base: BuiltinType) -> Self {
        Self {
            base,
            require_instance: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(BuiltinType::from_name("int8"), Some(BuiltinType::Int8));
        assert_eq!(
            BuiltinType::from_name("instance-identifier"),
            Some(BuiltinType::InstanceIdentifier)
        );
        assert_eq!(BuiltinType::from_name("int128"), None);

        for name in [
            "binary",
            "bits",
            "boolean",
            "decimal64",
            "empty",
            "enumeration",
            "identityref",
            "instance-identifier",
            "int8",
            "int16",
            "int32",
            "int64",
            "leafref",
            "string",
            "uint8",
            "uint16",
            "uint32",
            "uint64",
            "union",
        ] {
            let ty = BuiltinType::from_name(name).unwrap();
            assert_eq!(ty.name(), name);
        }
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(BuiltinType::Int8.integer_bounds(), Some((-128, 127)));
        assert_eq!(BuiltinType::Uint16.integer_bounds(), Some((0, 65535)));
        assert_eq!(BuiltinType::String.integer_bounds(), None);
    }

    #[test]
    fn test_pattern_anchoring() {
        let pattern = CompiledPattern::compile("[a-z]+", false).unwrap();
        assert!(pattern.matches("abc"));
        assert!(!pattern.matches("abc1"));
        assert!(!pattern.matches("1abc"));
    }

    #[test]
    fn test_pattern_invert_match() {
        let pattern = CompiledPattern::compile("[xX][mM][lL].*", true).unwrap();
        assert!(pattern.matches("document"));
        assert!(!pattern.matches("xml-root"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(CompiledPattern::compile("(unclosed", false).is_err());
    }
}
