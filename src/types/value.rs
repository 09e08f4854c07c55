//! Typed values: store, print, duplicate, compare
//!
//! Every compiled type exposes the four capabilities the data-instance
//! decoders call into: `store` canonicalizes and validates a lexical
//! value, `print` writes the canonical form, `duplicate` deep-copies,
//! and `compare` tests equality.

use crate::error::{Error, Result, ValidationError};
use crate::types::restriction;
use crate::types::{BuiltinType, CompiledBit, CompiledType};
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine};
use once_cell::sync::Lazy;
use regex::Regex;

/// Base64 decoder: standard alphabet, padding optional
static BASE64_DECODER: Lazy<GeneralPurpose> = Lazy::new(|| {
    GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
    )
});

/// Instance-identifier shape: an absolute path of qualified steps with
/// optional bracketed predicates. Existence is an instance-time check.
static INSTANCE_ID_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(/[A-Za-z_][A-Za-z0-9_.-]*(:[A-Za-z_][A-Za-z0-9_.-]*)?(\[[^\]]+\])*)+$",
    )
    .unwrap()
});

/// Resolution surface `store` needs for identityref values.
///
/// Implemented by the Context; decoders for schemas without identityrefs
/// can pass [`NoIdentities`].
pub trait IdentityResolver {
    /// Resolve `(prefix:)?name` text to the `(module, name)` key of an
    /// existing identity
    fn resolve(&self, text: &str) -> Option<(String, String)>;

    /// Whether `identity` is `base` or transitively derived from it
    fn derived_from_or_self(&self, identity: &(String, String), base: &(String, String)) -> bool;
}

/// A resolver that knows no identities
pub struct NoIdentities;

impl IdentityResolver for NoIdentities {
    fn resolve(&self, _text: &str) -> Option<(String, String)> {
        None
    }

    fn derived_from_or_self(
        &self,
        _identity: &(String, String),
        _base: &(String, String),
    ) -> bool {
        false
    }
}

/// A typed value produced by `store`
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `int8`
    Int8(i8),
    /// `int16`
    Int16(i16),
    /// `int32`
    Int32(i32),
    /// `int64`
    Int64(i64),
    /// `uint8`
    Uint8(u8),
    /// `uint16`
    Uint16(u16),
    /// `uint32`
    Uint32(u32),
    /// `uint64`
    Uint64(u64),
    /// `decimal64`: the scaled integer and its fraction-digits
    Decimal64 {
        /// Value scaled by `10^fraction_digits`
        scaled: i64,
        /// Fraction digits of the type
        fraction_digits: u8,
    },
    /// `boolean`
    Boolean(bool),
    /// `empty`: no payload
    Empty,
    /// `binary`: the decoded octets
    Binary(Vec<u8>),
    /// `string`
    String(String),
    /// `bits`: set members in ascending position order
    Bits(Vec<CompiledBit>),
    /// `enumeration`: the member name and its value
    Enum {
        /// Member name
        name: String,
        /// Assigned value
        value: i32,
    },
    /// `identityref`: the resolved identity key
    Identityref {
        /// Defining module
        module: String,
        /// Identity name
        name: String,
    },
    /// `instance-identifier`: the path text, shape-checked
    InstanceIdentifier(String),
    /// `union`: the winning member index and its value
    Union {
        /// Index of the member that stored the value
        member: usize,
        /// The member-typed value
        value: Box<Value>,
    },
    /// A custom-type value in its canonical form
    Custom {
        /// Registered type name
        type_name: String,
        /// Canonical text
        canonical: String,
    },
}

impl CompiledType {
    /// Parse and validate a lexical value, producing its typed form
    pub fn store(&self, text: &str, identities: &dyn IdentityResolver) -> Result<Value> {
        if let Some(custom) = &self.custom {
            let canonical = (custom.callbacks.store)(text)?;
            return Ok(Value::Custom {
                type_name: custom.name.clone(),
                canonical,
            });
        }

        match self.base {
            BuiltinType::Int8
            | BuiltinType::Int16
            | BuiltinType::Int32
            | BuiltinType::Int64
            | BuiltinType::Uint8
            | BuiltinType::Uint16
            | BuiltinType::Uint32
            | BuiltinType::Uint64 => self.store_integer(text),
            BuiltinType::Decimal64 => self.store_decimal64(text),
            BuiltinType::Boolean => match text {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(self.bad_value(text, "is not a valid boolean")),
            },
            BuiltinType::Empty => {
                if text.is_empty() {
                    Ok(Value::Empty)
                } else {
                    Err(self.bad_value(text, "is not a valid empty value"))
                }
            }
            BuiltinType::Binary => self.store_binary(text),
            BuiltinType::String => self.store_string(text),
            BuiltinType::Bits => self.store_bits(text),
            BuiltinType::Enumeration => self.store_enum(text),
            BuiltinType::Identityref => self.store_identityref(text, identities),
            BuiltinType::InstanceIdentifier => {
                if INSTANCE_ID_SHAPE.is_match(text) {
                    Ok(Value::InstanceIdentifier(text.to_string()))
                } else {
                    Err(self.bad_value(text, "is not a valid instance-identifier"))
                }
            }
            BuiltinType::Leafref => {
                let realtype = self.realtype.as_deref().ok_or_else(|| {
                    Error::Internal("leafref type compiled without a referent".into())
                })?;
                realtype.store(text, identities)
            }
            BuiltinType::Union => {
                for (member, member_type) in self.members.iter().enumerate() {
                    if let Ok(value) = member_type.store(text, identities) {
                        return Ok(Value::Union {
                            member,
                            value: Box::new(value),
                        });
                    }
                }
                Err(self.bad_value(text, "does not match any member of the union"))
            }
        }
    }

    /// Write the canonical textual form of a stored value
    pub fn print(&self, value: &Value) -> String {
        match value {
            Value::Int8(v) => v.to_string(),
            Value::Int16(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Uint8(v) => v.to_string(),
            Value::Uint16(v) => v.to_string(),
            Value::Uint32(v) => v.to_string(),
            Value::Uint64(v) => v.to_string(),
            Value::Decimal64 {
                scaled,
                fraction_digits,
            } => print_decimal64(*scaled, *fraction_digits),
            Value::Boolean(v) => if *v { "true" } else { "false" }.to_string(),
            Value::Empty => String::new(),
            Value::Binary(bytes) => base64::engine::general_purpose::STANDARD.encode(bytes),
            Value::String(s) => s.clone(),
            Value::Bits(bits) => bits
                .iter()
                .map(|b| b.name.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            Value::Enum { name, .. } => name.clone(),
            Value::Identityref { module, name } => format!("{}:{}", module, name),
            Value::InstanceIdentifier(path) => path.clone(),
            Value::Union { member, value } => match self.members.get(*member) {
                Some(member_type) => member_type.print(value),
                None => String::new(),
            },
            Value::Custom { canonical, .. } => canonical.clone(),
        }
    }

    /// Deep-copy a stored value
    pub fn duplicate(&self, value: &Value) -> Value {
        value.clone()
    }

    /// Compare two stored values for equality
    pub fn compare(&self, a: &Value, b: &Value) -> bool {
        a == b
    }

    fn bad_value(&self, text: &str, detail: &str) -> Error {
        Error::Validation(
            ValidationError::new(format!("value '{}' {}", text, detail)).with_offending(text),
        )
    }

    fn out_of_bounds(&self, text: &str) -> Error {
        Error::Validation(
            ValidationError::new(format!(
                "value '{}' is out of {}'s min/max bounds",
                text,
                self.base.name()
            ))
            .with_offending(text),
        )
    }

    fn range_violation(&self, text: &str) -> Error {
        let message = match &self.range_error_message {
            Some(message) => message.clone(),
            None => format!("value '{}' does not satisfy the range constraint", text),
        };
        Error::Validation(ValidationError::new(message).with_offending(text))
    }

    fn store_integer(&self, text: &str) -> Result<Value> {
        let parsed = parse_integer_text(text)
            .ok_or_else(|| self.bad_value(text, "is not a valid integer"))?;

        let (lo, hi) = self.base.integer_bounds().unwrap();
        if parsed < lo || parsed > hi {
            return Err(self.out_of_bounds(text));
        }
        if let Some(range) = &self.range {
            if !range.contains(parsed) {
                return Err(self.range_violation(text));
            }
        }

        Ok(match self.base {
            BuiltinType::Int8 => Value::Int8(parsed as i8),
            BuiltinType::Int16 => Value::Int16(parsed as i16),
            BuiltinType::Int32 => Value::Int32(parsed as i32),
            BuiltinType::Int64 => Value::Int64(parsed as i64),
            BuiltinType::Uint8 => Value::Uint8(parsed as u8),
            BuiltinType::Uint16 => Value::Uint16(parsed as u16),
            BuiltinType::Uint32 => Value::Uint32(parsed as u32),
            BuiltinType::Uint64 => Value::Uint64(parsed as u64),
            _ => unreachable!(),
        })
    }

    fn store_decimal64(&self, text: &str) -> Result<Value> {
        let scaled = restriction::parse_scaled_decimal(text, self.fraction_digits)
            .ok_or_else(|| self.bad_value(text, "is not a valid decimal64 value"))?;

        let (lo, hi) = restriction::decimal64_bounds();
        if scaled < lo || scaled > hi {
            return Err(self.out_of_bounds(text));
        }
        if let Some(range) = &self.range {
            if !range.contains(scaled) {
                return Err(self.range_violation(text));
            }
        }

        Ok(Value::Decimal64 {
            scaled: scaled as i64,
            fraction_digits: self.fraction_digits,
        })
    }

    fn store_binary(&self, text: &str) -> Result<Value> {
        let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64_DECODER
            .decode(cleaned.as_bytes())
            .map_err(|_| self.bad_value(text, "is not a valid base64 encoding"))?;

        if let Some(length) = &self.length {
            if !length.contains(bytes.len() as i128) {
                return Err(self.length_violation(text));
            }
        }
        Ok(Value::Binary(bytes))
    }

    fn store_string(&self, text: &str) -> Result<Value> {
        if let Some(length) = &self.length {
            let count = text.chars().count() as i128;
            if !length.contains(count) {
                return Err(self.length_violation(text));
            }
        }
        for pattern in &self.patterns {
            if !pattern.matches(text) {
                let message = match &pattern.error_message {
                    Some(message) => message.clone(),
                    None => format!(
                        "value '{}' does not match pattern '{}'",
                        text, pattern.expr
                    ),
                };
                return Err(Error::Validation(
                    ValidationError::new(message).with_offending(text),
                ));
            }
        }
        Ok(Value::String(text.to_string()))
    }

    fn length_violation(&self, text: &str) -> Error {
        let message = match &self.length_error_message {
            Some(message) => message.clone(),
            None => format!("value '{}' does not satisfy the length constraint", text),
        };
        Error::Validation(ValidationError::new(message).with_offending(text))
    }

    fn store_bits(&self, text: &str) -> Result<Value> {
        let mut set: Vec<CompiledBit> = Vec::new();
        for name in text.split_whitespace() {
            let bit = self
                .bits
                .iter()
                .find(|b| b.name == name)
                .ok_or_else(|| self.bad_value(name, "is not a defined bit"))?;
            if set.iter().any(|b| b.name == bit.name) {
                return Err(self.bad_value(name, "is given more than once"));
            }
            set.push(bit.clone());
        }
        set.sort_by_key(|b| b.position);
        Ok(Value::Bits(set))
    }

    fn store_enum(&self, text: &str) -> Result<Value> {
        let member = self
            .enums
            .iter()
            .find(|e| e.name == text)
            .ok_or_else(|| self.bad_value(text, "is not a member of the enumeration"))?;
        Ok(Value::Enum {
            name: member.name.clone(),
            value: member.value,
        })
    }

    fn store_identityref(&self, text: &str, identities: &dyn IdentityResolver) -> Result<Value> {
        let key = identities
            .resolve(text)
            .ok_or_else(|| Error::Unresolved(format!("identity '{}' is not known", text)))?;

        let acceptable = self
            .bases
            .iter()
            .any(|base| identities.derived_from_or_self(&key, base));
        if !acceptable {
            return Err(self.bad_value(text, "is not derived from any base of the identityref"));
        }

        Ok(Value::Identityref {
            module: key.0,
            name: key.1,
        })
    }
}

/// Parse integer text: optional sign, decimal digits, leading zeros
/// allowed, but no `+0`, no whitespace, nothing else.
fn parse_integer_text(text: &str) -> Option<i128> {
    let bytes = text.as_bytes();
    let (sign, digits) = match bytes.first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => (1, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > 39 {
        // Far outside any integer type's domain; avoid i128 overflow.
        return Some(if sign < 0 { i128::MIN } else { i128::MAX });
    }
    let magnitude: i128 = if significant.is_empty() {
        0
    } else {
        significant.parse().ok()?
    };

    if magnitude == 0 && bytes[0] == b'+' {
        return None;
    }
    Some(sign * magnitude)
}

/// Canonical decimal64 print: exactly `fraction_digits` fractional
/// digits, a leading zero before the point, no leading `+`, negative
/// zero printed as zero.
fn print_decimal64(scaled: i64, fraction_digits: u8) -> String {
    let scale = 10i128.pow(u32::from(fraction_digits));
    let value = i128::from(scaled);
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();
    let int_part = magnitude / scale.unsigned_abs();
    let frac_part = magnitude % scale.unsigned_abs();
    format!(
        "{}{}.{:0width$}",
        sign,
        int_part,
        frac_part,
        width = usize::from(fraction_digits)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::restriction::{integer_bounds, parse_restriction, IntervalSet, RangeKind};
    use crate::types::{CompiledEnum, CompiledPattern};

    fn int8() -> CompiledType {
        CompiledType::plain(BuiltinType::Int8)
    }

    fn int8_with_range(expr: &str) -> CompiledType {
        let bounds = integer_bounds(true, 8);
        let full = IntervalSet::full(bounds.0, bounds.1);
        let mut ty = int8();
        ty.range = Some(parse_restriction(expr, RangeKind::Integer, bounds, &full).unwrap());
        ty
    }

    #[test]
    fn test_int8_boundaries() {
        let ty = int8();
        assert_eq!(ty.store("-128", &NoIdentities).unwrap(), Value::Int8(-128));
        assert_eq!(ty.store("127", &NoIdentities).unwrap(), Value::Int8(127));

        let err = ty.store("-129", &NoIdentities).unwrap_err();
        assert!(format!("{}", err).contains("out of int8's min/max bounds"));
        let err = ty.store("128", &NoIdentities).unwrap_err();
        assert!(format!("{}", err).contains("out of int8's min/max bounds"));
    }

    #[test]
    fn test_integer_lexical_rules() {
        let ty = int8();
        assert_eq!(ty.store("007", &NoIdentities).unwrap(), Value::Int8(7));
        assert_eq!(ty.store("+5", &NoIdentities).unwrap(), Value::Int8(5));
        assert_eq!(ty.store("-0", &NoIdentities).unwrap(), Value::Int8(0));

        assert!(ty.store("+0", &NoIdentities).is_err());
        assert!(ty.store("", &NoIdentities).is_err());
        assert!(ty.store(" 5", &NoIdentities).is_err());
        assert!(ty.store("5 ", &NoIdentities).is_err());
        assert!(ty.store("0x10", &NoIdentities).is_err());
        assert!(ty.store("--5", &NoIdentities).is_err());
    }

    #[test]
    fn test_integer_canonical_print() {
        let ty = int8();
        let v = ty.store("007", &NoIdentities).unwrap();
        assert_eq!(ty.print(&v), "7");
        let v = ty.store("+20", &NoIdentities).unwrap();
        assert_eq!(ty.print(&v), "20");
        let v = ty.store("-015", &NoIdentities).unwrap();
        assert_eq!(ty.print(&v), "-15");
    }

    #[test]
    fn test_range_vs_bounds_diagnostics() {
        let ty = int8_with_range("0 .. 50 | 127");
        assert!(ty.store("20", &NoIdentities).is_ok());
        assert!(ty.store("127", &NoIdentities).is_ok());

        let err = ty.store("60", &NoIdentities).unwrap_err();
        assert!(format!("{}", err).contains("does not satisfy the range constraint"));

        let err = ty.store("128", &NoIdentities).unwrap_err();
        assert!(format!("{}", err).contains("out of int8's min/max bounds"));
    }

    #[test]
    fn test_uint64_full_range() {
        let ty = CompiledType::plain(BuiltinType::Uint64);
        let v = ty.store("18446744073709551615", &NoIdentities).unwrap();
        assert_eq!(v, Value::Uint64(u64::MAX));
        assert!(ty.store("18446744073709551616", &NoIdentities).is_err());
        assert!(ty.store("-1", &NoIdentities).is_err());
    }

    #[test]
    fn test_decimal64_canonicalization() {
        let mut ty = CompiledType::plain(BuiltinType::Decimal64);
        ty.fraction_digits = 2;

        let v = ty.store("3.1", &NoIdentities).unwrap();
        assert_eq!(ty.print(&v), "3.10");

        assert!(ty.store("3.145", &NoIdentities).is_err());

        let v = ty.store("-0.00", &NoIdentities).unwrap();
        assert_eq!(ty.print(&v), "0.00");

        let v = ty.store(".5", &NoIdentities);
        assert!(v.is_err());

        let v = ty.store("-1.5", &NoIdentities).unwrap();
        assert_eq!(ty.print(&v), "-1.50");
    }

    #[test]
    fn test_decimal64_extremes() {
        let mut ty = CompiledType::plain(BuiltinType::Decimal64);
        ty.fraction_digits = 1;
        let v = ty.store("922337203685477580.7", &NoIdentities).unwrap();
        assert_eq!(ty.print(&v), "922337203685477580.7");
        assert!(ty.store("922337203685477580.8", &NoIdentities).is_err());

        let mut ty = CompiledType::plain(BuiltinType::Decimal64);
        ty.fraction_digits = 18;
        assert!(ty.store("9.223372036854775807", &NoIdentities).is_ok());
        assert!(ty.store("10", &NoIdentities).is_err());
    }

    #[test]
    fn test_boolean_and_empty() {
        let ty = CompiledType::plain(BuiltinType::Boolean);
        assert_eq!(ty.store("true", &NoIdentities).unwrap(), Value::Boolean(true));
        assert!(ty.store("TRUE", &NoIdentities).is_err());
        assert!(ty.store("1", &NoIdentities).is_err());

        let ty = CompiledType::plain(BuiltinType::Empty);
        assert_eq!(ty.store("", &NoIdentities).unwrap(), Value::Empty);
        assert!(ty.store("x", &NoIdentities).is_err());
        assert_eq!(ty.print(&Value::Empty), "");
    }

    #[test]
    fn test_binary_canonicalization() {
        let ty = CompiledType::plain(BuiltinType::Binary);
        let v = ty.store("SGVs bG8=", &NoIdentities).unwrap();
        assert_eq!(v, Value::Binary(b"Hello".to_vec()));
        assert_eq!(ty.print(&v), "SGVsbG8=");

        // padding is optional on input
        let v = ty.store("SGVsbG8", &NoIdentities).unwrap();
        assert_eq!(ty.print(&v), "SGVsbG8=");

        assert!(ty.store("!!!", &NoIdentities).is_err());
    }

    #[test]
    fn test_string_restrictions() {
        let mut ty = CompiledType::plain(BuiltinType::String);
        let bounds = restriction::length_bounds();
        let full = IntervalSet::full(bounds.0, bounds.1);
        ty.length =
            Some(parse_restriction("2 .. 4", RangeKind::Length, bounds, &full).unwrap());
        ty.patterns
            .push(CompiledPattern::compile("[a-z]+", false).unwrap());

        assert!(ty.store("abc", &NoIdentities).is_ok());
        let err = ty.store("a", &NoIdentities).unwrap_err();
        assert!(format!("{}", err).contains("length constraint"));
        let err = ty.store("abcde", &NoIdentities).unwrap_err();
        assert!(format!("{}", err).contains("length constraint"));
        let err = ty.store("ABC", &NoIdentities).unwrap_err();
        assert!(format!("{}", err).contains("does not match pattern"));

        // length counts scalar values, not bytes
        assert!(ty.store("äöü", &NoIdentities).is_err()); // pattern fails
        let mut plain = CompiledType::plain(BuiltinType::String);
        plain.length = ty.length.clone();
        assert!(plain.store("äöü", &NoIdentities).is_ok());
    }

    #[test]
    fn test_bits_canonical_order() {
        let mut ty = CompiledType::plain(BuiltinType::Bits);
        ty.bits = vec![
            CompiledBit { name: "alpha".into(), position: 0 },
            CompiledBit { name: "beta".into(), position: 3 },
            CompiledBit { name: "gamma".into(), position: 7 },
        ];

        let v = ty.store("gamma alpha", &NoIdentities).unwrap();
        assert_eq!(ty.print(&v), "alpha gamma");

        assert!(ty.store("alpha alpha", &NoIdentities).is_err());
        assert!(ty.store("delta", &NoIdentities).is_err());
        let v = ty.store("", &NoIdentities).unwrap();
        assert_eq!(ty.print(&v), "");
    }

    #[test]
    fn test_enumeration() {
        let mut ty = CompiledType::plain(BuiltinType::Enumeration);
        ty.enums = vec![
            CompiledEnum { name: "up".into(), value: 0 },
            CompiledEnum { name: "down".into(), value: 1 },
        ];

        let v = ty.store("down", &NoIdentities).unwrap();
        assert_eq!(
            v,
            Value::Enum { name: "down".into(), value: 1 }
        );
        assert_eq!(ty.print(&v), "down");
        assert!(ty.store("sideways", &NoIdentities).is_err());
    }

    #[test]
    fn test_instance_identifier_shape() {
        let ty = CompiledType::plain(BuiltinType::InstanceIdentifier);
        assert!(ty
            .store("/ex:system/ex:services", &NoIdentities)
            .is_ok());
        assert!(ty
            .store("/ex:interfaces/ex:interface[ex:name='eth0']", &NoIdentities)
            .is_ok());
        assert!(ty.store("relative/path", &NoIdentities).is_err());
        assert!(ty.store("/", &NoIdentities).is_err());
        assert!(ty.store("", &NoIdentities).is_err());
    }

    #[test]
    fn test_union_declaration_order() {
        let mut ty = CompiledType::plain(BuiltinType::Union);
        ty.members = vec![
            CompiledType::plain(BuiltinType::Int8),
            CompiledType::plain(BuiltinType::String),
        ];

        let v = ty.store("42", &NoIdentities).unwrap();
        match &v {
            Value::Union { member, value } => {
                assert_eq!(*member, 0);
                assert_eq!(**value, Value::Int8(42));
            }
            other => panic!("expected union value, got {:?}", other),
        }
        assert_eq!(ty.print(&v), "42");

        let v = ty.store("hello", &NoIdentities).unwrap();
        match &v {
            Value::Union { member, .. } => assert_eq!(*member, 1),
            other => panic!("expected union value, got {:?}", other),
        }
    }

    #[test]
    fn test_value_roundtrip_compare() {
        let ty = int8();
        let a = ty.store("5", &NoIdentities).unwrap();
        let b = ty.store("5", &NoIdentities).unwrap();
        assert!(ty.compare(&a, &b));

        let b = ty.store("10", &NoIdentities).unwrap();
        assert!(!ty.compare(&a, &b));

        let copied = ty.duplicate(&a);
        assert!(ty.compare(&a, &copied));

        // store(print(v)) round-trips
        let reparsed = ty.store(&ty.print(&a), &NoIdentities).unwrap();
        assert!(ty.compare(&a, &reparsed));
    }

    #[test]
    fn test_leafref_delegates_to_referent() {
        let mut ty = CompiledType::plain(BuiltinType::Leafref);
        ty.path = Some("../port".into());
        ty.realtype = Some(Box::new(int8_with_range("0 .. 50")));

        assert_eq!(ty.store("20", &NoIdentities).unwrap(), Value::Int8(20));
        assert!(ty.store("60", &NoIdentities).is_err());
    }

    struct TestIdentities;

    impl IdentityResolver for TestIdentities {
        fn resolve(&self, text: &str) -> Option<(String, String)> {
            let name = text.split_once(':').map(|(_, n)| n).unwrap_or(text);
            match name {
                "a" | "b" | "c" => Some(("m".to_string(), name.to_string())),
                _ => None,
            }
        }

        fn derived_from_or_self(
            &self,
            identity: &(String, String),
            base: &(String, String),
        ) -> bool {
            // derivation chain: c -> b -> a
            let rank = |n: &str| match n {
                "a" => 0,
                "b" => 1,
                "c" => 2,
                _ => -1,
            };
            identity.0 == base.0 && rank(&identity.1) >= rank(&base.1)
        }
    }

    #[test]
    fn test_identityref() {
        let mut ty = CompiledType::plain(BuiltinType::Identityref);
        ty.bases = vec![("m".to_string(), "b".to_string())];

        let v = ty.store("m:c", &TestIdentities).unwrap();
        assert_eq!(ty.print(&v), "m:c");
        assert!(ty.store("b", &TestIdentities).is_ok());

        // 'a' exists but is not derived from base 'b'
        assert!(ty.store("a", &TestIdentities).is_err());
        // unknown identity
        assert!(matches!(
            ty.store("zz", &TestIdentities).unwrap_err(),
            Error::Unresolved(_)
        ));
    }

    #[test]
    fn test_custom_type_hook() {
        use crate::types::{CustomTypeCallbacks, CustomTypeHook};
        use std::sync::Arc;

        let mut ty = CompiledType::plain(BuiltinType::String);
        ty.custom = Some(CustomTypeHook {
            name: "mac-address".into(),
            callbacks: Arc::new(CustomTypeCallbacks {
                store: Box::new(|text| {
                    if text.len() == 17 && text.bytes().filter(|b| *b == b':').count() == 5 {
                        Ok(text.to_ascii_lowercase())
                    } else {
                        Err(Error::Validation(ValidationError::new(
                            "not a mac-address",
                        )))
                    }
                }),
            }),
        });

        let v = ty.store("AA:BB:CC:00:11:22", &NoIdentities).unwrap();
        assert_eq!(ty.print(&v), "aa:bb:cc:00:11:22");
        assert!(ty.store("nope", &NoIdentities).is_err());
    }
}
