//! YANG identifier and argument validation
//!
//! This module validates the three argument alphabets the statement builder
//! distinguishes: identifiers, prefixed identifiers, and free-form strings.

use crate::error::{Error, Result, ValidationError};

/// Check if a string is a valid YANG identifier.
///
/// An identifier starts with a letter or `_` and continues with letters,
/// digits, `_`, `-`, or `.`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Check if a string is a valid prefixed identifier (`prefix:name` or `name`)
pub fn is_prefixed_identifier(name: &str) -> bool {
    if let Some((prefix, local)) = name.split_once(':') {
        is_identifier(prefix) && is_identifier(local)
    } else {
        is_identifier(name)
    }
}

/// Check if a string is a valid YANG string argument.
///
/// Any UTF-8 sequence is accepted except control characters outside
/// `\t`, `\n`, `\r`.
pub fn is_yang_string(value: &str) -> bool {
    value
        .chars()
        .all(|c| !c.is_control() || c == '\t' || c == '\n' || c == '\r')
}

/// Validate an identifier and return an error if invalid
pub fn validate_identifier(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(Error::Validation(
            ValidationError::new("invalid identifier").with_offending(name),
        ))
    }
}

/// Validate a prefixed identifier and return an error if invalid
pub fn validate_prefixed_identifier(name: &str) -> Result<()> {
    if is_prefixed_identifier(name) {
        Ok(())
    } else {
        Err(Error::Validation(
            ValidationError::new("invalid prefixed identifier").with_offending(name),
        ))
    }
}

/// Validate a string argument and return an error if invalid
pub fn validate_yang_string(value: &str) -> Result<()> {
    if is_yang_string(value) {
        Ok(())
    } else {
        Err(Error::Validation(
            ValidationError::new("string argument contains forbidden control characters")
                .with_offending(value),
        ))
    }
}

/// Split a prefixed identifier into prefix and local name
pub fn split_prefixed(name: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = name.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, name)
    }
}

/// Check a revision date argument (`YYYY-MM-DD`)
pub fn is_revision_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits_ok = date
        .char_indices()
        .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !digits_ok {
        return false;
    }
    let month: u32 = date[5..7].parse().unwrap_or(0);
    let day: u32 = date[8..10].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("leaf-name"));
        assert!(is_identifier("_leaf"));
        assert!(is_identifier("a.b.c"));
        assert!(is_identifier("x123"));

        assert!(!is_identifier(""));
        assert!(!is_identifier("123x"));
        assert!(!is_identifier("-leaf"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier("a:b"));
    }

    #[test]
    fn test_is_prefixed_identifier() {
        assert!(is_prefixed_identifier("leaf"));
        assert!(is_prefixed_identifier("pref:leaf"));

        assert!(!is_prefixed_identifier(":leaf"));
        assert!(!is_prefixed_identifier("pref:"));
        assert!(!is_prefixed_identifier("a:b:c"));
    }

    #[test]
    fn test_is_yang_string() {
        assert!(is_yang_string("any text"));
        assert!(is_yang_string("tabs\tand\nnewlines\r"));
        assert!(is_yang_string(""));

        assert!(!is_yang_string("bell\u{7}"));
        assert!(!is_yang_string("nul\u{0}"));
    }

    #[test]
    fn test_split_prefixed() {
        assert_eq!(split_prefixed("leaf"), (None, "leaf"));
        assert_eq!(split_prefixed("if:mtu"), (Some("if"), "mtu"));
    }

    #[test]
    fn test_is_revision_date() {
        assert!(is_revision_date("2020-01-31"));
        assert!(is_revision_date("1999-12-01"));

        assert!(!is_revision_date("2020-1-31"));
        assert!(!is_revision_date("2020-13-01"));
        assert!(!is_revision_date("2020-00-10"));
        assert!(!is_revision_date("2020-01-32"));
        assert!(!is_revision_date("20200131"));
    }
}
