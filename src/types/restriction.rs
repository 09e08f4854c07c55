//! Range and length restriction algebra
//!
//! Restrictions are sets of closed intervals over a linearly-ordered
//! domain: integers, decimal64 scaled integers, or string/binary lengths.
//! All three share one representation over `i128`, which covers the full
//! `u64` and scaled-decimal domains.
//!
//! Interval endpoints must be strictly ascending across parts
//! (`lo` of a part must exceed `hi` of the previous part); consecutive
//! disjoint intervals are kept as-is, never coalesced.

use crate::error::{Error, Result, ValidationError};
use std::fmt;

/// One closed interval `[lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// Lower endpoint, inclusive
    pub lo: i128,
    /// Upper endpoint, inclusive
    pub hi: i128,
}

/// A sorted, disjoint set of closed intervals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

/// The value domain a restriction expression is parsed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// Integer ranges: optional sign, decimal digits
    Integer,
    /// Decimal64 ranges, scaled to the type's fraction-digits
    Decimal64 {
        /// Fraction digits of the target type, 1..=18
        fraction_digits: u8,
    },
    /// Length ranges over Unicode scalar counts: unsigned digits
    Length,
}

impl IntervalSet {
    /// The un-restricted set: a single interval over the natural bounds
    pub fn full(lo: i128, hi: i128) -> Self {
        Self {
            intervals: vec![Interval { lo, hi }],
        }
    }

    /// The intervals, in ascending order
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Effective bounds: the lowest `lo` and the highest `hi`
    pub fn bounds(&self) -> (i128, i128) {
        let lo = self.intervals.first().map(|i| i.lo).unwrap_or(0);
        let hi = self.intervals.last().map(|i| i.hi).unwrap_or(0);
        (lo, hi)
    }

    /// Whether a value falls inside some interval
    pub fn contains(&self, value: i128) -> bool {
        self.intervals
            .iter()
            .any(|i| i.lo <= value && value <= i.hi)
    }

    /// Whether every interval of `self` is fully contained in some
    /// interval of `parent`
    pub fn is_subset_of(&self, parent: &IntervalSet) -> bool {
        self.intervals.iter().all(|interval| {
            parent
                .intervals
                .iter()
                .any(|p| p.lo <= interval.lo && interval.hi <= p.hi)
        })
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, interval) in self.intervals.iter().enumerate() {
            if idx > 0 {
                write!(f, " | ")?;
            }
            if interval.lo == interval.hi {
                write!(f, "{}", interval.lo)?;
            } else {
                write!(f, "{} .. {}", interval.lo, interval.hi)?;
            }
        }
        Ok(())
    }
}

/// Parse a `range`/`length` expression against the parent restriction.
///
/// `natural` is the built-in type's natural domain; literals must fall in
/// it. `min` and `max` resolve against the parent's effective bounds.
/// Parts must be strictly ascending and non-overlapping.
pub fn parse_restriction(
    expr: &str,
    kind: RangeKind,
    natural: (i128, i128),
    parent: &IntervalSet,
) -> Result<IntervalSet> {
    let malformed = |detail: &str| {
        Error::Validation(
            ValidationError::new(format!("malformed restriction expression: {}", detail))
                .with_offending(expr),
        )
    };

    let (parent_lo, parent_hi) = parent.bounds();
    let mut intervals: Vec<Interval> = Vec::new();

    for part in expr.split('|') {
        let part = part.trim();
        if part.is_empty() {
            return Err(malformed("empty part"));
        }

        let (lo_text, hi_text) = match part.split_once("..") {
            Some((lo, hi)) => (lo.trim(), hi.trim()),
            None => (part, part),
        };
        if lo_text.is_empty() || hi_text.is_empty() {
            return Err(malformed("missing endpoint around '..'"));
        }

        let lo = parse_atom(lo_text, kind, natural, parent_lo, parent_hi, expr)?;
        let hi = parse_atom(hi_text, kind, natural, parent_lo, parent_hi, expr)?;

        if lo > hi {
            return Err(malformed("lower endpoint exceeds upper endpoint"));
        }
        if let Some(previous) = intervals.last() {
            if lo <= previous.hi {
                return Err(Error::Validation(
                    ValidationError::new(
                        "restriction parts must be in strictly ascending order",
                    )
                    .with_offending(expr),
                ));
            }
        }
        intervals.push(Interval { lo, hi });
    }

    Ok(IntervalSet { intervals })
}

fn parse_atom(
    atom: &str,
    kind: RangeKind,
    natural: (i128, i128),
    parent_lo: i128,
    parent_hi: i128,
    expr: &str,
) -> Result<i128> {
    match atom {
        "min" => Ok(parent_lo),
        "max" => Ok(parent_hi),
        literal => {
            let value = parse_literal(literal, kind).ok_or_else(|| {
                Error::Validation(
                    ValidationError::new(format!(
                        "restriction value '{}' is not a valid {}",
                        literal,
                        match kind {
                            RangeKind::Integer => "integer",
                            RangeKind::Decimal64 { .. } => "decimal64 value",
                            RangeKind::Length => "length",
                        }
                    ))
                    .with_offending(expr),
                )
            })?;
            if value < natural.0 || value > natural.1 {
                return Err(Error::Validation(
                    ValidationError::new(format!(
                        "restriction value '{}' is out of the type's min/max bounds",
                        literal
                    ))
                    .with_offending(expr),
                ));
            }
            Ok(value)
        }
    }
}

/// Parse a single literal in the given domain. Decimal64 literals are
/// scaled to the type's fraction-digits.
pub fn parse_literal(literal: &str, kind: RangeKind) -> Option<i128> {
    match kind {
        RangeKind::Integer => {
            let rest = literal.strip_prefix('-').unwrap_or(literal);
            if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            literal.parse::<i128>().ok()
        }
        RangeKind::Length => {
            if literal.is_empty() || !literal.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            literal.parse::<i128>().ok()
        }
        RangeKind::Decimal64 { fraction_digits } => {
            parse_scaled_decimal(literal, fraction_digits)
        }
    }
}

/// Parse `[-+]?digits(.digits)?` into an integer scaled by
/// `10^fraction_digits`. The fractional part must not exceed the type's
/// fraction-digits.
pub fn parse_scaled_decimal(literal: &str, fraction_digits: u8) -> Option<i128> {
    let (negative, rest) = match literal.as_bytes().first()? {
        b'-' => (true, &literal[1..]),
        b'+' => (false, &literal[1..]),
        _ => (false, literal),
    };

    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rest, ""),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if rest.contains('.') && (frac_part.is_empty() || !frac_part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    if frac_part.len() > usize::from(fraction_digits) {
        return None;
    }

    let scale = 10i128.checked_pow(u32::from(fraction_digits))?;
    let int_value = int_part.parse::<i128>().ok()?;
    let mut frac_value = if frac_part.is_empty() {
        0
    } else {
        frac_part.parse::<i128>().ok()?
    };
    frac_value *= 10i128.pow((usize::from(fraction_digits) - frac_part.len()) as u32);

    let magnitude = int_value.checked_mul(scale)?.checked_add(frac_value)?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Check the "derived must be equally or more limiting" rule
pub fn check_derived(derived: &IntervalSet, parent: &IntervalSet, expr: &str) -> Result<()> {
    if derived.is_subset_of(parent) {
        Ok(())
    } else {
        Err(Error::Validation(
            ValidationError::new(format!(
                "derived restriction ({}) is not equally or more limiting",
                expr
            ))
            .with_offending(expr),
        ))
    }
}

/// Natural bounds of the integer built-ins by bit width and signedness
pub fn integer_bounds(signed: bool, bits: u32) -> (i128, i128) {
    if signed {
        let hi = (1i128 << (bits - 1)) - 1;
        (-(1i128 << (bits - 1)), hi)
    } else {
        (0, (1i128 << bits) - 1)
    }
}

/// Natural bounds of decimal64 in scaled form: `±(2^63 - 1)`
pub fn decimal64_bounds() -> (i128, i128) {
    (-(i64::MAX as i128), i64::MAX as i128)
}

/// Natural bounds of a length restriction
pub fn length_bounds() -> (i128, i128) {
    (0, u64::MAX as i128)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int8_full() -> IntervalSet {
        let (lo, hi) = integer_bounds(true, 8);
        IntervalSet::full(lo, hi)
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(integer_bounds(true, 8), (-128, 127));
        assert_eq!(integer_bounds(true, 64), (i64::MIN as i128, i64::MAX as i128));
        assert_eq!(integer_bounds(false, 8), (0, 255));
        assert_eq!(integer_bounds(false, 64), (0, u64::MAX as i128));
    }

    #[test]
    fn test_parse_simple_range() {
        let set = parse_restriction("0 .. 50 | 127", RangeKind::Integer, (-128, 127), &int8_full())
            .unwrap();
        assert_eq!(
            set.intervals(),
            &[Interval { lo: 0, hi: 50 }, Interval { lo: 127, hi: 127 }]
        );
    }

    #[test]
    fn test_min_max_resolve_against_parent() {
        let parent = parse_restriction("0 .. 50", RangeKind::Integer, (-128, 127), &int8_full())
            .unwrap();
        let set =
            parse_restriction("min .. 20 | max", RangeKind::Integer, (-128, 127), &parent)
                .unwrap();
        assert_eq!(
            set.intervals(),
            &[Interval { lo: 0, hi: 20 }, Interval { lo: 50, hi: 50 }]
        );
    }

    #[test]
    fn test_adjacent_intervals_kept() {
        let set = parse_restriction(
            "min .. 10 | 11 .. 12 | 30",
            RangeKind::Integer,
            (-128, 127),
            &int8_full(),
        )
        .unwrap();
        assert_eq!(
            set.intervals(),
            &[
                Interval { lo: -128, hi: 10 },
                Interval { lo: 11, hi: 12 },
                Interval { lo: 30, hi: 30 }
            ]
        );
    }

    #[test]
    fn test_touching_endpoint_rejected() {
        let err = parse_restriction(
            "0 .. 50 | 50 .. 60",
            RangeKind::Integer,
            (-128, 127),
            &int8_full(),
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("strictly ascending"));
    }

    #[test]
    fn test_descending_parts_rejected() {
        let err = parse_restriction(
            "60 .. 70 | 0 .. 10",
            RangeKind::Integer,
            (-128, 127),
            &int8_full(),
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("strictly ascending"));
    }

    #[test]
    fn test_literal_out_of_natural_bounds() {
        let err =
            parse_restriction("0 .. 128", RangeKind::Integer, (-128, 127), &int8_full())
                .unwrap_err();
        assert!(format!("{}", err).contains("out of the type's min/max bounds"));
    }

    #[test]
    fn test_inverted_interval_rejected() {
        let err = parse_restriction("50 .. 0", RangeKind::Integer, (-128, 127), &int8_full())
            .unwrap_err();
        assert!(format!("{}", err).contains("lower endpoint exceeds"));
    }

    #[test]
    fn test_malformed_expressions() {
        for expr in ["", "|", "1 ..", ".. 5", "a .. b", "1 .. 2 |"] {
            assert!(
                parse_restriction(expr, RangeKind::Integer, (-128, 127), &int8_full()).is_err(),
                "expected failure for '{}'",
                expr
            );
        }
    }

    #[test]
    fn test_derived_subset_ok() {
        let parent = parse_restriction(
            "-128 .. -60 | -1 .. 1 | 60 .. 127",
            RangeKind::Integer,
            (-128, 127),
            &int8_full(),
        )
        .unwrap();
        let derived =
            parse_restriction("-100 .. -80 | 1", RangeKind::Integer, (-128, 127), &parent)
                .unwrap();
        assert!(check_derived(&derived, &parent, "-100 .. -80 | 1").is_ok());
    }

    #[test]
    fn test_derived_not_more_limiting() {
        let parent = parse_restriction(
            "-128 .. -60 | -1 .. 1 | 60 .. 127",
            RangeKind::Integer,
            (-128, 127),
            &int8_full(),
        )
        .unwrap();
        let derived =
            parse_restriction("-80 .. 80", RangeKind::Integer, (-128, 127), &parent).unwrap();
        let err = check_derived(&derived, &parent, "-80 .. 80").unwrap_err();
        assert_eq!(
            format!("{}", err),
            "validation error: derived restriction (-80 .. 80) is not equally or more limiting \
             (value: '-80 .. 80')"
        );
    }

    #[test]
    fn test_scaled_decimal_parse() {
        assert_eq!(parse_scaled_decimal("3.1", 2), Some(310));
        assert_eq!(parse_scaled_decimal("-0.00", 2), Some(0));
        assert_eq!(parse_scaled_decimal("+1.5", 1), Some(15));
        assert_eq!(parse_scaled_decimal("7", 3), Some(7000));
        assert_eq!(
            parse_scaled_decimal("922337203685477580.7", 1),
            Some(9223372036854775807)
        );

        assert_eq!(parse_scaled_decimal("3.145", 2), None); // too many digits
        assert_eq!(parse_scaled_decimal(".5", 1), None);
        assert_eq!(parse_scaled_decimal("1.", 1), None);
        assert_eq!(parse_scaled_decimal("1e2", 1), None);
        assert_eq!(parse_scaled_decimal("", 1), None);
        // One step past the decimal64 maximum still parses; the bounds
        // check rejects it later.
        assert_eq!(
            parse_scaled_decimal("922337203685477580.8", 1),
            Some(9223372036854775808)
        );
    }

    #[test]
    fn test_decimal64_range() {
        let (lo, hi) = decimal64_bounds();
        let full = IntervalSet::full(lo, hi);
        let set = parse_restriction(
            "1.5 .. 2.5",
            RangeKind::Decimal64 { fraction_digits: 1 },
            (lo, hi),
            &full,
        )
        .unwrap();
        assert_eq!(set.intervals(), &[Interval { lo: 15, hi: 25 }]);

        // fraction-digits=1 maximum is (2^63-1)/10
        let err = parse_restriction(
            "0 .. 922337203685477580.8",
            RangeKind::Decimal64 { fraction_digits: 1 },
            (lo, hi),
            &full,
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("out of the type's min/max bounds"));
    }

    #[test]
    fn test_length_restriction() {
        let (lo, hi) = length_bounds();
        let full = IntervalSet::full(lo, hi);
        let set =
            parse_restriction("1 .. 255", RangeKind::Length, (lo, hi), &full).unwrap();
        assert_eq!(set.intervals(), &[Interval { lo: 1, hi: 255 }]);

        assert!(parse_restriction("-1 .. 5", RangeKind::Length, (lo, hi), &full).is_err());
    }

    #[test]
    fn test_contains_and_display() {
        let set = parse_restriction(
            "0 .. 50 | 127",
            RangeKind::Integer,
            (-128, 127),
            &int8_full(),
        )
        .unwrap();
        assert!(set.contains(0));
        assert!(set.contains(50));
        assert!(set.contains(127));
        assert!(!set.contains(51));
        assert!(!set.contains(-1));
        assert_eq!(format!("{}", set), "0 .. 50 | 127");
    }
}
