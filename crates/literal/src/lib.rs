//! Integer and boolean literal parsing for the skald value engines.
//!
//! Tokens are parsed in the widest integer domain and narrowed by the caller,
//! which knows the declared width of the receiving type. Grammar:
//!
//! ```text
//! integer := sign? magnitude
//! sign    := "+" | "-"
//! magnitude := ("0x" | "0X") hex+
//!            | ("0o" | "0O") octal+
//!            | ("0b" | "0B") binary+
//!            | decimal+
//! boolean := "true" | "false" | "yes" | "no" | "on" | "off"
//!          | "enable" | "enabled" | "disable" | "disabled" | "0" | "1"
//! ```
//!
//! Callers supply trimmed tokens; no whitespace is skipped here. Digit
//! separators are not recognized.

/// Errors produced by the literal parsers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
	/// The token was empty, or held only a sign character.
	#[error("empty integer literal")]
	Empty,
	/// A radix prefix with nothing after it, e.g. `0x`.
	#[error("missing digits after {prefix:?} prefix")]
	MissingDigits { prefix: &'static str },
	/// A character outside the literal's radix.
	#[error("invalid digit {found:?} in base-{radix} integer literal")]
	InvalidDigit { found: char, radix: u32 },
	/// The magnitude does not fit the 64-bit domain (or, for negative
	/// literals, the signed 64-bit domain).
	#[error("integer literal out of 64-bit range")]
	OutOfRange,
	/// The token is not one of the recognized boolean words.
	#[error("expected a boolean literal, found {found:?}")]
	NotBoolean { found: Box<str> },
}

/// A parsed integer literal, kept in the domain it was written in.
///
/// Unsigned literals keep their zero-extended bit pattern; negative literals
/// keep two's complement. The distinction matters when the caller narrows the
/// value and checks that it survives the round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WideInteger {
	Unsigned(u64),
	Signed(i64),
}

impl WideInteger {
	/// The raw 64-bit bit pattern of the literal.
	#[inline]
	pub const fn as_bits(self) -> u64 {
		match self {
			WideInteger::Unsigned(value) => value,
			WideInteger::Signed(value) => value as u64,
		}
	}

	/// Whether the literal was written with a minus sign.
	#[inline]
	pub const fn is_negative(self) -> bool {
		matches!(self, WideInteger::Signed(value) if value < 0)
	}
}

/// Whether `first` can start an integer literal (a sign or an ASCII digit).
#[inline]
pub const fn is_integer_start(first: char) -> bool {
	first.is_ascii_digit() || first == '+' || first == '-'
}

/// Whether `first` can start one of the recognized boolean words.
#[inline]
pub const fn is_boolean_start(first: char) -> bool {
	matches!(
		first,
		'd' | 'D' | 'e' | 'E' | 'f' | 'F' | 'n' | 'N' | 'o' | 'O' | 't' | 'T' | 'y' | 'Y'
	)
}

/// Parse an integer literal into the 64-bit domain.
///
/// # Errors
///
/// Returns [`LiteralError`] for empty tokens, bare radix prefixes, digits
/// outside the radix, or magnitudes that do not fit 64 bits.
///
/// # Example
///
/// ```
/// use skald_literal::{parse_wide_integer, WideInteger};
///
/// assert_eq!(parse_wide_integer("0x10"), Ok(WideInteger::Unsigned(16)));
/// assert_eq!(parse_wide_integer("-1"), Ok(WideInteger::Signed(-1)));
/// ```
pub fn parse_wide_integer(text: &str) -> Result<WideInteger, LiteralError> {
	let mut rest = text;
	let mut negative = false;

	match rest.as_bytes().first() {
		Some(b'+') => rest = &rest[1..],
		Some(b'-') => {
			negative = true;
			rest = &rest[1..];
		}
		_ => {}
	}

	if rest.is_empty() {
		return Err(LiteralError::Empty);
	}

	let (radix, prefix) = match rest.as_bytes() {
		[b'0', b'x' | b'X', ..] => (16, Some("0x")),
		[b'0', b'o' | b'O', ..] => (8, Some("0o")),
		[b'0', b'b' | b'B', ..] => (2, Some("0b")),
		_ => (10, None),
	};

	if let Some(prefix) = prefix {
		rest = &rest[2..];
		if rest.is_empty() {
			return Err(LiteralError::MissingDigits { prefix });
		}
	}

	let mut magnitude: u64 = 0;
	for ch in rest.chars() {
		let digit = ch
			.to_digit(radix)
			.ok_or(LiteralError::InvalidDigit { found: ch, radix })?;
		magnitude = magnitude
			.checked_mul(u64::from(radix))
			.and_then(|m| m.checked_add(u64::from(digit)))
			.ok_or(LiteralError::OutOfRange)?;
	}

	if negative {
		// Two's complement lower bound: magnitude 2^63 is exactly i64::MIN.
		if magnitude > i64::MIN.unsigned_abs() {
			return Err(LiteralError::OutOfRange);
		}
		Ok(WideInteger::Signed(magnitude.wrapping_neg() as i64))
	} else {
		Ok(WideInteger::Unsigned(magnitude))
	}
}

const TRUE_WORDS: &[&str] = &["true", "yes", "on", "enable", "enabled", "1"];
const FALSE_WORDS: &[&str] = &["false", "no", "off", "disable", "disabled", "0"];

/// Parse a boolean word, ASCII case-insensitively.
///
/// # Errors
///
/// Returns [`LiteralError::NotBoolean`] when the token is not a recognized
/// word. Matching is exact; prefixes are not accepted.
pub fn parse_boolean(text: &str) -> Result<bool, LiteralError> {
	if TRUE_WORDS.iter().any(|word| text.eq_ignore_ascii_case(word)) {
		return Ok(true);
	}
	if FALSE_WORDS.iter().any(|word| text.eq_ignore_ascii_case(word)) {
		return Ok(false);
	}
	Err(LiteralError::NotBoolean { found: text.into() })
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_decimal() {
		assert_eq!(parse_wide_integer("0"), Ok(WideInteger::Unsigned(0)));
		assert_eq!(parse_wide_integer("42"), Ok(WideInteger::Unsigned(42)));
		assert_eq!(parse_wide_integer("+42"), Ok(WideInteger::Unsigned(42)));
		assert_eq!(
			parse_wide_integer("18446744073709551615"),
			Ok(WideInteger::Unsigned(u64::MAX))
		);
	}

	#[test]
	fn test_radix_prefixes() {
		assert_eq!(parse_wide_integer("0x10"), Ok(WideInteger::Unsigned(16)));
		assert_eq!(parse_wide_integer("0XFF"), Ok(WideInteger::Unsigned(255)));
		assert_eq!(parse_wide_integer("0o17"), Ok(WideInteger::Unsigned(15)));
		assert_eq!(parse_wide_integer("0b101"), Ok(WideInteger::Unsigned(5)));
		assert_eq!(
			parse_wide_integer("0xFFFFFFFFFFFFFFFF"),
			Ok(WideInteger::Unsigned(u64::MAX))
		);
	}

	#[test]
	fn test_negative() {
		assert_eq!(parse_wide_integer("-1"), Ok(WideInteger::Signed(-1)));
		assert_eq!(parse_wide_integer("-0x10"), Ok(WideInteger::Signed(-16)));
		assert_eq!(
			parse_wide_integer("-9223372036854775808"),
			Ok(WideInteger::Signed(i64::MIN))
		);
		assert_eq!(
			parse_wide_integer("-9223372036854775809"),
			Err(LiteralError::OutOfRange)
		);
	}

	#[test]
	fn test_bits() {
		assert_eq!(WideInteger::Signed(-1).as_bits(), u64::MAX);
		assert_eq!(WideInteger::Unsigned(7).as_bits(), 7);
		assert!(WideInteger::Signed(-1).is_negative());
		assert!(!WideInteger::Unsigned(7).is_negative());
	}

	#[test]
	fn test_rejects() {
		assert_eq!(parse_wide_integer(""), Err(LiteralError::Empty));
		assert_eq!(parse_wide_integer("-"), Err(LiteralError::Empty));
		assert_eq!(parse_wide_integer("+"), Err(LiteralError::Empty));
		assert_eq!(
			parse_wide_integer("0x"),
			Err(LiteralError::MissingDigits { prefix: "0x" })
		);
		assert_eq!(
			parse_wide_integer("12a"),
			Err(LiteralError::InvalidDigit { found: 'a', radix: 10 })
		);
		assert_eq!(
			parse_wide_integer("0b12"),
			Err(LiteralError::InvalidDigit { found: '2', radix: 2 })
		);
		assert_eq!(
			parse_wide_integer("18446744073709551616"),
			Err(LiteralError::OutOfRange)
		);
	}

	#[test]
	fn test_boolean_words() {
		assert_eq!(parse_boolean("true"), Ok(true));
		assert_eq!(parse_boolean("On"), Ok(true));
		assert_eq!(parse_boolean("YES"), Ok(true));
		assert_eq!(parse_boolean("enabled"), Ok(true));
		assert_eq!(parse_boolean("1"), Ok(true));
		assert_eq!(parse_boolean("false"), Ok(false));
		assert_eq!(parse_boolean("off"), Ok(false));
		assert_eq!(parse_boolean("Disable"), Ok(false));
		assert_eq!(parse_boolean("0"), Ok(false));
		assert!(matches!(
			parse_boolean("tru"),
			Err(LiteralError::NotBoolean { .. })
		));
		assert!(matches!(
			parse_boolean(""),
			Err(LiteralError::NotBoolean { .. })
		));
	}

	#[test]
	fn test_start_predicates() {
		assert!(is_integer_start('0'));
		assert!(is_integer_start('-'));
		assert!(is_integer_start('+'));
		assert!(!is_integer_start('x'));
		assert!(is_boolean_start('t'));
		assert!(is_boolean_start('N'));
		assert!(!is_boolean_start('x'));
		assert!(!is_boolean_start('1'));
	}

	proptest! {
		#[test]
		fn prop_unsigned_round_trip(value: u64) {
			prop_assert_eq!(
				parse_wide_integer(&value.to_string()),
				Ok(WideInteger::Unsigned(value))
			);
			prop_assert_eq!(
				parse_wide_integer(&format!("0x{value:X}")),
				Ok(WideInteger::Unsigned(value))
			);
		}

		#[test]
		fn prop_negative_round_trip(value in i64::MIN..0i64) {
			prop_assert_eq!(
				parse_wide_integer(&value.to_string()),
				Ok(WideInteger::Signed(value))
			);
		}
	}
}
