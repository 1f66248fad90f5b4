//! Backslash escape decoding shared by the element scanner and the copier.

/// Decodes the escape sequence at the start of `rest`, which must begin with
/// a backslash. Returns the decoded character and the number of bytes
/// consumed, including the backslash. A trailing lone backslash decodes to
/// itself.
pub(crate) fn parse_escape(rest: &str) -> (char, usize) {
	debug_assert!(rest.starts_with('\\'));

	let mut chars = rest[1..].chars();
	let Some(selector) = chars.next() else {
		return ('\\', 1);
	};

	match selector {
		'a' => ('\u{7}', 2),
		'b' => ('\u{8}', 2),
		'f' => ('\u{c}', 2),
		'n' => ('\n', 2),
		'r' => ('\r', 2),
		't' => ('\t', 2),
		'v' => ('\u{b}', 2),
		'\\' => ('\\', 2),
		// A hex escape takes every remaining hex digit; only the low
		// byte survives.
		'x' => match hex_digits(&rest[2..], rest.len()) {
			(_, 0) => ('x', 2),
			(value, len) => (byte_char(value), 2 + len),
		},
		'u' => match hex_digits(&rest[2..], 4) {
			(_, 0) => ('u', 2),
			// Values in the surrogate range are not scalar values; they
			// decode to the replacement character.
			(value, len) => (char::from_u32(value).unwrap_or('\u{FFFD}'), 2 + len),
		},
		'0'..='7' => {
			// Three digits top out at 0o777; the value is carried
			// whole, not masked to a byte.
			let (value, len) = octal_digits(&rest[1..], 3);
			(char::from_u32(value).unwrap_or('\u{0}'), 1 + len)
		}
		'\n' => {
			let run = rest[2..]
				.bytes()
				.take_while(|byte| matches!(byte, b'\t' | b' '))
				.count();
			(' ', 2 + run)
		}
		other => (other, 1 + other.len_utf8()),
	}
}

/// Reads up to `max` ASCII hex digits; returns the value and digit count.
fn hex_digits(text: &str, max: usize) -> (u32, usize) {
	let mut value = 0u32;
	let mut len = 0;
	for byte in text.bytes().take(max) {
		match (byte as char).to_digit(16) {
			Some(digit) => {
				value = (value << 4) | digit;
				len += 1;
			}
			None => break,
		}
	}
	(value, len)
}

/// Reads up to `max` ASCII octal digits; returns the value and digit count.
fn octal_digits(text: &str, max: usize) -> (u32, usize) {
	let mut value = 0u32;
	let mut len = 0;
	for byte in text.bytes().take(max) {
		match byte {
			b'0'..=b'7' => {
				value = (value << 3) | u32::from(byte - b'0');
				len += 1;
			}
			_ => break,
		}
	}
	(value, len)
}

#[inline]
fn byte_char(value: u32) -> char {
	char::from_u32(value & 0xFF).unwrap_or('\u{0}')
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_mnemonics() {
		assert_eq!(parse_escape(r"\n"), ('\n', 2));
		assert_eq!(parse_escape(r"\t"), ('\t', 2));
		assert_eq!(parse_escape(r"\\"), ('\\', 2));
		assert_eq!(parse_escape(r"\a"), ('\u{7}', 2));
	}

	#[test]
	fn test_hex() {
		assert_eq!(parse_escape(r"\x41"), ('A', 4));
		assert_eq!(parse_escape(r"\x4141"), ('A', 6));
		assert_eq!(parse_escape(r"\x412"), ('\u{12}', 5));
		assert_eq!(parse_escape(r"\x4"), ('\u{4}', 3));
		assert_eq!(parse_escape(r"\x"), ('x', 2));
		assert_eq!(parse_escape(r"\xg"), ('x', 2));
		// A run longer than the accumulator still keeps the low byte.
		assert_eq!(parse_escape(r"\xDEADBEEF11"), ('\u{11}', 12));
	}

	#[test]
	fn test_unicode() {
		assert_eq!(parse_escape("\\u0041"), ('A', 6));
		assert_eq!(parse_escape(r"\u41"), ('A', 4));
		assert_eq!(parse_escape(r"\u"), ('u', 2));
		assert_eq!(parse_escape(r"\uD800x"), ('\u{FFFD}', 6));
	}

	#[test]
	fn test_octal() {
		assert_eq!(parse_escape(r"\101"), ('A', 4));
		assert_eq!(parse_escape(r"\7"), ('\u{7}', 2));
		assert_eq!(parse_escape(r"\777"), ('\u{1FF}', 4));
		assert_eq!(parse_escape(r"\1017"), ('A', 4));
		assert_eq!(parse_escape(r"\18"), ('\u{1}', 2));
	}

	#[test]
	fn test_line_continuation() {
		assert_eq!(parse_escape("\\\n"), (' ', 2));
		assert_eq!(parse_escape("\\\n\t  x"), (' ', 5));
	}

	#[test]
	fn test_identity_and_tail() {
		assert_eq!(parse_escape(r"\q"), ('q', 2));
		assert_eq!(parse_escape(r"\ "), (' ', 2));
		assert_eq!(parse_escape("\\ö"), ('ö', 3));
		assert_eq!(parse_escape("\\"), ('\\', 1));
	}
}
