//! # List splitting
//!
//! Splits a script-level list string into its elements. Elements are separated
//! by whitespace; braces and quotes group an element, and backslash escapes
//! join or encode characters inside bare and quoted elements.
//!
//! ## Syntax
//!
//! ```text
//! list      = (ws* element)* ws*
//! element   = braced | quoted | bare
//! braced    = "{" raw "}"          ; nesting counted, content kept verbatim
//! quoted    = '"' cooked '"'       ; escapes decoded
//! bare      = cooked               ; ends at unescaped whitespace
//! ws        = TAB | LF | VT | FF | CR | SPACE
//! escape    = "\" (mnemonic | "x" hex{1,2} | "u" hex{1,4} | octal{1,3}
//!                  | LF ws-run | any)
//! ```
//!
//! A closing brace or quote must be followed by whitespace or the end of the
//! string. Mnemonic escapes are `\a \b \f \n \r \t \v \\`; a backslash before
//! a newline swallows the newline and any following tabs or spaces, producing
//! a single space; any other escaped character stands for itself, so `a\ b`
//! is one element.

use std::fmt;

mod escape;

use escape::parse_escape;

/// Represents an error that occurred while splitting a list.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ListError {
	/// Human-readable description of the error.
	pub message: String,
	/// Byte offset in the input where the error occurred.
	pub position: usize,
}

impl ListError {
	fn new(message: impl Into<String>, position: usize) -> Self {
		Self { message: message.into(), position }
	}
}

impl fmt::Display for ListError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "List error at position {}: {}", self.position, self.message)
	}
}

impl std::error::Error for ListError {}

/// Whether `ch` separates list elements.
#[inline]
pub const fn is_list_whitespace(ch: char) -> bool {
	matches!(ch, '\t' | '\n' | '\u{b}' | '\u{c}' | '\r' | ' ')
}

/// How many characters to quote when reporting trailing garbage.
const ERROR_SCAN_LIMIT: usize = 20;

/// One scanned element: its byte range and whether it was brace-grouped.
struct Element {
	start: usize,
	end: usize,
	braced: bool,
	/// Byte offset just past the element and its closing delimiter.
	next: usize,
}

/// Splits `text` into list elements, decoding escapes in bare and quoted
/// elements and keeping braced content verbatim.
///
/// # Errors
///
/// Returns a [`ListError`] for an unmatched open brace or quote, or when a
/// closing brace or quote is not followed by whitespace or the end of the
/// string.
///
/// # Example
///
/// ```
/// use skald_list::split_list;
///
/// let items = split_list("one {two three} \"four five\"").unwrap();
/// assert_eq!(items, vec!["one", "two three", "four five"]);
/// ```
pub fn split_list(text: &str) -> Result<Vec<String>, ListError> {
	let mut elements = Vec::new();
	let mut index = 0;

	while index < text.len() {
		let element = match find_element(text, index)? {
			Some(element) => element,
			None => break,
		};

		let raw = &text[element.start..element.end];
		if element.braced {
			elements.push(raw.to_owned());
		} else {
			elements.push(unescape(raw));
		}

		index = element.next;
	}

	Ok(elements)
}

/// Scans the next element starting at or after `from`. Returns `None` when
/// only whitespace remains.
fn find_element(text: &str, from: usize) -> Result<Option<Element>, ListError> {
	let bytes = text.as_bytes();
	let mut index = from;

	while index < bytes.len() && is_list_whitespace(bytes[index] as char) {
		index += 1;
	}

	if index >= bytes.len() {
		return Ok(None);
	}

	let element_at = index;
	let mut open_braces = 0usize;
	let mut in_quotes = false;

	match bytes[index] {
		b'{' => {
			open_braces = 1;
			index += 1;
		}
		b'"' => {
			in_quotes = true;
			index += 1;
		}
		_ => {}
	}

	let braced = open_braces != 0;
	let start = index;

	while index < bytes.len() {
		match bytes[index] {
			b'{' if open_braces != 0 => {
				open_braces += 1;
				index += 1;
			}
			b'}' if open_braces > 1 => {
				open_braces -= 1;
				index += 1;
			}
			b'}' if open_braces == 1 => {
				let end = index;
				index += 1;
				require_separator(text, index, "braces")?;
				return Ok(Some(Element { start, end, braced, next: index }));
			}
			b'\\' => {
				let (_, consumed) = parse_escape(&text[index..]);
				index += consumed;
			}
			b'"' if in_quotes => {
				let end = index;
				index += 1;
				require_separator(text, index, "quotes")?;
				return Ok(Some(Element { start, end, braced, next: index }));
			}
			byte if open_braces == 0 && !in_quotes && is_list_whitespace(byte as char) => {
				return Ok(Some(Element { start, end: index, braced, next: index }));
			}
			byte => {
				index += utf8_len(byte);
			}
		}
	}

	if open_braces != 0 {
		return Err(ListError::new("unmatched open brace in list", element_at));
	}
	if in_quotes {
		return Err(ListError::new("unmatched open quote in list", element_at));
	}

	Ok(Some(Element { start, end: index, braced, next: index }))
}

/// After a closing brace or quote, only whitespace or end of string may
/// follow.
fn require_separator(text: &str, index: usize, grouping: &str) -> Result<(), ListError> {
	match text[index..].chars().next() {
		None => Ok(()),
		Some(ch) if is_list_whitespace(ch) => Ok(()),
		Some(_) => {
			let excerpt: String = text[index..]
				.chars()
				.take_while(|ch| !is_list_whitespace(*ch))
				.take(ERROR_SCAN_LIMIT)
				.collect();
			Err(ListError::new(
				format!("list element in {grouping} followed by {excerpt:?} instead of space"),
				index,
			))
		}
	}
}

/// Decodes backslash escapes in a bare or quoted element.
fn unescape(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());
	let mut rest = raw;

	while let Some(at) = rest.find('\\') {
		out.push_str(&rest[..at]);
		let (decoded, consumed) = parse_escape(&rest[at..]);
		out.push(decoded);
		rest = &rest[at + consumed..];
	}

	out.push_str(rest);
	out
}

/// Length in bytes of the UTF-8 sequence introduced by `byte`.
#[inline]
const fn utf8_len(byte: u8) -> usize {
	match byte {
		0x00..=0x7F => 1,
		0xC0..=0xDF => 2,
		0xE0..=0xEF => 3,
		_ => 4,
	}
}
