//! Token and comma-list resolution against a type's metadata snapshot.

use bitflags::bitflags;
use skald_literal::{is_boolean_start, is_integer_start, parse_boolean, parse_wide_integer, WideInteger};

use crate::cache::Snapshot;
use crate::error::FlagsError;
use crate::format::known_members;
use crate::registry::FlagsType;

bitflags! {
	/// Options for one resolution call.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct ResolveFlags: u8 {
		/// Integer (and, when the engine is configured for it, boolean)
		/// literals may stand in for member names.
		const ALLOW_INTEGER = 1 << 0;
		/// Retry an unknown name once with a leading non-identifier
		/// character stripped.
		const IGNORE_LEADING = 1 << 1;
		/// Unknown names abort instead of contributing nothing.
		const ERROR_ON_NOT_FOUND = 1 << 2;
		/// ASCII case-insensitive name lookup.
		const NO_CASE = 1 << 3;
	}
}

impl Default for ResolveFlags {
	fn default() -> Self {
		Self::ALLOW_INTEGER | Self::IGNORE_LEADING | Self::ERROR_ON_NOT_FOUND
	}
}

/// Whether `ch` can appear in a member name. Anything else in leading
/// position reads as an operator or ignorable decoration.
pub(crate) fn is_identifier_char(ch: char) -> bool {
	ch.is_alphanumeric() || ch == '_'
}

/// The leading-character retry applies to items of at least two
/// characters whose first character is not an identifier character but
/// whose second is.
fn should_ignore_leading(item: &str) -> bool {
	let mut chars = item.chars();
	match (chars.next(), chars.next()) {
		(Some(first), Some(second)) => !is_identifier_char(first) && is_identifier_char(second),
		_ => false,
	}
}

pub(crate) fn bad_value(ty: &FlagsType, snapshot: &Snapshot, member: &str) -> FlagsError {
	FlagsError::UnknownMember {
		type_name: ty.name().into(),
		member: member.into(),
		known: known_members(snapshot).into(),
	}
}

/// Resolves `text` to a canonical value of `ty`.
///
/// A single token that parses as an integer (or boolean, with
/// `boolean_literals`) short-circuits before any comma splitting.
/// Otherwise the text splits on commas into trimmed items, each item
/// resolving through the integer/boolean retries, then ordinal name
/// lookup, then the leading-character retry; resolved items OR together.
///
/// A literal that fails to parse falls through to name lookup; a literal
/// that parses but does not survive the declared-width round trip is a
/// hard error even mid-list.
pub(crate) fn resolve(
	ty: &FlagsType,
	snapshot: &Snapshot,
	text: &str,
	options: ResolveFlags,
	boolean_literals: bool,
) -> Result<u64, FlagsError> {
	let Some(first) = text.chars().next() else {
		return Err(FlagsError::EmptyValue { type_name: ty.name().into() });
	};

	let allow_integer = options.contains(ResolveFlags::ALLOW_INTEGER);

	// Member names cannot begin with a sign or digit, so a whole-text
	// literal parse cannot shadow a name.
	if allow_integer {
		if is_integer_start(first) {
			if let Some(value) = try_integer(ty, text)? {
				return Ok(value);
			}
		}

		if boolean_literals && is_boolean_start(first) {
			if let Some(value) = try_boolean(text) {
				return Ok(value);
			}
		}
	}

	let mut accumulator = 0u64;

	for item in text.split(',') {
		let item = item.trim();
		let Some(first) = item.chars().next() else {
			continue;
		};

		if allow_integer {
			if is_integer_start(first) {
				if let Some(value) = try_integer(ty, item)? {
					accumulator |= value;
					continue;
				}
			}

			if boolean_literals && is_boolean_start(first) {
				if let Some(value) = try_boolean(item) {
					accumulator |= value;
					continue;
				}
			}
		}

		match lookup(snapshot, item, options) {
			Some(index) => accumulator |= snapshot.values()[index],
			None if options.contains(ResolveFlags::ERROR_ON_NOT_FOUND) => {
				return Err(bad_value(ty, snapshot, item));
			}
			None => {}
		}
	}

	Ok(accumulator)
}

/// Integer literal path: `Ok(None)` when the text is not a literal at
/// all, the hard overflow error when it parses but fails the width round
/// trip.
fn try_integer(ty: &FlagsType, text: &str) -> Result<Option<u64>, FlagsError> {
	let Ok(literal) = parse_wide_integer(text) else {
		return Ok(None);
	};

	match ty.repr().narrow(literal) {
		Ok(canonical) => Ok(Some(canonical)),
		Err(converted) => Err(overflow(ty, literal, text, converted)),
	}
}

fn overflow(ty: &FlagsType, literal: WideInteger, text: &str, converted: u64) -> FlagsError {
	let (parsed, converted) = match literal {
		WideInteger::Unsigned(value) => (value.to_string(), converted.to_string()),
		WideInteger::Signed(value) => (value.to_string(), (converted as i64).to_string()),
	};

	FlagsError::Overflow {
		type_name: ty.name().into(),
		parsed: parsed.into(),
		text: text.into(),
		converted: converted.into(),
	}
}

/// Boolean literal path; 1 and 0 fit every width.
fn try_boolean(text: &str) -> Option<u64> {
	parse_boolean(text).ok().map(u64::from)
}

fn lookup(snapshot: &Snapshot, item: &str, options: ResolveFlags) -> Option<usize> {
	let no_case = options.contains(ResolveFlags::NO_CASE);

	if let Some(index) = snapshot.position(item, no_case) {
		return Some(index);
	}

	if options.contains(ResolveFlags::IGNORE_LEADING) && should_ignore_leading(item) {
		let first = item.chars().next()?;
		return snapshot.position(&item[first.len_utf8()..], no_case);
	}

	None
}
