//! Operator-driven combination of an old value with a new-value
//! expression.

use std::borrow::Cow;

use skald_list::split_list;

use crate::cache::Snapshot;
use crate::error::FlagsError;
use crate::mask::{check_operator_allowed, check_value_unmasked};
use crate::op::{FlagsOp, OpSet};
use crate::registry::FlagsType;
use crate::resolve::{self, is_identifier_char, ResolveFlags};

/// Options for one expression evaluation.
#[derive(Debug, Clone, Copy)]
pub struct CombineOptions {
	/// Let integer (and configured boolean) literals stand in for
	/// member names.
	pub allow_integer: bool,
	/// ASCII case-insensitive member lookup.
	pub no_case: bool,
	/// Reject an empty new-value expression instead of returning the
	/// old value untouched.
	pub error_on_nop: bool,
	/// Abort on a masked value or operator instead of skipping the
	/// offending item.
	pub error_on_mask: bool,
}

impl Default for CombineOptions {
	fn default() -> Self {
		Self {
			allow_integer: true,
			no_case: false,
			error_on_nop: false,
			error_on_mask: false,
		}
	}
}

impl CombineOptions {
	/// Item resolution always retries with a stripped leading character
	/// and treats unknown names as hard errors; only the literal and
	/// case toggles flow in from the caller.
	fn resolve_options(self) -> ResolveFlags {
		let mut options = ResolveFlags::IGNORE_LEADING | ResolveFlags::ERROR_ON_NOT_FOUND;
		if self.allow_integer {
			options |= ResolveFlags::ALLOW_INTEGER;
		}
		if self.no_case {
			options |= ResolveFlags::NO_CASE;
		}
		options
	}
}

/// Comma, pipe, and semicolon separate items the same as spaces do.
pub(crate) fn normalize_delimiters(text: &str) -> Cow<'_, str> {
	if text.contains([',', '|', ';']) {
		Cow::Owned(text.replace([',', '|', ';'], " "))
	} else {
		Cow::Borrowed(text)
	}
}

/// An absent old value reads as zero; any failure names the old value
/// and chains the underlying error.
fn resolve_old(
	ty: &FlagsType,
	snapshot: &Snapshot,
	text: &str,
	options: ResolveFlags,
	boolean_literals: bool,
) -> Result<u64, FlagsError> {
	if text.is_empty() {
		return Ok(0);
	}

	resolve::resolve(ty, snapshot, text, options, boolean_literals).map_err(|source| {
		FlagsError::InvalidOldValue {
			type_name: ty.name().into(),
			text: text.into(),
			source: Box::new(source),
		}
	})
}

/// Applies the new-value expression to the old value.
///
/// The expression tokenizes into items, each optionally prefixed by an
/// operator character that becomes the current operator for it and for
/// the items after it. The initial operator replaces the old value and
/// then decays to `+`, so an unprefixed expression reads as "set, then
/// accumulate".
///
/// An operator prefix is recorded before it is validated: a bare item
/// made of an unrecognized character only fails once a later item tries
/// to apply it. The optional mask and permitted-operator set filter each
/// item after its value resolves; with `error_on_mask` unset a filtered
/// item is skipped instead of failing the expression.
pub(crate) fn combine(
	ty: &FlagsType,
	snapshot: &Snapshot,
	old_text: &str,
	new_text: &str,
	mask_text: Option<&str>,
	operators_text: Option<&str>,
	options: CombineOptions,
	boolean_literals: bool,
) -> Result<u64, FlagsError> {
	let resolve_options = options.resolve_options();

	let mask = match mask_text {
		Some(text) => {
			Some(resolve::resolve(ty, snapshot, text, resolve_options, boolean_literals)?)
		}
		None => None,
	};

	let allowed = match operators_text {
		Some(text) => Some(OpSet::parse(ty.name(), text)?),
		None => None,
	};

	if new_text.is_empty() {
		if options.error_on_nop {
			return Err(FlagsError::MissingNewValue { type_name: ty.name().into() });
		}
		return resolve_old(ty, snapshot, old_text, resolve_options, boolean_literals);
	}

	let mut value = resolve_old(ty, snapshot, old_text, resolve_options, boolean_literals)?;

	let normalized = normalize_delimiters(new_text);
	let items = split_list(&normalized)?;

	let mut current = FlagsOp::DEFAULT.glyph();

	for item in &items {
		let mut item = item.trim();
		let Some(first) = item.chars().next() else {
			continue;
		};

		if !is_identifier_char(first) {
			current = first;
			item = item[first.len_utf8()..].trim();
			if item.is_empty() {
				continue;
			}
		}

		let item_value =
			resolve::resolve(ty, snapshot, item, resolve_options, boolean_literals)?;

		if let Some(mask) = mask {
			if let Err(err) = check_value_unmasked(ty, snapshot, item_value, mask) {
				if options.error_on_mask {
					return Err(err);
				}
				continue;
			}
		}

		if let Some(allowed) = allowed {
			if let Err(err) = check_operator_allowed(ty, current, allowed) {
				if options.error_on_mask {
					return Err(err);
				}
				continue;
			}
		}

		let Some(op) = FlagsOp::from_glyph(current) else {
			return Err(FlagsError::BadOperator {
				type_name: ty.name().into(),
				operator: current,
			});
		};

		match op {
			FlagsOp::Select => {}
			FlagsOp::Add => value |= item_value,
			FlagsOp::Remove => value &= !item_value,
			FlagsOp::Set => value = item_value,
			FlagsOp::SetAdd => {
				value = item_value;
				current = FlagsOp::Add.glyph();
			}
			FlagsOp::Keep => value &= item_value,
		}
	}

	Ok(value)
}
