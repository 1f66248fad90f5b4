//! Caller-supplied filters applied to each item of an expression.

use crate::cache::Snapshot;
use crate::error::FlagsError;
use crate::format::format_value;
use crate::op::{FlagsOp, OpSet};
use crate::registry::FlagsType;

/// Rejects `candidate` when it carries bits outside `mask`.
pub(crate) fn check_value_unmasked(
	ty: &FlagsType,
	snapshot: &Snapshot,
	candidate: u64,
	mask: u64,
) -> Result<(), FlagsError> {
	let residual = candidate & !mask;
	if residual == 0 {
		return Ok(());
	}

	let repr = ty.repr();
	Err(FlagsError::MaskedValue {
		type_name: ty.name().into(),
		value_names: format_value(repr, snapshot, candidate).into(),
		residual: repr.render(residual).into(),
		mask_names: format_value(repr, snapshot, mask).into(),
		mask_bits: repr.render(mask).into(),
	})
}

/// Rejects `operator` when it is not in the permitted set. A character
/// that is no operator at all is never a member.
pub(crate) fn check_operator_allowed(
	ty: &FlagsType,
	operator: char,
	allowed: OpSet,
) -> Result<(), FlagsError> {
	if FlagsOp::from_glyph(operator).is_some_and(|op| allowed.permits(op)) {
		return Ok(());
	}

	Err(FlagsError::OperatorNotAllowed {
		type_name: ty.name().into(),
		operator,
		allowed: allowed.describe().into(),
	})
}
