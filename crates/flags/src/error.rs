use skald_list::ListError;
use thiserror::Error;

/// Errors produced by registration, resolution, and the operator algebra.
///
/// Message shapes are part of the public contract: hosts surface them to
/// scripts verbatim, and the test suite asserts on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagsError {
	/// No type with this name is registered with the engine.
	#[error("type {type_name:?} is not a registered enumeration")]
	UnknownType { type_name: Box<str> },

	/// The type is registered but not marked combinable, and the engine
	/// is configured to reject plain enumerations in flags expressions.
	#[error("type {type_name:?} is not a flags enumeration")]
	NotFlags { type_name: Box<str> },

	/// Empty input where a value token was required.
	#[error("invalid {type_name} value")]
	EmptyValue { type_name: Box<str> },

	/// A token matched no member name. `known` carries the English "or"
	/// list of the type's member names, pre-rendered by the caller.
	#[error("bad {type_name} value {member:?}: must be {known}")]
	UnknownMember {
		type_name: Box<str>,
		member: Box<str>,
		known: Box<str>,
	},

	/// Snapshot name and value lists disagree in length even after a
	/// rebuild.
	#[error("count mismatch, enumeration names {names} versus enumeration values {values}")]
	CountMismatch { names: usize, values: usize },

	/// An operator character outside the recognized set.
	#[error("bad {type_name} flags operator {operator:?}, must be '/', '+', '-', '=', ':', or '&'")]
	BadOperator { type_name: Box<str>, operator: char },

	/// A recognized operator excluded by the caller's permitted set.
	/// `allowed` carries the English "or" list of the permitted
	/// characters, pre-rendered by the caller.
	#[error("bad {type_name} flags operator {operator:?}, must be {allowed}")]
	OperatorNotAllowed {
		type_name: Box<str>,
		operator: char,
		allowed: Box<str>,
	},

	/// A candidate value carries bits outside the caller's mask.
	/// `residual` is the offending portion and every numeric field is
	/// pre-rendered in the type's declared domain.
	#[error("bad {type_name} flags value(s) {value_names:?} ({residual}), must be {mask_names:?} ({mask_bits})")]
	MaskedValue {
		type_name: Box<str>,
		value_names: Box<str>,
		residual: Box<str>,
		mask_names: Box<str>,
		mask_bits: Box<str>,
	},

	/// An empty new-value expression while the caller demanded an effect.
	#[error("invalid {type_name} new value \"\"")]
	MissingNewValue { type_name: Box<str> },

	/// An integer literal parsed but did not survive the round trip
	/// through the type's declared width.
	#[error(
		"bad {type_name}, integer value \"{parsed}\" (parsed from {text:?}), \
		 does not match converted integer value \"{converted}\""
	)]
	Overflow {
		type_name: Box<str>,
		parsed: Box<str>,
		text: Box<str>,
		converted: Box<str>,
	},

	/// Old-value context around an inner resolution failure.
	#[error("invalid {type_name} old value {text:?}: {source}")]
	InvalidOldValue {
		type_name: Box<str>,
		text: Box<str>,
		source: Box<FlagsError>,
	},

	/// Tokenizer failure inside an expression.
	#[error(transparent)]
	List(#[from] ListError),

	#[error("flags type {type_name:?} is already registered")]
	DuplicateType { type_name: Box<str> },

	#[error("duplicate member {member:?} for flags type {type_name:?}")]
	DuplicateMember {
		type_name: Box<str>,
		member: Box<str>,
	},

	/// A member name the resolver could never match back.
	#[error("invalid member name {member:?} for flags type {type_name:?}")]
	InvalidMember {
		type_name: Box<str>,
		member: Box<str>,
	},

	/// Table mode: a resolved member has no parameter slot assigned.
	#[error("missing table for {type_name} name {name:?}")]
	MissingTable {
		type_name: Box<str>,
		name: Box<str>,
	},

	/// Table mode: an explicit slot selector that is unparsable or out
	/// of range.
	#[error("missing table for {type_name} index {index:?}")]
	MissingTableIndex {
		type_name: Box<str>,
		index: Box<str>,
	},

	/// Table mode: an expression with no elements while the caller
	/// demanded at least one.
	#[error("empty modifiers list")]
	EmptyModifiers,

	/// A name pattern the glob compiler rejects.
	#[error("bad pattern {pattern:?}: {message}")]
	BadPattern {
		pattern: Box<str>,
		message: Box<str>,
	},
}
