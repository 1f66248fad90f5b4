use bitflags::bitflags;

use crate::error::FlagsError;
use crate::format::english_or;

/// One operator in a flags expression.
///
/// An expression walks its items with a current operator that starts as
/// [`SetAdd`](Self::SetAdd) and can be switched by prefixing an item with
/// an operator glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagsOp {
	/// `/` selects a parameter table; applied to a plain value it has no
	/// effect.
	Select,
	/// `+` ORs the operand into the value.
	Add,
	/// `-` clears the operand's bits.
	Remove,
	/// `=` replaces the value.
	Set,
	/// `:` replaces the value, then later items add.
	SetAdd,
	/// `&` keeps only the operand's bits.
	Keep,
}

impl FlagsOp {
	/// Operator state at the start of an expression.
	pub const DEFAULT: Self = Self::SetAdd;

	pub const fn glyph(self) -> char {
		match self {
			Self::Select => '/',
			Self::Add => '+',
			Self::Remove => '-',
			Self::Set => '=',
			Self::SetAdd => ':',
			Self::Keep => '&',
		}
	}

	pub const fn from_glyph(ch: char) -> Option<Self> {
		match ch {
			'/' => Some(Self::Select),
			'+' => Some(Self::Add),
			'-' => Some(Self::Remove),
			'=' => Some(Self::Set),
			':' => Some(Self::SetAdd),
			'&' => Some(Self::Keep),
			_ => None,
		}
	}
}

bitflags! {
	/// The set of operators a caller permits for one expression.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct OpSet: u8 {
		const SELECT = 1 << 0;
		const ADD = 1 << 1;
		const REMOVE = 1 << 2;
		const SET = 1 << 3;
		const SET_ADD = 1 << 4;
		const KEEP = 1 << 5;
	}
}

impl OpSet {
	/// Permitted set for an empty specification: addition only. The
	/// expression's initial `:` operator is not in it, so callers working
	/// under the default set must prefix the first item explicitly.
	pub const DEFAULT: Self = Self::ADD;

	pub const fn bit(op: FlagsOp) -> Self {
		match op {
			FlagsOp::Select => Self::SELECT,
			FlagsOp::Add => Self::ADD,
			FlagsOp::Remove => Self::REMOVE,
			FlagsOp::Set => Self::SET,
			FlagsOp::SetAdd => Self::SET_ADD,
			FlagsOp::Keep => Self::KEEP,
		}
	}

	pub fn permits(self, op: FlagsOp) -> bool {
		self.contains(Self::bit(op))
	}

	/// Parses a permitted-operator specification.
	///
	/// Empty input selects [`OpSet::DEFAULT`]; otherwise the input is
	/// trimmed and every remaining character must be an operator glyph.
	/// A whitespace-only specification therefore trims to the empty set,
	/// permitting nothing.
	///
	/// # Errors
	///
	/// [`FlagsError::BadOperator`] for any non-operator character.
	pub fn parse(type_name: &str, text: &str) -> Result<Self, FlagsError> {
		if text.is_empty() {
			return Ok(Self::DEFAULT);
		}

		let mut set = Self::empty();
		for ch in text.trim().chars() {
			match FlagsOp::from_glyph(ch) {
				Some(op) => set |= Self::bit(op),
				None => {
					return Err(FlagsError::BadOperator {
						type_name: type_name.into(),
						operator: ch,
					});
				}
			}
		}

		Ok(set)
	}

	/// English "or" list of the permitted glyphs, for diagnostics.
	pub(crate) fn describe(self) -> String {
		const ORDER: [FlagsOp; 6] = [
			FlagsOp::Select,
			FlagsOp::Add,
			FlagsOp::Remove,
			FlagsOp::Set,
			FlagsOp::SetAdd,
			FlagsOp::Keep,
		];

		english_or(
			ORDER
				.iter()
				.filter(|&&op| self.permits(op))
				.map(|op| format!("'{}'", op.glyph())),
		)
	}
}
