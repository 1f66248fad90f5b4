//! A resolved value paired with the metadata that prints it.

use std::fmt;

use crate::cache::Snapshot;
use crate::format::format_value;
use crate::registry::FlagsType;

/// A canonical value of a registered enumeration.
///
/// Carries the metadata snapshot it was resolved against, so displaying
/// the value decomposes it into member names without touching the cache
/// again. Equality compares type identity and bit pattern.
#[derive(Debug, Clone)]
pub struct FlagsValue {
	ty: FlagsType,
	snapshot: Snapshot,
	bits: u64,
}

impl FlagsValue {
	pub(crate) fn new(ty: FlagsType, snapshot: Snapshot, bits: u64) -> Self {
		Self { ty, snapshot, bits }
	}

	pub fn ty(&self) -> &FlagsType {
		&self.ty
	}

	/// The canonical bit pattern, zero extended to 64 bits.
	pub fn bits(&self) -> u64 {
		self.bits
	}

	pub fn is_zero(&self) -> bool {
		self.bits == 0
	}

	/// The value rendered as a bare number in the declared domain.
	pub fn render_numeric(&self) -> String {
		self.ty.repr().render(self.bits)
	}
}

impl PartialEq for FlagsValue {
	fn eq(&self, other: &Self) -> bool {
		self.ty == other.ty && self.bits == other.bits
	}
}

impl Eq for FlagsValue {}

impl fmt::Display for FlagsValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&format_value(self.ty.repr(), &self.snapshot, self.bits))
	}
}
