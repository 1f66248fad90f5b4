use skald_literal::WideInteger;

/// Declared width and signedness of a registered enumeration.
///
/// Every value of a type is held as a canonical `u64` bit pattern masked to
/// this width; the repr decides how literals narrow into that form, how raw
/// declaration values widen, and how leftovers render back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repr {
	I32,
	U32,
	I64,
	U64,
}

impl Repr {
	/// Width of the underlying integer in bits.
	pub const fn bits(self) -> u32 {
		match self {
			Self::I32 | Self::U32 => 32,
			Self::I64 | Self::U64 => 64,
		}
	}

	pub const fn is_signed(self) -> bool {
		matches!(self, Self::I32 | Self::I64)
	}

	/// All-ones pattern for the declared width.
	pub const fn mask(self) -> u64 {
		match self {
			Self::I32 | Self::U32 => u32::MAX as u64,
			Self::I64 | Self::U64 => u64::MAX,
		}
	}

	/// Masks `bits` down to the declared width.
	pub const fn truncate(self, bits: u64) -> u64 {
		bits & self.mask()
	}

	/// Canonicalizes a raw declaration value. A member declared `-1` on a
	/// 32-bit type keeps only its low 32 bits.
	pub const fn widen(self, raw: i64) -> u64 {
		self.truncate(raw as u64)
	}

	/// Sign-extends a canonical value back to the full 64-bit domain.
	pub const fn sign_extend(self, canonical: u64) -> u64 {
		if self.bits() == 64 {
			return canonical;
		}
		let sign = 1u64 << (self.bits() - 1);
		if canonical & sign != 0 { canonical | !self.mask() } else { canonical }
	}

	/// Narrows a parsed literal to the declared width, verifying that
	/// widening back out in the literal's own domain reproduces the
	/// original bit pattern. An unsigned literal widens with zeros, a
	/// signed one with its sign.
	///
	/// Returns the canonical value, or the mismatching re-widened value
	/// for diagnostics.
	pub const fn narrow(self, literal: WideInteger) -> Result<u64, u64> {
		let wide = literal.as_bits();
		let canonical = self.truncate(wide);
		let converted = match literal {
			WideInteger::Unsigned(_) => canonical,
			WideInteger::Signed(_) => self.sign_extend(canonical),
		};
		if converted == wide { Ok(canonical) } else { Err(converted) }
	}

	/// Renders a canonical value in the declared domain: two's complement
	/// decimal for signed reprs, plain decimal otherwise.
	pub fn render(self, canonical: u64) -> String {
		if self.is_signed() {
			(self.sign_extend(canonical) as i64).to_string()
		} else {
			canonical.to_string()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_widen_masks_to_width() {
		assert_eq!(Repr::I32.widen(-1), 0xFFFF_FFFF);
		assert_eq!(Repr::I64.widen(-1), u64::MAX);
		assert_eq!(Repr::U32.widen(0x10), 0x10);
	}

	#[test]
	fn test_narrow_accepts_width_exact_values() {
		// All 32 bits set, written unsigned: survives on a 32-bit type.
		assert_eq!(Repr::I32.narrow(WideInteger::Unsigned(0xFFFF_FFFF)), Ok(0xFFFF_FFFF));
		// Written signed: -1 also lands on the all-ones pattern.
		assert_eq!(Repr::I32.narrow(WideInteger::Signed(-1)), Ok(0xFFFF_FFFF));
		assert_eq!(Repr::U64.narrow(WideInteger::Unsigned(u64::MAX)), Ok(u64::MAX));
	}

	#[test]
	fn test_narrow_rejects_out_of_width_values() {
		// One past the 32-bit domain.
		assert_eq!(Repr::U32.narrow(WideInteger::Unsigned(0x1_0000_0000)), Err(0));
		assert_eq!(Repr::I32.narrow(WideInteger::Signed(-4_294_967_296)), Err(0));
		// Sign-extension mismatch: 0x8000_0000 written signed as a
		// positive wide value does not survive an i32 round trip.
		assert_eq!(
			Repr::I32.narrow(WideInteger::Signed(0x8000_0000)),
			Err(0xFFFF_FFFF_8000_0000)
		);
	}

	#[test]
	fn test_render_signed_domain() {
		assert_eq!(Repr::I32.render(0xFFFF_FFFF), "-1");
		assert_eq!(Repr::U32.render(0xFFFF_FFFF), "4294967295");
		assert_eq!(Repr::I64.render(u64::MAX), "-1");
	}
}
