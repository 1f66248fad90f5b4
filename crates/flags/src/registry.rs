//! Flags type registration.
//!
//! Types reach the engine two ways: statically, by declaring a
//! [`FlagsTypeDef`] (usually through the [`flags_type!`] macro) and
//! submitting it for collection, or at runtime through
//! [`FlagsTypeBuilder`]. Both produce a [`FlagsType`] handle, a cheap
//! clone that the resolver and algebra carry around.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::error::FlagsError;
use crate::repr::Repr;
use crate::resolve::is_identifier_char;

/// A statically declared flags type, collected at startup.
pub struct FlagsTypeDef {
	pub name: &'static str,
	pub repr: Repr,
	/// Whether members combine as bits. Plain enumerations leave this off.
	pub flags: bool,
	/// Declaration-ordered `(name, raw value)` pairs.
	pub members: &'static [(&'static str, i64)],
}

/// Wrapper for `inventory::collect!`.
pub struct FlagsTypeReg(pub &'static FlagsTypeDef);

inventory::collect!(FlagsTypeReg);

/// Declares a static flags type and submits it for collection.
///
/// ```ignore
/// skald_flags::flags_type! {
///     pub static SEVERITY: "Severity", U32, flags: true, members: [
///         "None" = 0,
///         "Low" = 0x1,
///         "Medium" = 0x2,
///         "High" = 0x4,
///     ]
/// }
/// ```
///
/// The engine picks these up via
/// [`extend_inventory`](crate::FlagsEngine::extend_inventory).
#[macro_export]
macro_rules! flags_type {
	(
		$vis:vis static $ident:ident: $name:literal, $repr:ident,
		flags: $flags:expr,
		members: [ $( $member:literal = $value:expr ),* $(,)? ]
		$(,)?
	) => {
		$vis static $ident: $crate::FlagsTypeDef = $crate::FlagsTypeDef {
			name: $name,
			repr: $crate::Repr::$repr,
			flags: $flags,
			members: &[ $( ($member, $value) ),* ],
		};

		inventory::submit! { $crate::FlagsTypeReg(&$ident) }
	};
}

/// One declared member of a flags type.
#[derive(Debug, Clone)]
pub struct FlagsMember {
	pub name: Box<str>,
	/// Raw declaration value; canonicalized to the type's width when
	/// snapshots are built.
	pub value: i64,
}

#[derive(Debug)]
struct TypeInner {
	name: Box<str>,
	repr: Repr,
	flags: bool,
	members: Vec<FlagsMember>,
}

/// Handle to a registered type.
///
/// Equality is identity: two handles compare equal only when they refer to
/// the same registration. The metadata cache keys on that identity.
#[derive(Debug, Clone)]
pub struct FlagsType(Arc<TypeInner>);

impl FlagsType {
	pub(crate) fn from_def(def: &FlagsTypeDef) -> Result<Self, FlagsError> {
		let members: Vec<FlagsMember> = def
			.members
			.iter()
			.map(|&(name, value)| FlagsMember { name: name.into(), value })
			.collect();
		Self::from_parts(def.name.into(), def.repr, def.flags, members)
	}

	fn from_parts(
		name: Box<str>,
		repr: Repr,
		flags: bool,
		members: Vec<FlagsMember>,
	) -> Result<Self, FlagsError> {
		validate_members(&name, &members)?;
		Ok(Self(Arc::new(TypeInner { name, repr, flags, members })))
	}

	pub fn name(&self) -> &str {
		&self.0.name
	}

	pub fn repr(&self) -> Repr {
		self.0.repr
	}

	/// Whether the type carries the combinable-bits marker.
	pub fn is_flags(&self) -> bool {
		self.0.flags
	}

	/// Members in declaration order, raw values.
	pub fn members(&self) -> &[FlagsMember] {
		&self.0.members
	}

	/// Cache identity for this registration.
	pub(crate) fn key(&self) -> usize {
		Arc::as_ptr(&self.0) as usize
	}
}

impl PartialEq for FlagsType {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Eq for FlagsType {}

/// Builds an owned type registration at runtime.
pub struct FlagsTypeBuilder {
	name: Box<str>,
	repr: Repr,
	flags: bool,
	members: Vec<FlagsMember>,
}

impl FlagsTypeBuilder {
	pub fn new(name: impl Into<Box<str>>, repr: Repr) -> Self {
		Self { name: name.into(), repr, flags: false, members: Vec::new() }
	}

	/// Marks the type's members as combinable bits.
	pub fn flags(mut self, flags: bool) -> Self {
		self.flags = flags;
		self
	}

	pub fn member(mut self, name: impl Into<Box<str>>, value: i64) -> Self {
		self.members.push(FlagsMember { name: name.into(), value });
		self
	}

	/// Validates member names and produces the handle.
	///
	/// # Errors
	///
	/// [`FlagsError::InvalidMember`] for an empty name or one containing a
	/// character the resolver could never match back;
	/// [`FlagsError::DuplicateMember`] for a repeated name.
	pub fn build(self) -> Result<FlagsType, FlagsError> {
		FlagsType::from_parts(self.name, self.repr, self.flags, self.members)
	}
}

/// Member names must be non-empty identifiers: the expression grammar
/// claims every non-identifier leading character as an operator, and the
/// resolver splits items on commas.
fn validate_members(type_name: &str, members: &[FlagsMember]) -> Result<(), FlagsError> {
	let mut seen = FxHashSet::default();

	for member in members {
		if member.name.is_empty() || !member.name.chars().all(is_identifier_char) {
			return Err(FlagsError::InvalidMember {
				type_name: type_name.into(),
				member: member.name.clone(),
			});
		}

		if !seen.insert(member.name.as_ref()) {
			return Err(FlagsError::DuplicateMember {
				type_name: type_name.into(),
				member: member.name.clone(),
			});
		}
	}

	Ok(())
}
