//! The engine service owning the type registry, the metadata cache,
//! and the configuration shared by every resolution.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::algebra::{self, CombineOptions};
use crate::cache::{MetadataCache, Snapshot};
use crate::error::FlagsError;
use crate::format;
use crate::registry::{FlagsType, FlagsTypeReg};
use crate::resolve::{self, ResolveFlags};
use crate::tables::{self, ParamSlots, ParamTables, TableOptions};
use crate::value::FlagsValue;

/// Engine-wide behavior toggles.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
	/// Let boolean words stand in for integer literals during
	/// resolution.
	pub boolean_literals: bool,
	/// Reject flags expressions against types not marked combinable
	/// instead of logging and proceeding.
	pub strict_flags: bool,
}

/// Registered types plus their cached metadata.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct FlagsEngine {
	config: EngineConfig,
	types: RwLock<FxHashMap<Box<str>, FlagsType>>,
	cache: MetadataCache,
}

impl FlagsEngine {
	pub fn new() -> Self {
		Self::with_config(EngineConfig::default())
	}

	pub fn with_config(config: EngineConfig) -> Self {
		Self {
			config,
			types: RwLock::new(FxHashMap::default()),
			cache: MetadataCache::new(),
		}
	}

	pub fn config(&self) -> EngineConfig {
		self.config
	}

	/// Registers every type declared through [`flags_type!`]. Returns
	/// how many were registered.
	///
	/// [`flags_type!`]: crate::flags_type
	pub fn extend_inventory(&self) -> Result<usize, FlagsError> {
		let mut count = 0;
		for reg in inventory::iter::<FlagsTypeReg>() {
			self.register(FlagsType::from_def(reg.0)?)?;
			count += 1;
		}
		Ok(count)
	}

	pub fn register(&self, ty: FlagsType) -> Result<(), FlagsError> {
		let mut types = self.types.write();
		if types.contains_key(ty.name()) {
			return Err(FlagsError::DuplicateType { type_name: ty.name().into() });
		}

		tracing::debug!(
			type_name = %ty.name(),
			members = ty.members().len(),
			flags = ty.is_flags(),
			"registered enumeration"
		);
		types.insert(ty.name().into(), ty);
		Ok(())
	}

	pub fn find_type(&self, name: &str) -> Option<FlagsType> {
		self.types.read().get(name).cloned()
	}

	/// Like [`find_type`](Self::find_type), but an unregistered name is
	/// an error.
	pub fn require_type(&self, name: &str) -> Result<FlagsType, FlagsError> {
		self.find_type(name)
			.ok_or_else(|| FlagsError::UnknownType { type_name: name.into() })
	}

	/// The value-sorted metadata snapshot for a registered type.
	pub fn snapshot(&self, type_name: &str) -> Result<Snapshot, FlagsError> {
		let ty = self.require_type(type_name)?;
		self.cache.snapshot(&ty)
	}

	/// Drops every cached snapshot. Returns how many were evicted.
	pub fn invalidate_cache(&self) -> usize {
		let evicted = self.cache.invalidate();
		tracing::debug!(evicted, "cleared enumeration snapshot cache");
		evicted
	}

	/// Resolves a single token or comma list to a value.
	pub fn resolve_value(
		&self,
		type_name: &str,
		text: &str,
		options: ResolveFlags,
	) -> Result<FlagsValue, FlagsError> {
		let ty = self.require_type(type_name)?;
		let snapshot = self.cache.snapshot(&ty)?;
		let bits =
			resolve::resolve(&ty, &snapshot, text, options, self.config.boolean_literals)?;
		Ok(FlagsValue::new(ty, snapshot, bits))
	}

	/// Applies a new-value expression to an old value.
	pub fn resolve_flags_expression(
		&self,
		type_name: &str,
		old_text: &str,
		new_text: &str,
		mask_text: Option<&str>,
		operators_text: Option<&str>,
		options: CombineOptions,
	) -> Result<FlagsValue, FlagsError> {
		let ty = self.require_type(type_name)?;
		self.check_flags_marker(&ty)?;

		let snapshot = self.cache.snapshot(&ty)?;
		let bits = algebra::combine(
			&ty,
			&snapshot,
			old_text,
			new_text,
			mask_text,
			operators_text,
			options,
			self.config.boolean_literals,
		)?;
		Ok(FlagsValue::new(ty, snapshot, bits))
	}

	/// Renders `bits` as member names. Input wider than the type's
	/// declared width is truncated first.
	pub fn format_value(&self, type_name: &str, bits: u64) -> Result<String, FlagsError> {
		let ty = self.require_type(type_name)?;
		let snapshot = self.cache.snapshot(&ty)?;
		Ok(format::format_value(ty.repr(), &snapshot, ty.repr().truncate(bits)))
	}

	/// Fresh parameter tables with every slot-assigned member written
	/// into its own bucket.
	pub fn fill_tables(
		&self,
		type_name: &str,
		slots: &ParamSlots,
	) -> Result<ParamTables, FlagsError> {
		let ty = self.require_type(type_name)?;
		let snapshot = self.cache.snapshot(&ty)?;

		let mut tables = ParamTables::new(slots);
		tables::fill_tables(&snapshot, slots, &mut tables);
		Ok(tables)
	}

	/// Applies a flags expression in table mode, mutating `tables`.
	pub fn apply_table_expression(
		&self,
		type_name: &str,
		text: &str,
		slots: &ParamSlots,
		tables: &mut ParamTables,
		options: TableOptions,
	) -> Result<(), FlagsError> {
		let ty = self.require_type(type_name)?;
		let snapshot = self.cache.snapshot(&ty)?;
		tables::apply_table_expression(&ty, &snapshot, text, slots, tables, options)
	}

	/// A combinable-bits expression against a plain enumeration is an
	/// error in strict mode and a logged curiosity otherwise.
	fn check_flags_marker(&self, ty: &FlagsType) -> Result<(), FlagsError> {
		if ty.is_flags() {
			return Ok(());
		}

		if self.config.strict_flags {
			return Err(FlagsError::NotFlags { type_name: ty.name().into() });
		}

		tracing::debug!(
			type_name = %ty.name(),
			"flags expression against a plain enumeration"
		);
		Ok(())
	}
}

impl Default for FlagsEngine {
	fn default() -> Self {
		Self::new()
	}
}
