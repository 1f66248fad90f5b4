//! Bucketing of member names into caller-indexed parameter slots.
//!
//! A flags expression in table mode does not produce one combined value.
//! Each resolved member lands in a bucket keyed by canonical name, one
//! bucket per parameter slot, and the caller reduces the buckets to
//! per-slot values afterwards.

use globset::{GlobBuilder, GlobMatcher};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use skald_list::split_list;
use skald_literal::{parse_wide_integer, WideInteger};

use crate::algebra::normalize_delimiters;
use crate::cache::Snapshot;
use crate::error::FlagsError;
use crate::op::FlagsOp;
use crate::registry::FlagsType;
use crate::resolve::{bad_value, is_identifier_char};

/// One slot's bucket: canonical member name to canonical value.
pub type Bucket = IndexMap<Box<str>, u64>;

/// Member-to-slot assignments. The slot count is one past the highest
/// assigned index.
#[derive(Debug, Clone, Default)]
pub struct ParamSlots {
	slots: FxHashMap<Box<str>, usize>,
	table_count: usize,
}

impl ParamSlots {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn assign(&mut self, member: &str, slot: usize) -> &mut Self {
		self.slots.insert(member.into(), slot);
		self.table_count = self.table_count.max(slot + 1);
		self
	}

	pub fn table_count(&self) -> usize {
		self.table_count
	}

	fn slot_of(&self, member: &str) -> Option<usize> {
		self.slots.get(member).copied()
	}
}

/// Per-slot buckets, sized to the assignment's slot count. Individual
/// buckets are created as members land in them.
#[derive(Debug, Clone)]
pub struct ParamTables {
	tables: Vec<Option<Bucket>>,
}

impl ParamTables {
	/// One (initially absent) bucket per slot of `slots`.
	pub fn new(slots: &ParamSlots) -> Self {
		Self { tables: vec![None; slots.table_count()] }
	}

	/// Number of parameter slots.
	pub fn len(&self) -> usize {
		self.tables.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tables.is_empty()
	}

	/// The bucket at `slot`, if one has been created.
	pub fn get(&self, slot: usize) -> Option<&Bucket> {
		self.tables.get(slot).and_then(Option::as_ref)
	}

	/// Reduces each slot to the OR of its bucket's values, one entry
	/// per slot. A slot whose bucket never materialized reduces to
	/// zero.
	pub fn parameter_values(&self) -> Vec<u64> {
		self.tables
			.iter()
			.map(|table| match table {
				Some(bucket) => bucket.values().fold(0, |acc, value| acc | value),
				None => 0,
			})
			.collect()
	}

	fn bucket_mut(&mut self, slots: &ParamSlots, slot: usize) -> Option<&mut Bucket> {
		if slot >= slots.table_count() {
			return None;
		}
		if self.tables.len() < slots.table_count() {
			self.tables.resize_with(slots.table_count(), || None);
		}
		Some(self.tables[slot].get_or_insert_with(Bucket::new))
	}
}

/// Options for one table-mode expression.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableOptions {
	/// ASCII case-insensitive name and pattern matching.
	pub no_case: bool,
	/// Reject an expression that tokenizes to nothing.
	pub error_on_empty: bool,
	/// Unknown member names abort instead of being skipped.
	pub error_on_not_found: bool,
}

/// Writes every slot-assigned member into its own bucket.
pub(crate) fn fill_tables(snapshot: &Snapshot, slots: &ParamSlots, tables: &mut ParamTables) {
	for (name, value) in snapshot.names().iter().zip(snapshot.values()) {
		let Some(slot) = slots.slot_of(name) else {
			continue;
		};
		if let Some(bucket) = tables.bucket_mut(slots, slot) {
			bucket.insert(name.clone(), *value);
		}
	}
}

fn build_matcher(pattern: &str, no_case: bool) -> Result<GlobMatcher, FlagsError> {
	GlobBuilder::new(pattern)
		.case_insensitive(no_case)
		.literal_separator(false)
		.backslash_escape(true)
		.build()
		.map(|glob| glob.compile_matcher())
		.map_err(|err| FlagsError::BadPattern {
			pattern: pattern.into(),
			message: err.kind().to_string().into(),
		})
}

/// Exact ordinal lookup first, then the first snapshot member whose
/// name matches the item as a glob pattern.
fn lookup_member(
	snapshot: &Snapshot,
	item: &str,
	no_case: bool,
) -> Result<Option<(usize, bool)>, FlagsError> {
	if let Some(index) = snapshot.position(item, no_case) {
		return Ok(Some((index, true)));
	}

	let matcher = build_matcher(item, no_case)?;
	Ok(snapshot
		.names()
		.iter()
		.position(|name| matcher.is_match(name.as_ref()))
		.map(|index| (index, false)))
}

/// An explicit slot selector must parse as an in-range index.
fn parse_slot(ty: &FlagsType, text: &str, slots: &ParamSlots) -> Result<usize, FlagsError> {
	let index = parse_wide_integer(text).ok().and_then(|literal| match literal {
		WideInteger::Unsigned(value) => usize::try_from(value).ok(),
		WideInteger::Signed(value) => usize::try_from(value).ok(),
	});

	match index {
		Some(slot) if slot < slots.table_count() => Ok(slot),
		_ => Err(FlagsError::MissingTableIndex {
			type_name: ty.name().into(),
			index: text.into(),
		}),
	}
}

/// Applies a flags expression in table mode.
///
/// The expression grammar matches the combining engine: operator
/// prefixes update a current-operator state that starts at the
/// set-then-add default. The differences are that `/` selects an
/// explicit slot for the one item that follows, and that items mutate
/// buckets instead of a running value: `+` writes the member into the
/// target bucket (a pattern fans out, each matched member to its own
/// slot), `-` and `&` delete or retain target-bucket keys matching the
/// item as a pattern, `=` and `:` clear the target bucket first.
///
/// The target bucket is the selected slot when a selection is pending,
/// otherwise the slot assigned to the matched member. A skipped unknown
/// item leaves a pending selection in place.
pub(crate) fn apply_table_expression(
	ty: &FlagsType,
	snapshot: &Snapshot,
	text: &str,
	slots: &ParamSlots,
	tables: &mut ParamTables,
	options: TableOptions,
) -> Result<(), FlagsError> {
	if text.is_empty() {
		return Err(FlagsError::EmptyValue { type_name: ty.name().into() });
	}

	let normalized = normalize_delimiters(text);
	let items = split_list(&normalized)?;

	if items.is_empty() {
		if options.error_on_empty {
			return Err(FlagsError::EmptyModifiers);
		}
		return Ok(());
	}

	let mut selected: Option<usize> = None;
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

		if current == FlagsOp::Select.glyph() {
			selected = Some(parse_slot(ty, item, slots)?);
			current = FlagsOp::DEFAULT.glyph();
			continue;
		}

		let (index, exact) = match lookup_member(snapshot, item, options.no_case)? {
			Some(found) => found,
			None if options.error_on_not_found => {
				return Err(bad_value(ty, snapshot, item));
			}
			None => continue,
		};

		let canonical = &snapshot.names()[index];
		let value = snapshot.values()[index];

		let target = match selected {
			Some(slot) => slot,
			None => match slots.slot_of(canonical) {
				Some(slot) => slot,
				None => {
					return Err(FlagsError::MissingTable {
						type_name: ty.name().into(),
						name: canonical.as_ref().into(),
					});
				}
			},
		};

		let Some(op) = FlagsOp::from_glyph(current) else {
			return Err(FlagsError::BadOperator {
				type_name: ty.name().into(),
				operator: current,
			});
		};

		let mut add = false;
		match op {
			FlagsOp::Select => unreachable!("selection is handled before lookup"),
			FlagsOp::Add => add = true,
			FlagsOp::Remove => {
				let matcher = build_matcher(item, options.no_case)?;
				if let Some(bucket) = tables.bucket_mut(slots, target) {
					bucket.retain(|key, _| !matcher.is_match(key.as_ref()));
				}
			}
			FlagsOp::Set => {
				if let Some(bucket) = tables.bucket_mut(slots, target) {
					bucket.clear();
				}
				add = true;
			}
			FlagsOp::SetAdd => {
				if let Some(bucket) = tables.bucket_mut(slots, target) {
					bucket.clear();
				}
				current = FlagsOp::Add.glyph();
				add = true;
			}
			FlagsOp::Keep => {
				let matcher = build_matcher(item, options.no_case)?;
				if let Some(bucket) = tables.bucket_mut(slots, target) {
					bucket.retain(|key, _| matcher.is_match(key.as_ref()));
				}
			}
		}

		if add {
			if exact {
				if let Some(bucket) = tables.bucket_mut(slots, target) {
					bucket.insert(canonical.clone(), value);
				}
			} else {
				// A pattern fans out to every matching member's own
				// slot, ignoring any pending selection.
				add_matches(ty, snapshot, item, slots, tables, options.no_case)?;
			}
		}

		selected = None;
	}

	Ok(())
}

/// Writes each member matching `pattern` into its own slot's bucket.
fn add_matches(
	ty: &FlagsType,
	snapshot: &Snapshot,
	pattern: &str,
	slots: &ParamSlots,
	tables: &mut ParamTables,
	no_case: bool,
) -> Result<(), FlagsError> {
	let matcher = build_matcher(pattern, no_case)?;

	for (name, value) in snapshot.names().iter().zip(snapshot.values()) {
		if !matcher.is_match(name.as_ref()) {
			continue;
		}

		let Some(slot) = slots.slot_of(name) else {
			return Err(FlagsError::MissingTable {
				type_name: ty.name().into(),
				name: name.as_ref().into(),
			});
		};

		if let Some(bucket) = tables.bucket_mut(slots, slot) {
			bucket.insert(name.clone(), *value);
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cache::MetadataCache;
	use crate::registry::FlagsTypeBuilder;
	use crate::repr::Repr;

	fn wait_flags() -> (FlagsType, Snapshot) {
		let ty = FlagsTypeBuilder::new("WaitFlags", Repr::U64)
			.flags(true)
			.member("StopOnError", 0x1)
			.member("StopOnSignal", 0x2)
			.member("KeepAlive", 0x10)
			.member("KeepOrder", 0x20)
			.member("Verbose", 0x100)
			.build()
			.unwrap();
		let snapshot = MetadataCache::new().snapshot(&ty).unwrap();
		(ty, snapshot)
	}

	fn slots() -> ParamSlots {
		let mut slots = ParamSlots::new();
		slots
			.assign("StopOnError", 0)
			.assign("StopOnSignal", 0)
			.assign("KeepAlive", 1)
			.assign("KeepOrder", 1)
			.assign("Verbose", 2);
		slots
	}

	fn apply(text: &str, options: TableOptions) -> Result<ParamTables, FlagsError> {
		let (ty, snapshot) = wait_flags();
		let slots = slots();
		let mut tables = ParamTables::new(&slots);
		apply_table_expression(&ty, &snapshot, text, &slots, &mut tables, options)?;
		Ok(tables)
	}

	fn keys(tables: &ParamTables, slot: usize) -> Vec<&str> {
		tables
			.get(slot)
			.map(|bucket| bucket.keys().map(AsRef::as_ref).collect())
			.unwrap_or_default()
	}

	#[test]
	fn test_fill_populates_assigned_slots() {
		let (_, snapshot) = wait_flags();
		let slots = slots();
		let mut tables = ParamTables::new(&slots);
		fill_tables(&snapshot, &slots, &mut tables);

		assert_eq!(keys(&tables, 0), ["StopOnError", "StopOnSignal"]);
		assert_eq!(keys(&tables, 1), ["KeepAlive", "KeepOrder"]);
		assert_eq!(keys(&tables, 2), ["Verbose"]);
		assert_eq!(tables.parameter_values(), [0x3, 0x30, 0x100]);
	}

	#[test]
	fn test_fill_skips_unassigned_members() {
		let (_, snapshot) = wait_flags();
		let mut slots = ParamSlots::new();
		slots.assign("Verbose", 0);

		let mut tables = ParamTables::new(&slots);
		fill_tables(&snapshot, &slots, &mut tables);
		assert_eq!(keys(&tables, 0), ["Verbose"]);
		assert_eq!(tables.parameter_values(), [0x100]);
	}

	#[test]
	fn test_fill_with_unmatched_names_keeps_slot_count() {
		let (_, snapshot) = wait_flags();
		let mut slots = ParamSlots::new();
		slots.assign("Discarded", 0).assign("Retired", 1);

		let mut tables = ParamTables::new(&slots);
		fill_tables(&snapshot, &slots, &mut tables);
		assert_eq!(tables.parameter_values(), [0, 0]);
	}

	#[test]
	fn test_exact_add_targets_member_slot() {
		let tables = apply("+StopOnError +Verbose", TableOptions::default()).unwrap();
		assert_eq!(keys(&tables, 0), ["StopOnError"]);
		assert_eq!(keys(&tables, 2), ["Verbose"]);
		assert_eq!(tables.parameter_values(), [0x1, 0, 0x100]);
	}

	#[test]
	fn test_pattern_add_fans_out_to_own_slots() {
		let tables = apply("+Keep*", TableOptions::default()).unwrap();
		assert_eq!(keys(&tables, 1), ["KeepAlive", "KeepOrder"]);
		assert_eq!(tables.parameter_values(), [0, 0x30, 0]);
	}

	#[test]
	fn test_default_operator_clears_then_adds() {
		let (ty, snapshot) = wait_flags();
		let slots = slots();
		let mut tables = ParamTables::new(&slots);
		fill_tables(&snapshot, &slots, &mut tables);

		// The leading implicit `:` clears StopOnError's bucket before
		// writing it back alone; the decayed `+` leaves slot 1 intact.
		apply_table_expression(
			&ty,
			&snapshot,
			"StopOnError KeepAlive",
			&slots,
			&mut tables,
			TableOptions::default(),
		)
		.unwrap();

		assert_eq!(keys(&tables, 0), ["StopOnError"]);
		assert_eq!(keys(&tables, 1), ["KeepAlive", "KeepOrder"]);
	}

	#[test]
	fn test_select_redirects_one_item() {
		let tables = apply("/2 +StopOnError +StopOnSignal", TableOptions::default()).unwrap();
		// The selection covers the first add only.
		assert_eq!(keys(&tables, 2), ["StopOnError"]);
		assert_eq!(keys(&tables, 0), ["StopOnSignal"]);
	}

	#[test]
	fn test_select_survives_a_skipped_item() {
		let tables = apply("/2 +Bogus +StopOnError", TableOptions::default()).unwrap();
		assert_eq!(keys(&tables, 2), ["StopOnError"]);
	}

	#[test]
	fn test_select_rejects_bad_indexes() {
		let err = apply("/9 +Verbose", TableOptions::default()).unwrap_err();
		assert_eq!(err.to_string(), "missing table for WaitFlags index \"9\"");

		let err = apply("/x +Verbose", TableOptions::default()).unwrap_err();
		assert!(matches!(err, FlagsError::MissingTableIndex { .. }));
	}

	#[test]
	fn test_remove_and_keep_filter_by_pattern() {
		let (ty, snapshot) = wait_flags();
		let slots = slots();
		let mut tables = ParamTables::new(&slots);
		fill_tables(&snapshot, &slots, &mut tables);

		apply_table_expression(
			&ty,
			&snapshot,
			"-KeepAlive",
			&slots,
			&mut tables,
			TableOptions::default(),
		)
		.unwrap();
		assert_eq!(keys(&tables, 1), ["KeepOrder"]);

		apply_table_expression(
			&ty,
			&snapshot,
			"/0 &*Signal*",
			&slots,
			&mut tables,
			TableOptions::default(),
		)
		.unwrap();
		assert_eq!(keys(&tables, 0), ["StopOnSignal"]);
	}

	#[test]
	fn test_set_clears_target_bucket() {
		let (ty, snapshot) = wait_flags();
		let slots = slots();
		let mut tables = ParamTables::new(&slots);
		fill_tables(&snapshot, &slots, &mut tables);

		apply_table_expression(
			&ty,
			&snapshot,
			"=StopOnSignal",
			&slots,
			&mut tables,
			TableOptions::default(),
		)
		.unwrap();
		assert_eq!(keys(&tables, 0), ["StopOnSignal"]);
		assert_eq!(keys(&tables, 1), ["KeepAlive", "KeepOrder"]);
	}

	#[test]
	fn test_unknown_member_policy() {
		let options = TableOptions { error_on_not_found: true, ..TableOptions::default() };
		let err = apply("+Bogus", options).unwrap_err();
		assert!(matches!(err, FlagsError::UnknownMember { .. }));

		let tables = apply("+Bogus +Verbose", TableOptions::default()).unwrap();
		assert_eq!(keys(&tables, 2), ["Verbose"]);
	}

	#[test]
	fn test_all_skipped_expression_keeps_slot_count() {
		let tables = apply("+Bogus", TableOptions::default()).unwrap();
		assert_eq!(tables.parameter_values(), [0, 0, 0]);
	}

	#[test]
	fn test_member_without_slot_errors() {
		let (ty, snapshot) = wait_flags();
		let mut slots = ParamSlots::new();
		slots.assign("Verbose", 0);

		let mut tables = ParamTables::new(&slots);
		let err = apply_table_expression(
			&ty,
			&snapshot,
			"+KeepAlive",
			&slots,
			&mut tables,
			TableOptions::default(),
		)
		.unwrap_err();
		assert_eq!(err.to_string(), "missing table for WaitFlags name \"KeepAlive\"");
	}

	#[test]
	fn test_empty_expression_policy() {
		let (ty, snapshot) = wait_flags();
		let slots = slots();
		let mut tables = ParamTables::new(&slots);

		let err = apply_table_expression(
			&ty,
			&snapshot,
			"",
			&slots,
			&mut tables,
			TableOptions::default(),
		)
		.unwrap_err();
		assert!(matches!(err, FlagsError::EmptyValue { .. }));

		apply(" ", TableOptions::default()).unwrap();

		let options = TableOptions { error_on_empty: true, ..TableOptions::default() };
		let err = apply(" ", options).unwrap_err();
		assert_eq!(err.to_string(), "empty modifiers list");
	}

	#[test]
	fn test_bad_operator_fails_on_use() {
		let err = apply("~Verbose", TableOptions::default()).unwrap_err();
		assert!(matches!(err, FlagsError::BadOperator { operator: '~', .. }));
	}

	#[test]
	fn test_case_insensitive_lookup_and_patterns() {
		let options = TableOptions { no_case: true, ..TableOptions::default() };
		let tables = apply("+verbose +keep*", options).unwrap();
		assert_eq!(keys(&tables, 2), ["Verbose"]);
		assert_eq!(keys(&tables, 1), ["KeepAlive", "KeepOrder"]);
	}
}
