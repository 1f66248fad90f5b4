//! Enumeration metadata cache.
//!
//! Snapshots are built lazily per registered type and kept for the life of
//! the engine. A snapshot found structurally inconsistent is evicted and
//! rebuilt once; if the rebuild is also inconsistent the lookup fails
//! instead of looping.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::FlagsError;
use crate::registry::FlagsType;

/// Ordered name/value metadata for one type.
///
/// `names` and `values` are parallel lists sorted ascending by value, ties
/// keeping declaration order. Values are canonical bit patterns for the
/// type's width. Handles are cheap clones.
#[derive(Debug, Clone)]
pub struct Snapshot(Arc<SnapshotInner>);

#[derive(Debug)]
struct SnapshotInner {
	names: Vec<Box<str>>,
	values: Vec<u64>,
}

impl Snapshot {
	fn build(ty: &FlagsType) -> Self {
		let mut pairs: Vec<(Box<str>, u64)> = ty
			.members()
			.iter()
			.map(|member| (member.name.clone(), ty.repr().widen(member.value)))
			.collect();

		// Stable: members sharing a value keep declaration order.
		pairs.sort_by_key(|&(_, value)| value);

		let mut names = Vec::with_capacity(pairs.len());
		let mut values = Vec::with_capacity(pairs.len());
		for (name, value) in pairs {
			names.push(name);
			values.push(value);
		}

		Self(Arc::new(SnapshotInner { names, values }))
	}

	pub fn len(&self) -> usize {
		self.0.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.names.is_empty()
	}

	/// Member names in ascending value order.
	pub fn names(&self) -> &[Box<str>] {
		&self.0.names
	}

	/// Canonical member values, ascending.
	pub fn values(&self) -> &[u64] {
		&self.0.values
	}

	/// Index of the first member whose name matches `name` exactly, or
	/// ASCII case-insensitively when `no_case` is set.
	pub fn position(&self, name: &str, no_case: bool) -> Option<usize> {
		if no_case {
			self.0.names.iter().position(|candidate| candidate.eq_ignore_ascii_case(name))
		} else {
			self.0.names.iter().position(|candidate| candidate.as_ref() == name)
		}
	}

	fn is_consistent(&self) -> bool {
		self.0.names.len() == self.0.values.len() && self.0.values.is_sorted()
	}
}

#[derive(Default)]
pub(crate) struct MetadataCache {
	entries: Mutex<FxHashMap<usize, Snapshot>>,
	#[cfg(test)]
	broken_builds: std::sync::atomic::AtomicUsize,
}

impl MetadataCache {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Looks up or builds the snapshot for `ty`.
	///
	/// The lock spans the whole lookup-or-build so a snapshot is never
	/// observed partially populated.
	pub(crate) fn snapshot(&self, ty: &FlagsType) -> Result<Snapshot, FlagsError> {
		let mut entries = self.entries.lock();
		let mut rebuilt = false;

		loop {
			if let Some(snapshot) = entries.get(&ty.key()) {
				if snapshot.is_consistent() {
					return Ok(snapshot.clone());
				}

				let names = snapshot.0.names.len();
				let values = snapshot.0.values.len();
				tracing::warn!(
					type_name = %ty.name(),
					rebuilt,
					"evicting inconsistent enumeration snapshot"
				);
				entries.remove(&ty.key());

				if rebuilt {
					return Err(FlagsError::CountMismatch { names, values });
				}
			}

			entries.insert(ty.key(), self.build(ty));
			rebuilt = true;
		}
	}

	/// Drops every cached snapshot, returning how many were evicted.
	pub(crate) fn invalidate(&self) -> usize {
		let mut entries = self.entries.lock();
		let count = entries.len();
		entries.clear();
		count
	}

	#[cfg(not(test))]
	fn build(&self, ty: &FlagsType) -> Snapshot {
		Snapshot::build(ty)
	}

	#[cfg(test)]
	fn build(&self, ty: &FlagsType) -> Snapshot {
		use std::sync::atomic::Ordering;

		let broken = self.broken_builds.load(Ordering::Relaxed);
		if broken > 0 {
			self.broken_builds.store(broken - 1, Ordering::Relaxed);
			return Snapshot(Arc::new(SnapshotInner {
				names: vec!["Phantom".into()],
				values: Vec::new(),
			}));
		}

		Snapshot::build(ty)
	}

	/// Makes the next `n` snapshot builds produce inconsistent entries.
	#[cfg(test)]
	pub(crate) fn break_next_builds(&self, n: usize) {
		self.broken_builds.store(n, std::sync::atomic::Ordering::Relaxed);
	}

	/// Replaces the cached entry for `ty` with an inconsistent snapshot.
	#[cfg(test)]
	pub(crate) fn corrupt_entry(&self, ty: &FlagsType) {
		self.entries.lock().insert(
			ty.key(),
			Snapshot(Arc::new(SnapshotInner {
				names: vec!["Phantom".into()],
				values: Vec::new(),
			})),
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::FlagsTypeBuilder;
	use crate::repr::Repr;

	fn severity() -> FlagsType {
		FlagsTypeBuilder::new("Severity", Repr::U32)
			.flags(true)
			.member("None", 0)
			.member("Low", 0x1)
			.member("Medium", 0x2)
			.member("High", 0x4)
			.build()
			.unwrap()
	}

	#[test]
	fn test_snapshot_is_value_sorted() {
		let ty = FlagsTypeBuilder::new("Jumbled", Repr::U32)
			.member("C", 0x4)
			.member("A", 0x1)
			.member("B", 0x2)
			.build()
			.unwrap();

		let cache = MetadataCache::new();
		let snapshot = cache.snapshot(&ty).unwrap();

		assert_eq!(snapshot.names(), &["A".into(), "B".into(), "C".into()]);
		assert_eq!(snapshot.values(), &[0x1, 0x2, 0x4]);
	}

	#[test]
	fn test_value_ties_keep_declaration_order() {
		let ty = FlagsTypeBuilder::new("Aliased", Repr::U32)
			.member("Primary", 0x1)
			.member("Alias", 0x1)
			.build()
			.unwrap();

		let cache = MetadataCache::new();
		let snapshot = cache.snapshot(&ty).unwrap();

		assert_eq!(snapshot.names(), &["Primary".into(), "Alias".into()]);
		assert_eq!(snapshot.position("Alias", false), Some(1));
	}

	#[test]
	fn test_lookup_is_idempotent() {
		let ty = severity();
		let cache = MetadataCache::new();

		let first = cache.snapshot(&ty).unwrap();
		let second = cache.snapshot(&ty).unwrap();

		assert!(Arc::ptr_eq(&first.0, &second.0));
	}

	#[test]
	fn test_position_case_folding() {
		let ty = severity();
		let cache = MetadataCache::new();
		let snapshot = cache.snapshot(&ty).unwrap();

		assert_eq!(snapshot.position("High", false), Some(3));
		assert_eq!(snapshot.position("high", false), None);
		assert_eq!(snapshot.position("high", true), Some(3));
		assert_eq!(snapshot.position("absent", true), None);
	}

	#[test]
	fn test_negative_values_canonicalized_to_width() {
		let ty = FlagsTypeBuilder::new("Signed", Repr::I32)
			.member("All", -1)
			.member("None", 0)
			.build()
			.unwrap();

		let cache = MetadataCache::new();
		let snapshot = cache.snapshot(&ty).unwrap();

		// -1 masks to the 32-bit all-ones pattern and sorts above zero.
		assert_eq!(snapshot.names(), &["None".into(), "All".into()]);
		assert_eq!(snapshot.values(), &[0, 0xFFFF_FFFF]);
	}

	#[test]
	fn test_corrupted_entry_heals_once() {
		let ty = severity();
		let cache = MetadataCache::new();

		cache.snapshot(&ty).unwrap();
		cache.corrupt_entry(&ty);

		let snapshot = cache.snapshot(&ty).unwrap();
		assert_eq!(snapshot.len(), 4);
		assert_eq!(snapshot.position("High", false), Some(3));
	}

	#[test]
	fn test_persistent_corruption_is_an_error() {
		let ty = severity();
		let cache = MetadataCache::new();

		cache.corrupt_entry(&ty);
		cache.break_next_builds(1);

		let err = cache.snapshot(&ty).unwrap_err();
		assert_eq!(err, FlagsError::CountMismatch { names: 1, values: 0 });

		// The broken rebuild was evicted too; the next lookup succeeds.
		assert_eq!(cache.snapshot(&ty).unwrap().len(), 4);
	}

	#[test]
	fn test_invalidate_reports_evictions() {
		let first = severity();
		let second = FlagsTypeBuilder::new("Other", Repr::U32)
			.member("Bit", 0x1)
			.build()
			.unwrap();

		let cache = MetadataCache::new();
		cache.snapshot(&first).unwrap();
		cache.snapshot(&second).unwrap();

		assert_eq!(cache.invalidate(), 2);
		assert_eq!(cache.invalidate(), 0);
	}
}
