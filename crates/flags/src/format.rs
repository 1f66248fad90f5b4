//! Diagnostic and display rendering for resolved values.

use crate::cache::Snapshot;
use crate::repr::Repr;

/// Joins items into an English "or" list: `A`, `A or B`, `A, B, or C`.
pub(crate) fn english_or<I, S>(items: I) -> String
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let items: Vec<S> = items.into_iter().collect();
	let count = items.len();
	let mut out = String::new();

	for (index, item) in items.iter().enumerate() {
		if index > 0 {
			if count > 2 {
				out.push_str(", ");
			} else {
				out.push(' ');
			}
			if index == count - 1 {
				out.push_str("or ");
			}
		}
		out.push_str(item.as_ref());
	}

	out
}

/// Alphabetical English "or" list of a snapshot's member names, used by
/// bad-value diagnostics.
pub(crate) fn known_members(snapshot: &Snapshot) -> String {
	let mut names: Vec<&str> = snapshot.names().iter().map(AsRef::as_ref).collect();
	names.sort_unstable();
	english_or(names)
}

/// Decomposes a canonical value into member names.
///
/// Members are claimed greedily from the highest value down; the surviving
/// names are joined `", "` in ascending value order. Exact zero renders as
/// the zero-valued member's name when one exists, else `"0"`. If any bits
/// are left unclaimed the whole value renders as a plain number in the
/// type's declared domain instead.
pub(crate) fn format_value(repr: Repr, snapshot: &Snapshot, canonical: u64) -> String {
	let names = snapshot.names();
	let values = snapshot.values();

	if canonical == 0 {
		return match values.first() {
			Some(0) => names[0].to_string(),
			_ => "0".to_string(),
		};
	}

	let mut remaining = canonical;
	let mut parts: Vec<&str> = Vec::new();

	for index in (0..values.len()).rev() {
		let value = values[index];
		// Values are sorted ascending; zero members sit at the front and
		// never participate in a nonzero decomposition.
		if value == 0 {
			break;
		}
		if remaining & value == value {
			remaining &= !value;
			parts.push(names[index].as_ref());
		}
	}

	if remaining != 0 {
		return repr.render(canonical);
	}

	parts.reverse();
	parts.join(", ")
}
