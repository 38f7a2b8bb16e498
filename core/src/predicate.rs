/// Whether an object with `tags` needs the full fetch/transform/write-back
/// round trip: true iff at least one of its tags is in `find`.
pub fn needs_update<A, B>(tags: &[A], find: &[B]) -> bool
where
	A: AsRef<str>,
	B: AsRef<str>,
{
	if tags.is_empty() {
		return false;
	}

	tags.iter()
		.any(|tag| find.iter().any(|source| source.as_ref() == tag.as_ref()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_tag_list_never_needs_update() {
		assert!(!needs_update::<&str, _>(&[], &["x"]));
		assert!(!needs_update::<&str, &str>(&[], &[]));
	}

	#[test]
	fn matches_on_any_shared_tag() {
		assert!(!needs_update(&["x"], &["y"]));
		assert!(needs_update(&["x"], &["x"]));
		assert!(needs_update(&["a", "b", "c"], &["z", "c"]));
	}

	#[test]
	fn duplicates_count_once() {
		assert!(needs_update(&["x", "x"], &["x"]));
	}
}
