//! The three in-place tag strategies. Each walks the object's own tag list
//! and looks every tag up in the source -> destination map.

use indexmap::IndexMap;

/// Replaces every occurrence of a source tag with its destination, keeping
/// positions. The length of `tags` never changes.
pub fn refactor(tags: &mut [String], pairs: &IndexMap<String, String>) {
	for tag in tags.iter_mut() {
		if let Some(destination) = pairs.get(tag.as_str()) {
			*tag = destination.clone();
		}
	}
}

/// Drops every occurrence of every source tag.
pub fn remove(tags: &mut Vec<String>, pairs: &IndexMap<String, String>) {
	tags.retain(|tag| !pairs.contains_key(tag.as_str()));
}

/// Appends the destination of every matching tag to the end of `tags`, in
/// match order. Sources stay where they are; repeated matches append
/// repeated destinations.
pub fn add(tags: &mut Vec<String>, pairs: &IndexMap<String, String>) {
	let appended = tags
		.iter()
		.filter_map(|tag| pairs.get(tag.as_str()).cloned())
		.collect::<Vec<_>>();

	tags.extend(appended);
}
