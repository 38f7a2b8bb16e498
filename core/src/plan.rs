//! What to do to which tags.
//!
//! A [`TagPlan`] pairs every source tag with at most one destination. Source
//! tags are unique keys, so a tag can never be mapped to two different
//! destinations; duplicates are rejected before anything touches the network.

use crate::transform;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TagAction {
	/// Replace each source tag with its destination, in place.
	Refactor,
	/// Delete each source tag.
	Remove,
	/// Append the destination next to each source tag, keeping the source.
	Add,
}

impl TagAction {
	pub const ALL: [TagAction; 3] = [TagAction::Refactor, TagAction::Remove, TagAction::Add];

	pub fn needs_destination(self) -> bool {
		!matches!(self, Self::Remove)
	}

	/// Whether the source tags should disappear from the tenant once every
	/// object has been updated.
	pub fn retires_sources(self) -> bool {
		!matches!(self, Self::Add)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
	#[error("no source tags were given")]
	Empty,
	#[error("tags cannot be blank")]
	BlankTag,
	#[error("source tag '{0}' was given more than once")]
	DuplicateSource(String),
	#[error("source tag '{tag}' needs a destination tag to {action}")]
	MissingDestination { tag: String, action: TagAction },
	#[error("source tag '{0}' cannot have a destination when removing")]
	UnexpectedDestination(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPlan {
	action: TagAction,
	/// Source tag to destination tag. Destinations are empty for `Remove`.
	pairs: IndexMap<String, String>,
	sources: Vec<String>,
}

impl TagPlan {
	pub fn new(
		action: TagAction,
		pairs: impl IntoIterator<Item = (String, Option<String>)>,
	) -> Result<Self, PlanError> {
		let mut map = IndexMap::new();

		for (source, destination) in pairs {
			if source.trim().is_empty() {
				return Err(PlanError::BlankTag);
			}

			let destination = match (action.needs_destination(), destination) {
				(true, Some(destination)) if destination.trim().is_empty() => {
					return Err(PlanError::BlankTag)
				}
				(true, Some(destination)) => destination,
				(true, None) => {
					return Err(PlanError::MissingDestination {
						tag: source,
						action,
					})
				}
				(false, Some(_)) => return Err(PlanError::UnexpectedDestination(source)),
				(false, None) => String::new(),
			};

			if map.contains_key(&source) {
				return Err(PlanError::DuplicateSource(source));
			}
			map.insert(source, destination);
		}

		if map.is_empty() {
			return Err(PlanError::Empty);
		}

		let sources = map.keys().cloned().collect();
		Ok(Self {
			action,
			pairs: map,
			sources,
		})
	}

	pub fn refactor<S, D>(pairs: impl IntoIterator<Item = (S, D)>) -> Result<Self, PlanError>
	where
		S: Into<String>,
		D: Into<String>,
	{
		Self::new(
			TagAction::Refactor,
			pairs.into_iter().map(|(s, d)| (s.into(), Some(d.into()))),
		)
	}

	pub fn remove<S: Into<String>>(tags: impl IntoIterator<Item = S>) -> Result<Self, PlanError> {
		Self::new(
			TagAction::Remove,
			tags.into_iter().map(|s| (s.into(), None)),
		)
	}

	pub fn add<S, D>(pairs: impl IntoIterator<Item = (S, D)>) -> Result<Self, PlanError>
	where
		S: Into<String>,
		D: Into<String>,
	{
		Self::new(
			TagAction::Add,
			pairs.into_iter().map(|(s, d)| (s.into(), Some(d.into()))),
		)
	}

	pub fn action(&self) -> TagAction {
		self.action
	}

	pub fn pairs(&self) -> &IndexMap<String, String> {
		&self.pairs
	}

	pub fn sources(&self) -> &[String] {
		&self.sources
	}

	/// Destination tags in first-seen order without repeats. Empty for `Remove`.
	pub fn destinations(&self) -> Vec<String> {
		if !self.action.needs_destination() {
			return Vec::new();
		}

		let mut destinations: Vec<String> = Vec::with_capacity(self.pairs.len());
		for destination in self.pairs.values() {
			if !destinations.contains(destination) {
				destinations.push(destination.clone());
			}
		}
		destinations
	}

	/// Source tags that no object carries once the plan has run, so they can
	/// leave the tenant. A source that is also some pair's destination (a swap,
	/// a chain or `a -> a`) stays.
	pub fn retired_sources(&self) -> Vec<String> {
		if !self.action.retires_sources() {
			return Vec::new();
		}

		let destinations = self.destinations();
		self.sources
			.iter()
			.filter(|source| !destinations.contains(source))
			.cloned()
			.collect()
	}

	pub fn destination_for(&self, source: &str) -> Option<&str> {
		self.pairs
			.get(source)
			.map(String::as_str)
			.filter(|destination| !destination.is_empty())
	}

	/// Runs this plan's transform over `tags`.
	pub fn apply(&self, tags: &mut Vec<String>) {
		match self.action {
			TagAction::Refactor => transform::refactor(tags, &self.pairs),
			TagAction::Remove => transform::remove(tags, &self.pairs),
			TagAction::Add => transform::add(tags, &self.pairs),
		}
	}

	/// Human readable summary, e.g. `'old' -> 'new' | 'a' -> 'b'`.
	pub fn describe(&self) -> String {
		self.pairs
			.iter()
			.map(|(source, destination)| match self.action {
				TagAction::Refactor => format!("'{source}' -> '{destination}'"),
				TagAction::Remove => format!("'{source}'"),
				TagAction::Add => format!("'{source}' + '{destination}'"),
			})
			.collect::<Vec<_>>()
			.join(" | ")
	}
}

/// The canonical form of a tag: trimmed, lowercase, whitespace runs turned
/// into `_` and anything outside `[a-z0-9_-]` dropped.
pub fn sanitize_tag(tag: &str) -> String {
	let mut clean = String::with_capacity(tag.len());
	let mut pending_space = false;

	for c in tag.trim().chars() {
		if c.is_whitespace() {
			pending_space = true;
			continue;
		}

		if pending_space {
			clean.push('_');
			pending_space = false;
		}

		for c in c.to_lowercase() {
			if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
				clean.push(c);
			}
		}
	}

	clean
}
