use crate::kind::ObjectKind;

use std::fmt;

/// Objects that could not be updated, per kind. Only ever goes up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounters([usize; 5]);

impl SkipCounters {
	pub fn record(&mut self, kind: ObjectKind) {
		self.0[kind.index()] += 1;
	}

	pub fn get(&self, kind: ObjectKind) -> usize {
		self.0[kind.index()]
	}

	pub fn total(&self) -> usize {
		self.0.iter().sum()
	}

	pub fn is_clean(&self) -> bool {
		self.total() == 0
	}
}

impl fmt::Display for SkipCounters {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} client(s), {} asset(s), {} report(s), {} finding(s), and {} writeup(s)",
			self.get(ObjectKind::Client),
			self.get(ObjectKind::Asset),
			self.get(ObjectKind::Report),
			self.get(ObjectKind::Finding),
			self.get(ObjectKind::Writeup),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_per_kind() {
		let mut skips = SkipCounters::default();
		assert!(skips.is_clean());

		skips.record(ObjectKind::Asset);
		skips.record(ObjectKind::Asset);
		skips.record(ObjectKind::Writeup);

		assert_eq!(skips.get(ObjectKind::Asset), 2);
		assert_eq!(skips.get(ObjectKind::Client), 0);
		assert_eq!(skips.total(), 3);
		assert_eq!(
			skips.to_string(),
			"0 client(s), 2 asset(s), 0 report(s), 0 finding(s), and 1 writeup(s)"
		);
	}
}
