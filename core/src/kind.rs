use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Every object kind that carries tags, in the fixed order they are mutated.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
	#[strum(to_string = "client", serialize = "clients")]
	Client,
	#[strum(to_string = "asset", serialize = "assets")]
	Asset,
	#[strum(to_string = "report", serialize = "reports")]
	Report,
	#[strum(to_string = "finding", serialize = "findings")]
	Finding,
	#[strum(to_string = "writeup", serialize = "writeups")]
	Writeup,
}

impl ObjectKind {
	pub const ALL: [ObjectKind; 5] = [
		ObjectKind::Client,
		ObjectKind::Asset,
		ObjectKind::Report,
		ObjectKind::Finding,
		ObjectKind::Writeup,
	];

	pub(crate) const fn index(self) -> usize {
		match self {
			Self::Client => 0,
			Self::Asset => 1,
			Self::Report => 2,
			Self::Finding => 3,
			Self::Writeup => 4,
		}
	}
}

/// Which object kinds a run is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagLocations {
	pub clients: bool,
	pub assets: bool,
	pub reports: bool,
	pub findings: bool,
	pub writeups: bool,
}

impl Default for TagLocations {
	fn default() -> Self {
		Self::all()
	}
}

impl TagLocations {
	pub const fn all() -> Self {
		Self {
			clients: true,
			assets: true,
			reports: true,
			findings: true,
			writeups: true,
		}
	}

	pub const fn none() -> Self {
		Self {
			clients: false,
			assets: false,
			reports: false,
			findings: false,
			writeups: false,
		}
	}

	pub fn only(kinds: impl IntoIterator<Item = ObjectKind>) -> Self {
		kinds.into_iter().fold(Self::none(), |mut locations, kind| {
			locations.set(kind, true);
			locations
		})
	}

	pub fn contains(&self, kind: ObjectKind) -> bool {
		match kind {
			ObjectKind::Client => self.clients,
			ObjectKind::Asset => self.assets,
			ObjectKind::Report => self.reports,
			ObjectKind::Finding => self.findings,
			ObjectKind::Writeup => self.writeups,
		}
	}

	pub fn set(&mut self, kind: ObjectKind, selected: bool) {
		let flag = match kind {
			ObjectKind::Client => &mut self.clients,
			ObjectKind::Asset => &mut self.assets,
			ObjectKind::Report => &mut self.reports,
			ObjectKind::Finding => &mut self.findings,
			ObjectKind::Writeup => &mut self.writeups,
		};
		*flag = selected;
	}

	pub fn selected(&self) -> Vec<ObjectKind> {
		ObjectKind::ALL
			.into_iter()
			.filter(|kind| self.contains(*kind))
			.collect()
	}

	pub fn is_all_selected(&self) -> bool {
		ObjectKind::ALL.iter().all(|kind| self.contains(*kind))
	}

	/// Findings are only reachable through their parent report.
	pub(crate) fn needs_reports(&self) -> bool {
		self.reports || self.findings
	}
}

impl fmt::Display for TagLocations {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let selected = self
			.selected()
			.into_iter()
			.map(|kind| kind.to_string())
			.collect::<Vec<_>>();

		if selected.is_empty() {
			write!(f, "(none)")
		} else {
			write!(f, "{}", selected.join(", "))
		}
	}
}
