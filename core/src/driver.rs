//! Per-object update sequence shared by every object kind:
//! predicate -> load -> transform -> write back, with skip bookkeeping.

use crate::{
	kind::{ObjectKind, TagLocations},
	metrics::IterationMetrics,
	pagination,
	plan::TagPlan,
	predicate::needs_update,
	skips::SkipCounters,
};

use bt_api::{
	assets, clients, findings, reports, writeups, AssetSummary, ClientSummary, Document, Finding,
	ReportSummary, Transport, Writeup,
};

use async_trait::async_trait;
use tracing::{error, info};

/// A listed object whose tags can be rewritten.
#[async_trait]
pub trait TagTarget: Sync {
	const KIND: ObjectKind;

	fn name(&self) -> &str;

	/// Tags as seen in the list endpoint; only used to decide whether the
	/// object needs to be touched at all.
	fn listed_tags(&self) -> &[String];

	/// The authoritative record whose tags get transformed and written back.
	async fn load(&self, api: &dyn Transport) -> Result<Document, bt_api::Error>;

	async fn store(&self, api: &dyn Transport, document: &Document) -> Result<(), bt_api::Error>;
}

#[async_trait]
impl TagTarget for ClientSummary {
	const KIND: ObjectKind = ObjectKind::Client;

	fn name(&self) -> &str {
		&self.name
	}

	fn listed_tags(&self) -> &[String] {
		&self.tags
	}

	async fn load(&self, api: &dyn Transport) -> Result<Document, bt_api::Error> {
		clients::get(api, self.client_id).await
	}

	async fn store(&self, api: &dyn Transport, document: &Document) -> Result<(), bt_api::Error> {
		clients::update(api, self.client_id, document).await
	}
}

#[async_trait]
impl TagTarget for AssetSummary {
	const KIND: ObjectKind = ObjectKind::Asset;

	fn name(&self) -> &str {
		&self.asset
	}

	fn listed_tags(&self) -> &[String] {
		&self.tags
	}

	async fn load(&self, api: &dyn Transport) -> Result<Document, bt_api::Error> {
		assets::get(api, self.client_id, &self.id).await
	}

	async fn store(&self, api: &dyn Transport, document: &Document) -> Result<(), bt_api::Error> {
		assets::update(api, self.client_id, &self.id, document).await
	}
}

#[async_trait]
impl TagTarget for ReportSummary {
	const KIND: ObjectKind = ObjectKind::Report;

	fn name(&self) -> &str {
		&self.name
	}

	fn listed_tags(&self) -> &[String] {
		&self.tags
	}

	async fn load(&self, api: &dyn Transport) -> Result<Document, bt_api::Error> {
		reports::get(api, self.client_id, self.id).await
	}

	async fn store(&self, api: &dyn Transport, document: &Document) -> Result<(), bt_api::Error> {
		reports::update(api, self.client_id, self.id, document).await
	}
}

#[async_trait]
impl TagTarget for Finding {
	const KIND: ObjectKind = ObjectKind::Finding;

	fn name(&self) -> &str {
		&self.title
	}

	fn listed_tags(&self) -> &[String] {
		&self.tags
	}

	// The list endpoint already returns the full finding.
	async fn load(&self, _: &dyn Transport) -> Result<Document, bt_api::Error> {
		Document::from_serializable(self)
	}

	async fn store(&self, api: &dyn Transport, document: &Document) -> Result<(), bt_api::Error> {
		findings::update(api, self.client_id, self.report_id, self.flaw_id, document).await
	}
}

#[async_trait]
impl TagTarget for Writeup {
	const KIND: ObjectKind = ObjectKind::Writeup;

	fn name(&self) -> &str {
		&self.title
	}

	fn listed_tags(&self) -> &[String] {
		&self.tags
	}

	async fn load(&self, _: &dyn Transport) -> Result<Document, bt_api::Error> {
		Document::from_serializable(self)
	}

	async fn store(&self, api: &dyn Transport, document: &Document) -> Result<(), bt_api::Error> {
		writeups::update(api, self.doc_id, document).await
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// None of the object's tags were in the plan.
	Unchanged,
	Updated,
	/// Loading or writing back failed; counted in [`SkipCounters`].
	Skipped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
	pub unchanged: usize,
	pub updated: usize,
	pub skipped: usize,
}

impl Tally {
	pub fn record(&mut self, outcome: Outcome) {
		match outcome {
			Outcome::Unchanged => self.unchanged += 1,
			Outcome::Updated => self.updated += 1,
			Outcome::Skipped => self.skipped += 1,
		}
	}

	pub fn merge(&mut self, other: Tally) {
		self.unchanged += other.unchanged;
		self.updated += other.updated;
		self.skipped += other.skipped;
	}
}

/// Applies one [`TagPlan`] to objects of any kind, one request at a time.
pub struct Updater<'a> {
	api: &'a dyn Transport,
	plan: &'a TagPlan,
	skips: SkipCounters,
	unread_findings: usize,
}

impl<'a> Updater<'a> {
	pub fn new(api: &'a dyn Transport, plan: &'a TagPlan) -> Self {
		Self {
			api,
			plan,
			skips: SkipCounters::default(),
			unread_findings: 0,
		}
	}

	pub fn skips(&self) -> SkipCounters {
		self.skips
	}

	/// Reports whose findings could not be listed. Their findings were never
	/// attempted, so they are not in [`Updater::skips`].
	pub fn unread_findings(&self) -> usize {
		self.unread_findings
	}

	pub async fn update<T: TagTarget>(&mut self, target: &T) -> Outcome {
		let kind = T::KIND;
		let name = target.name();
		let action = self.plan.action();
		info!(%kind, name, "processing tags");

		if !needs_update(target.listed_tags(), self.plan.sources()) {
			info!(%kind, name, "contains no tags to {action}");
			return Outcome::Unchanged;
		}

		let mut document = match target.load(self.api).await {
			Ok(document) => document,
			Err(e) => {
				error!(%kind, name, error = %e, "could not load {kind}, skipping");
				self.skips.record(kind);
				return Outcome::Skipped;
			}
		};

		let mut tags = document.tags();
		self.plan.apply(&mut tags);
		document.set_tags(tags);

		if let Err(e) = target.store(self.api, &document).await {
			error!(%kind, name, error = %e, "could not update {kind}, skipping");
			self.skips.record(kind);
			return Outcome::Skipped;
		}

		info!(%kind, name, "✓ applied {action} to all tags");
		Outcome::Updated
	}

	pub async fn update_all<T: TagTarget>(&mut self, targets: &[T]) -> Tally {
		let kind = T::KIND;
		let mut metrics = IterationMetrics::new(targets.len());
		let mut tally = Tally::default();

		for target in targets {
			tally.record(self.update(target).await);
			info!(%kind, "{}", metrics.tick());
		}

		tally
	}

	/// Updates every report and, as each report is visited, the findings
	/// nested in it. Returns the report and finding tallies.
	pub async fn update_reports(
		&mut self,
		reports: &[ReportSummary],
		locations: TagLocations,
	) -> (Tally, Tally) {
		let mut metrics = IterationMetrics::new(reports.len());
		let mut report_tally = Tally::default();
		let mut finding_tally = Tally::default();

		for report in reports {
			if locations.reports {
				report_tally.record(self.update(report).await);
			}

			if locations.findings && report.findings >= 1 {
				finding_tally.merge(self.update_findings(report).await);
			}

			info!(kind = %ObjectKind::Report, "{}", metrics.tick());
		}

		(report_tally, finding_tally)
	}

	async fn update_findings(&mut self, report: &ReportSummary) -> Tally {
		info!(report = %report.name, count = report.findings, "loading findings from report");

		match pagination::fetch_findings(self.api, report.client_id, report.id).await {
			Ok(findings) => self.update_all(&findings).await,
			Err(e) => {
				error!(report = %report.name, error = %e, "could not retrieve findings from report, skipping");
				self.unread_findings += 1;
				Tally::default()
			}
		}
	}
}
