//! One run, start to finish:
//!
//! `CollectInput -> ConfirmInput -> LoadCollections -> ConfirmMutation ->
//! RegisterTags -> MutateClients -> MutateAssets -> MutateReports (+findings)
//! -> MutateWriteups -> Deregister | ReportSkips`
//!
//! Both confirmations happen before anything is written. The order of the
//! mutation stages is fixed.

use crate::{
	driver::{Tally, Updater},
	error::{Error, Result},
	kind::{ObjectKind, TagLocations},
	operator::Operator,
	pagination::{self, PaginationError},
	plan::{TagAction, TagPlan},
	registry::TenantRegistry,
	skips::SkipCounters,
};

use bt_api::{AssetSummary, ClientSummary, ReportSummary, Transport, Writeup};

use strum::Display;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
	CollectInput,
	ConfirmInput,
	LoadCollections,
	ConfirmMutation,
	RegisterTags,
	MutateClients,
	MutateAssets,
	MutateReports,
	MutateWriteups,
	Deregister,
	ReportSkips,
}

/// Everything listed from the tenant for one run.
#[derive(Debug, Clone, Default)]
pub struct Collections {
	pub clients: Vec<ClientSummary>,
	pub assets: Vec<AssetSummary>,
	pub reports: Vec<ReportSummary>,
	pub writeups: Vec<Writeup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deregistration {
	/// `add` keeps its source tags.
	NotApplicable,
	Done { all_removed: bool },
	/// Some object still references a source tag.
	WithheldForSkips,
	/// Findings of some report could not be listed, so references may remain.
	WithheldForUnreadFindings,
	/// Some object kinds were not visited, so references may remain.
	WithheldForLocations,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
	pub action: TagAction,
	pub skips: SkipCounters,
	/// Reports whose findings could not be listed.
	pub unread_findings: usize,
	/// `None` when the action has no destination tags.
	pub registered: Option<bool>,
	pub deregistration: Deregistration,
	tallies: [Tally; 5],
}

impl RunReport {
	pub fn tally(&self, kind: ObjectKind) -> Tally {
		self.tallies[kind.index()]
	}

	pub fn is_success(&self) -> bool {
		self.skips.is_clean()
			&& self.unread_findings == 0
			&& self.registered != Some(false)
			&& self.deregistration != (Deregistration::Done { all_removed: false })
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
	/// The operator answered no at a confirmation; nothing was written.
	Declined(Stage),
	Completed(RunReport),
}

pub struct Orchestrator<'a> {
	api: &'a dyn Transport,
	tenant_id: u64,
	operator: &'a dyn Operator,
	locations: TagLocations,
}

impl<'a> Orchestrator<'a> {
	pub fn new(api: &'a dyn Transport, tenant_id: u64, operator: &'a dyn Operator) -> Self {
		Self {
			api,
			tenant_id,
			operator,
			locations: TagLocations::all(),
		}
	}

	pub fn with_locations(mut self, locations: TagLocations) -> Self {
		self.locations = locations;
		self
	}

	pub async fn run(&self) -> Result<RunOutcome> {
		let plan = self.operator.collect_plan()?;
		info!(action = %plan.action(), "selected tags: {}", plan.describe());
		info!(locations = %self.locations, "objects that will be updated");

		if !self
			.operator
			.confirm(&format!("Make the selected {} changes", plan.action()))?
		{
			return Ok(RunOutcome::Declined(Stage::ConfirmInput));
		}

		info!("loading objects from instance...");
		let collections = self.load().await?;
		info!(
			"loaded {} client(s), {} asset(s), {} report(s), and {} writeup(s)",
			collections.clients.len(),
			collections.assets.len(),
			collections.reports.len(),
			collections.writeups.len()
		);

		if !self.operator.confirm(
			"This will make requests to every object that needs to be updated and may take a while. Continue",
		)? {
			return Ok(RunOutcome::Declined(Stage::ConfirmMutation));
		}

		Ok(RunOutcome::Completed(self.execute(&plan, &collections).await))
	}

	/// Lists every selected object kind. Any failure here is fatal.
	pub async fn load(&self) -> Result<Collections> {
		fn fatal(kind: ObjectKind) -> impl FnOnce(PaginationError) -> Error {
			move |source| Error::Load { kind, source }
		}

		let mut collections = Collections::default();

		if self.locations.clients {
			collections.clients = pagination::fetch_clients(self.api)
				.await
				.map_err(fatal(ObjectKind::Client))?;
		}

		if self.locations.assets {
			collections.assets = pagination::fetch_assets(self.api)
				.await
				.map_err(fatal(ObjectKind::Asset))?;
		}

		if self.locations.needs_reports() {
			collections.reports = pagination::fetch_reports(self.api)
				.await
				.map_err(fatal(ObjectKind::Report))?;
		}

		if self.locations.writeups {
			collections.writeups = pagination::fetch_writeups(self.api)
				.await
				.map_err(fatal(ObjectKind::Writeup))?;
		}

		Ok(collections)
	}

	/// Runs every stage from tag registration onwards.
	pub async fn execute(&self, plan: &TagPlan, collections: &Collections) -> RunReport {
		let registry = TenantRegistry::new(self.api, self.tenant_id);
		let mut tallies = [Tally::default(); 5];

		let registered = if plan.action().needs_destination() {
			info!(stage = %Stage::RegisterTags);
			Some(registry.register(&plan.destinations()).await)
		} else {
			None
		};

		let mut updater = Updater::new(self.api, plan);

		if self.locations.clients {
			info!(stage = %Stage::MutateClients);
			tallies[ObjectKind::Client.index()] = updater.update_all(&collections.clients).await;
		}

		if self.locations.assets {
			info!(stage = %Stage::MutateAssets);
			tallies[ObjectKind::Asset.index()] = updater.update_all(&collections.assets).await;
		}

		if self.locations.needs_reports() {
			info!(stage = %Stage::MutateReports);
			let (reports, findings) = updater
				.update_reports(&collections.reports, self.locations)
				.await;
			tallies[ObjectKind::Report.index()] = reports;
			tallies[ObjectKind::Finding.index()] = findings;
		}

		if self.locations.writeups {
			info!(stage = %Stage::MutateWriteups);
			tallies[ObjectKind::Writeup.index()] = updater.update_all(&collections.writeups).await;
		}

		let skips = updater.skips();
		let unread_findings = updater.unread_findings();
		info!("finished updating tags on objects");

		if !skips.is_clean() {
			info!(stage = %Stage::ReportSkips);
			warn!("could not {} {skips}, see log file for details", plan.action());
		}

		if unread_findings > 0 {
			warn!(reports = unread_findings, "findings of some reports could not be loaded, see log file for details");
		}

		let deregistration = if !plan.action().retires_sources() {
			Deregistration::NotApplicable
		} else if !skips.is_clean() {
			warn!("skipping removing tags from tenant since not every reference to them was removed");
			Deregistration::WithheldForSkips
		} else if unread_findings > 0 {
			warn!("skipping removing tags from tenant since some findings were never checked");
			Deregistration::WithheldForUnreadFindings
		} else if !self.locations.is_all_selected() {
			warn!(locations = %self.locations, "skipping removing tags from tenant since not every object kind was updated");
			Deregistration::WithheldForLocations
		} else {
			info!(stage = %Stage::Deregister);
			let retired = plan.retired_sources();
			if retired.len() < plan.sources().len() {
				info!("keeping source tags on tenant that are also destination tags");
			}
			Deregistration::Done {
				all_removed: registry.deregister(&retired).await,
			}
		};

		RunReport {
			action: plan.action(),
			skips,
			unread_findings,
			registered,
			deregistration,
			tallies,
		}
	}
}
