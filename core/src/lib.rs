//! Bulk tag maintenance for a reporting platform tenant.
//!
//! A [`TagPlan`] says which tags to refactor, remove or add. The
//! [`Orchestrator`] lists every tagged object in the tenant, rewrites the tags
//! of the ones that reference a source tag, and keeps the tenant-level tag
//! dictionary in step.

pub mod driver;
pub mod error;
pub mod kind;
pub mod metrics;
pub mod operator;
pub mod orchestrator;
pub mod pagination;
pub mod plan;
pub mod predicate;
pub mod registry;
pub mod skips;
pub mod transform;

pub use driver::{Outcome, TagTarget, Tally, Updater};
pub use error::{Error, Result};
pub use kind::{ObjectKind, TagLocations};
pub use operator::Operator;
pub use orchestrator::{Collections, Deregistration, Orchestrator, RunOutcome, RunReport, Stage};
pub use plan::{sanitize_tag, PlanError, TagAction, TagPlan};
pub use skips::SkipCounters;
