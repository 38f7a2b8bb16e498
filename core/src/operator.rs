use crate::{error::Result, plan::TagPlan};

/// The person driving a run.
pub trait Operator: Send + Sync {
	/// Chooses the action and collects the source (and destination) tags.
	fn collect_plan(&self) -> Result<TagPlan>;

	/// Asks a yes/no question. `false` aborts the run.
	fn confirm(&self, question: &str) -> Result<bool>;
}
