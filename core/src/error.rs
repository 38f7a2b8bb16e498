use crate::{kind::ObjectKind, pagination::PaginationError, plan::PlanError};

use thiserror::Error;

/// Errors that end a run. Everything recoverable is counted and logged by the
/// drivers instead.
#[derive(Debug, Error)]
pub enum Error {
	#[error("could not load {kind}s from the instance: {source}")]
	Load {
		kind: ObjectKind,
		#[source]
		source: PaginationError,
	},
	#[error(transparent)]
	Plan(#[from] PlanError),
	#[error("operator input failed: {0}")]
	Operator(String),
}

pub type Result<T> = std::result::Result<T, Error>;
