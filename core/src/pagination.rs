//! Walks paginated list endpoints until the server-reported total is reached.

use crate::kind::ObjectKind;

use bt_api::{
	assets, clients, findings, reports, writeups, AssetSummary, ClientSummary, Finding, Page,
	Pagination, ReportSummary, Transport, Writeup,
};

use std::future::Future;

use tracing::{debug, warn};

pub const CLIENT_PAGE_SIZE: usize = 100;
pub const ASSET_PAGE_SIZE: usize = 1000;
pub const REPORT_PAGE_SIZE: usize = 1000;
pub const FINDING_PAGE_SIZE: usize = 100;

/// Hard ceiling on pages per walk, far above any real tenant.
pub const MAX_PAGES: usize = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum PaginationError {
	#[error("server answered '{status}' for {kind} page {page}")]
	Status {
		kind: ObjectKind,
		page: usize,
		status: String,
	},
	#[error("gave up on {kind}s after {pages} pages without reaching the reported total")]
	PageLimit { kind: ObjectKind, pages: usize },
	#[error(transparent)]
	Api(#[from] bt_api::Error),
}

/// Requests pages `0, 1, 2, ...` through `fetch` until the accumulated item
/// count equals the reported total.
///
/// An empty page, or a total smaller than what was already received, also
/// ends the walk so an inconsistent server can never keep it spinning.
pub async fn walk<T, F, Fut>(
	kind: ObjectKind,
	page_size: usize,
	mut fetch: F,
) -> Result<Vec<T>, PaginationError>
where
	F: FnMut(Pagination) -> Fut,
	Fut: Future<Output = Result<Page<T>, bt_api::Error>>,
{
	let mut items = Vec::new();
	let mut total = None;

	for page in 0..MAX_PAGES {
		let response = fetch(Pagination::page(page, page_size)).await?;
		if !response.is_success() {
			return Err(PaginationError::Status {
				kind,
				page,
				status: response.status,
			});
		}

		let received = response.items.len();
		items.extend(response.items);
		if response.total.is_some() {
			total = response.total;
		}
		debug!(%kind, page, received, accumulated = items.len(), ?total, "fetched page");

		match total {
			Some(total) if items.len() == total => return Ok(items),
			Some(total) if items.len() > total => {
				warn!(%kind, total, accumulated = items.len(), "server reported fewer items than it sent");
				return Ok(items);
			}
			_ if received == 0 => {
				if let Some(total) = total {
					warn!(%kind, total, accumulated = items.len(), "empty page before reaching the reported total");
				}
				return Ok(items);
			}
			_ => {}
		}
	}

	Err(PaginationError::PageLimit {
		kind,
		pages: MAX_PAGES,
	})
}

pub async fn fetch_clients(api: &dyn Transport) -> Result<Vec<ClientSummary>, PaginationError> {
	walk(ObjectKind::Client, CLIENT_PAGE_SIZE, |p| clients::list(api, p)).await
}

pub async fn fetch_assets(api: &dyn Transport) -> Result<Vec<AssetSummary>, PaginationError> {
	walk(ObjectKind::Asset, ASSET_PAGE_SIZE, |p| {
		assets::list_tenant(api, p)
	})
	.await
}

pub async fn fetch_reports(api: &dyn Transport) -> Result<Vec<ReportSummary>, PaginationError> {
	walk(ObjectKind::Report, REPORT_PAGE_SIZE, |p| reports::list(api, p)).await
}

pub async fn fetch_findings(
	api: &dyn Transport,
	client_id: u64,
	report_id: u64,
) -> Result<Vec<Finding>, PaginationError> {
	walk(ObjectKind::Finding, FINDING_PAGE_SIZE, |p| {
		findings::list_by_report(api, client_id, report_id, p)
	})
	.await
}

/// Writeups are not paginated; one request returns all of them.
pub async fn fetch_writeups(api: &dyn Transport) -> Result<Vec<Writeup>, PaginationError> {
	Ok(writeups::list(api).await?)
}
