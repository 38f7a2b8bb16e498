use bt_api::{tenant_tags, Transport};

use tracing::{error, info};

const CONFLICT: u16 = 409;
const NOT_FOUND: u16 = 404;

/// Keeps the tenant-wide tag dictionary in step with the objects.
pub struct TenantRegistry<'a> {
	api: &'a dyn Transport,
	tenant_id: u64,
}

impl<'a> TenantRegistry<'a> {
	pub fn new(api: &'a dyn Transport, tenant_id: u64) -> Self {
		Self { api, tenant_id }
	}

	/// Creates every tag at tenant level. A tag that already exists counts as
	/// created. Returns false if any tag could not be created; the remaining
	/// tags are still attempted.
	pub async fn register(&self, tags: &[String]) -> bool {
		info!(count = tags.len(), "adding new tags to tenant");
		let mut all_added = true;

		for tag in tags {
			match tenant_tags::create(self.api, self.tenant_id, tag).await {
				Ok(()) => info!(tag, "added tag to tenant"),
				Err(e) if e.status_code() == Some(CONFLICT) => {
					info!(tag, "tag already exists at tenant level")
				}
				Err(e) => {
					error!(tag, error = %e, "could not create tenant tag, it will not appear in tag dropdowns");
					all_added = false;
				}
			}
		}

		all_added
	}

	/// Deletes every tag at tenant level. A tag that is already gone counts as
	/// deleted.
	pub async fn deregister(&self, tags: &[String]) -> bool {
		info!(count = tags.len(), "removing tags from tenant");
		let mut all_removed = true;

		for tag in tags {
			match tenant_tags::delete(self.api, self.tenant_id, tag).await {
				Ok(()) => info!(tag, "✓ removed tag from tenant"),
				Err(e) if e.status_code() == Some(NOT_FOUND) => {
					info!(tag, "tag already removed at tenant level")
				}
				Err(e) => {
					error!(tag, error = %e, "could not delete tenant tag");
					all_removed = false;
				}
			}
		}

		all_removed
	}
}
