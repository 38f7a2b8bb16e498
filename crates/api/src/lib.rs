//! Client for the reporting platform's REST API.
//!
//! Every call goes through the [`Transport`] trait so the rest of the
//! workspace never talks to `reqwest` directly. Endpoints are grouped in one
//! module per resource, each exposing an `exec` function re-exported under the
//! operation name (`clients::list`, `assets::update`, ...).

pub mod auth;
mod http;

pub use http::{HttpOptions, HttpTransport};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::borrow::Cow;
use tracing::warn;

pub use reqwest::Method;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("request failed: {0}")]
	Request(#[from] reqwest::Error),
	#[error("{method} {path} returned status {status_code}")]
	Status {
		method: Method,
		path: String,
		status_code: u16,
		body: Value,
	},
	#[error("unexpected response body: {0}")]
	Json(#[from] serde_json::Error),
	#[error("authentication failed: {0}")]
	Authentication(String),
}

impl Error {
	/// HTTP status of a rejected request, if the server answered at all.
	pub fn status_code(&self) -> Option<u16> {
		match self {
			Self::Status { status_code, .. } => Some(*status_code),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
	pub status_code: u16,
	pub json: Value,
}

impl Response {
	pub fn new(status_code: u16, json: Value) -> Self {
		Self { status_code, json }
	}

	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status_code)
	}

	pub fn error_for_status(self, method: Method, path: &str) -> Result<Self, Error> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(Error::Status {
				method,
				path: path.to_string(),
				status_code: self.status_code,
				body: self.json,
			})
		}
	}
}

/// Authenticated access to one platform instance.
///
/// Implementors only provide [`Transport::send`], which must return whatever
/// status the server answered with. The provided helpers turn non-2xx
/// statuses into [`Error::Status`].
#[async_trait]
pub trait Transport: Send + Sync {
	async fn send(&self, method: Method, path: &str, body: Option<&Value>)
		-> Result<Response, Error>;

	async fn request(
		&self,
		method: Method,
		path: &str,
		body: Option<&Value>,
	) -> Result<Response, Error> {
		self.send(method.clone(), path, body)
			.await?
			.error_for_status(method, path)
	}

	async fn get(&self, path: &str) -> Result<Response, Error> {
		self.request(Method::GET, path, None).await
	}

	async fn put(&self, path: &str, body: &Value) -> Result<Response, Error> {
		self.request(Method::PUT, path, Some(body)).await
	}

	async fn post(&self, path: &str, body: &Value) -> Result<Response, Error> {
		self.request(Method::POST, path, Some(body)).await
	}

	async fn delete(&self, path: &str) -> Result<Response, Error> {
		self.request(Method::DELETE, path, None).await
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
	pub offset: usize,
	pub limit: usize,
}

impl Pagination {
	pub fn page(page: usize, page_size: usize) -> Self {
		Self {
			offset: page * page_size,
			limit: page_size,
		}
	}

	pub fn payload(&self) -> Value {
		json!({ "pagination": self })
	}
}

/// One page of a paginated list endpoint.
#[derive(Debug, Clone)]
pub struct Page<T> {
	pub status: String,
	pub items: Vec<T>,
	pub total: Option<usize>,
}

impl<T: DeserializeOwned> Page<T> {
	/// Decodes `{status, <items_key>: [...], meta.pagination.total}`.
	pub fn from_value(mut json: Value, items_key: &str) -> Result<Self, Error> {
		let status = json
			.get("status")
			.and_then(Value::as_str)
			.unwrap_or_default()
			.to_string();

		let items = match json.get_mut(items_key).map(Value::take) {
			None | Some(Value::Null) => Vec::new(),
			Some(items) => serde_json::from_value(items)?,
		};

		let total = json
			.pointer("/meta/pagination/total")
			.and_then(Value::as_u64)
			.map(|total| total as usize);

		Ok(Self {
			status,
			items,
			total,
		})
	}
}

impl<T> Page<T> {
	pub fn is_success(&self) -> bool {
		self.status == "success"
	}
}

/// A full single-object record. Only the `tags` array is interpreted, every
/// other field is carried through untouched on write-back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
	pub fn from_value(json: Value) -> Result<Self, Error> {
		Ok(serde_json::from_value(json)?)
	}

	pub fn from_serializable(value: &impl Serialize) -> Result<Self, Error> {
		Self::from_value(serde_json::to_value(value)?)
	}

	/// String entries of the `tags` array. Anything else in it is left out
	/// here and put back by [`Document::set_tags`].
	pub fn tags(&self) -> Vec<String> {
		let Some(tags) = self.0.get("tags").and_then(Value::as_array) else {
			return Vec::new();
		};

		let strings = tags
			.iter()
			.filter_map(|tag| tag.as_str().map(str::to_string))
			.collect::<Vec<_>>();
		if strings.len() < tags.len() {
			warn!(
				ignored = tags.len() - strings.len(),
				"tags array holds values that are not strings, keeping them as they are"
			);
		}
		strings
	}

	/// Replaces the string tags. Entries that are not strings are kept after them.
	pub fn set_tags(&mut self, tags: Vec<String>) {
		let others: Vec<Value> = self
			.0
			.get("tags")
			.and_then(Value::as_array)
			.map(|old| old.iter().filter(|tag| !tag.is_string()).cloned().collect())
			.unwrap_or_default();

		let mut values = tags.into_iter().map(Value::String).collect::<Vec<_>>();
		values.extend(others);
		self.0.insert("tags".to_string(), Value::Array(values));
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn to_value(&self) -> Value {
		Value::Object(self.0.clone())
	}
}

/// `"tags": null` reads as no tags.
fn nullable_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Escapes a value so it stays a single path segment.
fn segment(raw: &str) -> Cow<'_, str> {
	urlencoding::encode(raw)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
	pub client_id: u64,
	#[serde(default)]
	pub name: String,
	#[serde(default, deserialize_with = "nullable_tags")]
	pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
	pub id: String,
	pub client_id: u64,
	#[serde(default)]
	pub asset: String,
	#[serde(default, deserialize_with = "nullable_tags")]
	pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
	pub id: u64,
	pub client_id: u64,
	#[serde(default)]
	pub name: String,
	#[serde(default, deserialize_with = "nullable_tags")]
	pub tags: Vec<String>,
	/// Number of findings in the report.
	#[serde(default)]
	pub findings: u64,
}

/// Findings come back from the list endpoint with every field, so the list
/// item itself is what gets written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
	pub flaw_id: u64,
	pub client_id: u64,
	pub report_id: u64,
	#[serde(default)]
	pub title: String,
	#[serde(default, deserialize_with = "nullable_tags")]
	pub tags: Vec<String>,
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Writeup {
	pub doc_id: u64,
	#[serde(default)]
	pub title: String,
	#[serde(default, deserialize_with = "nullable_tags")]
	pub tags: Vec<String>,
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

pub mod clients {
	use super::*;

	pub use list::exec as list;
	pub mod list {
		use super::*;

		pub type Response = Page<ClientSummary>;

		pub async fn exec(api: &dyn Transport, pagination: Pagination) -> Result<Response, Error> {
			let response = api.post("/api/v2/clients", &pagination.payload()).await?;
			Page::from_value(response.json, "data")
		}
	}

	pub use get::exec as get;
	pub mod get {
		use super::*;

		pub async fn exec(api: &dyn Transport, client_id: u64) -> Result<Document, Error> {
			let response = api.get(&format!("/api/v1/client/{client_id}")).await?;
			Document::from_value(response.json)
		}
	}

	pub use update::exec as update;
	pub mod update {
		use super::*;

		pub async fn exec(
			api: &dyn Transport,
			client_id: u64,
			client: &Document,
		) -> Result<(), Error> {
			api.put(&format!("/api/v1/client/{client_id}"), &client.to_value())
				.await
				.map(|_| ())
		}
	}
}

pub mod assets {
	use super::*;

	pub use list_tenant::exec as list_tenant;
	pub mod list_tenant {
		use super::*;

		pub type Response = Page<AssetSummary>;

		pub async fn exec(api: &dyn Transport, pagination: Pagination) -> Result<Response, Error> {
			let response = api.post("/api/v2/assets", &pagination.payload()).await?;
			Page::from_value(response.json, "assets")
		}
	}

	pub use get::exec as get;
	pub mod get {
		use super::*;

		pub async fn exec(
			api: &dyn Transport,
			client_id: u64,
			asset_id: &str,
		) -> Result<Document, Error> {
			let response = api
				.get(&format!(
					"/api/v1/client/{client_id}/asset/{}",
					segment(asset_id)
				))
				.await?;
			Document::from_value(response.json)
		}
	}

	pub use update::exec as update;
	pub mod update {
		use super::*;

		pub async fn exec(
			api: &dyn Transport,
			client_id: u64,
			asset_id: &str,
			asset: &Document,
		) -> Result<(), Error> {
			api.put(
				&format!("/api/v1/client/{client_id}/asset/{}", segment(asset_id)),
				&asset.to_value(),
			)
			.await
			.map(|_| ())
		}
	}
}

pub mod reports {
	use super::*;

	pub use list::exec as list;
	pub mod list {
		use super::*;

		pub type Response = Page<ReportSummary>;

		pub async fn exec(api: &dyn Transport, pagination: Pagination) -> Result<Response, Error> {
			let response = api.post("/api/v2/reports", &pagination.payload()).await?;
			Page::from_value(response.json, "data")
		}
	}

	pub use get::exec as get;
	pub mod get {
		use super::*;

		pub async fn exec(
			api: &dyn Transport,
			client_id: u64,
			report_id: u64,
		) -> Result<Document, Error> {
			let response = api
				.get(&format!("/api/v1/client/{client_id}/report/{report_id}"))
				.await?;
			Document::from_value(response.json)
		}
	}

	pub use update::exec as update;
	pub mod update {
		use super::*;

		pub async fn exec(
			api: &dyn Transport,
			client_id: u64,
			report_id: u64,
			report: &Document,
		) -> Result<(), Error> {
			api.put(
				&format!("/api/v1/client/{client_id}/report/{report_id}"),
				&report.to_value(),
			)
			.await
			.map(|_| ())
		}
	}
}

pub mod findings {
	use super::*;

	pub use list_by_report::exec as list_by_report;
	pub mod list_by_report {
		use super::*;

		pub type Response = Page<Finding>;

		pub async fn exec(
			api: &dyn Transport,
			client_id: u64,
			report_id: u64,
			pagination: Pagination,
		) -> Result<Response, Error> {
			let response = api
				.post(
					&format!("/api/v2/clients/{client_id}/reports/{report_id}/findings"),
					&pagination.payload(),
				)
				.await?;
			Page::from_value(response.json, "data")
		}
	}

	pub use update::exec as update;
	pub mod update {
		use super::*;

		pub async fn exec(
			api: &dyn Transport,
			client_id: u64,
			report_id: u64,
			finding_id: u64,
			finding: &Document,
		) -> Result<(), Error> {
			api.put(
				&format!("/api/v1/client/{client_id}/report/{report_id}/flaw/{finding_id}"),
				&finding.to_value(),
			)
			.await
			.map(|_| ())
		}
	}
}

/// Content library writeups. The list endpoint is not paginated.
pub mod writeups {
	use super::*;

	pub use list::exec as list;
	pub mod list {
		use super::*;

		pub type Response = Vec<Writeup>;

		pub async fn exec(api: &dyn Transport) -> Result<Response, Error> {
			let response = api.get("/api/v1/writeups").await?;
			Ok(serde_json::from_value(response.json)?)
		}
	}

	pub use update::exec as update;
	pub mod update {
		use super::*;

		pub async fn exec(api: &dyn Transport, doc_id: u64, writeup: &Document) -> Result<(), Error> {
			api.put(&format!("/api/v1/writeups/{doc_id}"), &writeup.to_value())
				.await
				.map(|_| ())
		}
	}
}

/// The tenant-wide tag dictionary that feeds tag pickers.
pub mod tenant_tags {
	use super::*;

	/// Tenant tags are addressed by a composed id rather than their name.
	pub fn tag_id(tenant_id: u64, name: &str) -> String {
		format!("tag_tenant_{tenant_id}_{name}")
	}

	pub use create::exec as create;
	pub mod create {
		use super::*;

		pub async fn exec(api: &dyn Transport, tenant_id: u64, name: &str) -> Result<(), Error> {
			api.post(
				&format!("/api/v1/tenant/{tenant_id}/tag"),
				&json!({
					"name": name,
					"scope": "tenant",
					"ownerId": tenant_id,
				}),
			)
			.await
			.map(|_| ())
		}
	}

	pub use delete::exec as delete;
	pub mod delete {
		use super::*;

		pub async fn exec(api: &dyn Transport, tenant_id: u64, name: &str) -> Result<(), Error> {
			api.delete(&format!(
				"/api/v1/tenant/{tenant_id}/tag/{}",
				segment(&tag_id(tenant_id, name))
			))
			.await
			.map(|_| ())
		}
	}
}
