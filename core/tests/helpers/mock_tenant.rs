//! In-memory tenant that answers the platform's REST paths

use async_trait::async_trait;
use bt_api::{Error, Method, Response, Transport};
use serde_json::{json, Map, Value};
use std::{
	collections::{BTreeSet, HashMap},
	sync::{Mutex, MutexGuard},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
	pub method: Method,
	pub path: String,
	pub body: Option<Value>,
}

#[derive(Default)]
struct State {
	clients: Vec<Value>,
	assets: Vec<Value>,
	reports: Vec<Value>,
	findings: Vec<Value>,
	writeups: Vec<Value>,
	tenant_tags: BTreeSet<String>,
	/// Overrides the total every list endpoint reports
	reported_total: Option<usize>,
	failures: HashMap<(Method, String), u16>,
	history: Vec<Request>,
}

/// Mock platform instance for one tenant
pub struct MockTenant {
	tenant_id: u64,
	state: Mutex<State>,
}

impl MockTenant {
	pub fn new(tenant_id: u64) -> Self {
		Self {
			tenant_id,
			state: Mutex::new(State::default()),
		}
	}

	pub fn tenant_id(&self) -> u64 {
		self.tenant_id
	}

	pub fn with_clients(mut self, clients: impl IntoIterator<Item = Value>) -> Self {
		self.state_mut().clients.extend(clients);
		self
	}

	pub fn with_assets(mut self, assets: impl IntoIterator<Item = Value>) -> Self {
		self.state_mut().assets.extend(assets);
		self
	}

	/// Reports are listed with a `findings` count derived from the findings
	/// added through [`MockTenant::with_findings`].
	pub fn with_reports(mut self, reports: impl IntoIterator<Item = Value>) -> Self {
		self.state_mut().reports.extend(reports);
		self
	}

	pub fn with_findings(mut self, findings: impl IntoIterator<Item = Value>) -> Self {
		self.state_mut().findings.extend(findings);
		self
	}

	pub fn with_writeups(mut self, writeups: impl IntoIterator<Item = Value>) -> Self {
		self.state_mut().writeups.extend(writeups);
		self
	}

	pub fn with_tenant_tags(mut self, tags: &[&str]) -> Self {
		self.state_mut()
			.tenant_tags
			.extend(tags.iter().map(|tag| tag.to_string()));
		self
	}

	/// Every list endpoint reports `total` regardless of what it holds.
	pub fn reporting_total(mut self, total: usize) -> Self {
		self.state_mut().reported_total = Some(total);
		self
	}

	/// Answers `method path` with `status_code` from now on.
	pub fn failing(mut self, method: Method, path: &str, status_code: u16) -> Self {
		self.state_mut()
			.failures
			.insert((method, path.to_string()), status_code);
		self
	}

	pub fn client(&self, client_id: u64) -> Value {
		find(&self.state().clients, &[("client_id", client_id.to_string().as_str())])
	}

	pub fn asset(&self, asset_id: &str) -> Value {
		find(&self.state().assets, &[("id", asset_id)])
	}

	pub fn report(&self, report_id: u64) -> Value {
		find(&self.state().reports, &[("id", report_id.to_string().as_str())])
	}

	pub fn finding(&self, flaw_id: u64) -> Value {
		find(&self.state().findings, &[("flaw_id", flaw_id.to_string().as_str())])
	}

	pub fn writeup(&self, doc_id: u64) -> Value {
		find(&self.state().writeups, &[("doc_id", doc_id.to_string().as_str())])
	}

	pub fn tenant_tags(&self) -> Vec<String> {
		self.state().tenant_tags.iter().cloned().collect()
	}

	pub fn history(&self) -> Vec<Request> {
		self.state().history.clone()
	}

	/// Requests made with `method`, in order
	pub fn paths(&self, method: Method) -> Vec<String> {
		self.state()
			.history
			.iter()
			.filter(|request| request.method == method)
			.map(|request| request.path.clone())
			.collect()
	}

	/// Index of the first matching request in the history
	pub fn position(&self, method: Method, path: &str) -> Option<usize> {
		self.state()
			.history
			.iter()
			.position(|request| request.method == method && request.path == path)
	}

	fn state(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap()
	}

	fn state_mut(&mut self) -> &mut State {
		self.state.get_mut().unwrap()
	}

	fn route(&self, state: &mut State, method: &Method, path: &str, body: Option<&Value>) -> Response {
		let tenant = self.tenant_id.to_string();
		let decoded = path
			.trim_start_matches('/')
			.split('/')
			.map(|segment| {
				urlencoding::decode(segment)
					.map(|segment| segment.into_owned())
					.unwrap_or_else(|_| segment.to_string())
			})
			.collect::<Vec<_>>();
		let segments = decoded.iter().map(String::as_str).collect::<Vec<_>>();
		let total = state.reported_total;

		match (method.as_str(), segments.as_slice()) {
			("POST", ["api", "v2", "clients"]) => page(&state.clients, "data", body, total),
			("GET", ["api", "v1", "client", c]) => detail(&state.clients, &[("client_id", *c)]),
			("PUT", ["api", "v1", "client", c]) => {
				replace(&mut state.clients, &[("client_id", *c)], body)
			}

			("POST", ["api", "v2", "assets"]) => page(&state.assets, "assets", body, total),
			("GET", ["api", "v1", "client", c, "asset", a]) => {
				detail(&state.assets, &[("client_id", *c), ("id", *a)])
			}
			("PUT", ["api", "v1", "client", c, "asset", a]) => {
				replace(&mut state.assets, &[("client_id", *c), ("id", *a)], body)
			}

			("POST", ["api", "v2", "reports"]) => {
				let summaries = state
					.reports
					.iter()
					.map(|report| {
						let findings = state
							.findings
							.iter()
							.filter(|finding| {
								finding["report_id"] == report["id"]
									&& finding["client_id"] == report["client_id"]
							})
							.count();

						let mut summary = report.clone();
						summary["findings"] = json!(findings);
						summary
					})
					.collect::<Vec<_>>();
				page(&summaries, "data", body, total)
			}
			("GET", ["api", "v1", "client", c, "report", r]) => {
				detail(&state.reports, &[("client_id", *c), ("id", *r)])
			}
			("PUT", ["api", "v1", "client", c, "report", r]) => {
				replace(&mut state.reports, &[("client_id", *c), ("id", *r)], body)
			}

			("POST", ["api", "v2", "clients", c, "reports", r, "findings"]) => {
				let findings = state
					.findings
					.iter()
					.filter(|finding| {
						matches(finding, "client_id", *c) && matches(finding, "report_id", r)
					})
					.cloned()
					.collect::<Vec<_>>();
				page(&findings, "data", body, total)
			}
			("PUT", ["api", "v1", "client", c, "report", r, "flaw", f]) => replace(
				&mut state.findings,
				&[("client_id", *c), ("report_id", *r), ("flaw_id", *f)],
				body,
			),

			("GET", ["api", "v1", "writeups"]) => {
				Response::new(200, Value::Array(state.writeups.clone()))
			}
			("PUT", ["api", "v1", "writeups", d]) => {
				replace(&mut state.writeups, &[("doc_id", *d)], body)
			}

			("POST", ["api", "v1", "tenant", t, "tag"]) if *t == tenant => {
				let name = body
					.and_then(|body| body["name"].as_str())
					.unwrap_or_default()
					.to_string();
				if state.tenant_tags.insert(name) {
					Response::new(200, json!({ "status": "success" }))
				} else {
					Response::new(409, json!({ "message": "tag already exists" }))
				}
			}
			("DELETE", ["api", "v1", "tenant", t, "tag", id]) if *t == tenant => {
				let prefix = format!("tag_tenant_{tenant}_");
				let removed = id
					.strip_prefix(prefix.as_str())
					.map(|name| state.tenant_tags.remove(name))
					.unwrap_or(false);
				if removed {
					Response::new(200, Value::Null)
				} else {
					Response::new(404, json!({ "message": "tag not found" }))
				}
			}

			_ => Response::new(404, json!({ "message": "no such endpoint" })),
		}
	}
}

#[async_trait]
impl Transport for MockTenant {
	async fn send(
		&self,
		method: Method,
		path: &str,
		body: Option<&Value>,
	) -> Result<Response, Error> {
		let mut state = self.state();
		state.history.push(Request {
			method: method.clone(),
			path: path.to_string(),
			body: body.cloned(),
		});

		if let Some(&status_code) = state.failures.get(&(method.clone(), path.to_string())) {
			return Ok(Response::new(
				status_code,
				json!({ "message": "injected failure" }),
			));
		}

		Ok(self.route(&mut state, &method, path, body))
	}
}

/// Compares an id field with a path segment, whether the id is a number or a string.
fn matches(document: &Value, key: &str, raw: &str) -> bool {
	match &document[key] {
		Value::String(value) => value == raw,
		Value::Number(value) => value.to_string() == raw,
		_ => false,
	}
}

fn position(documents: &[Value], keys: &[(&str, &str)]) -> Option<usize> {
	documents
		.iter()
		.position(|document| keys.iter().all(|(key, raw)| matches(document, key, raw)))
}

fn find(documents: &[Value], keys: &[(&str, &str)]) -> Value {
	position(documents, keys)
		.map(|index| documents[index].clone())
		.unwrap_or(Value::Null)
}

fn detail(documents: &[Value], keys: &[(&str, &str)]) -> Response {
	match position(documents, keys) {
		Some(index) => Response::new(200, documents[index].clone()),
		None => Response::new(404, json!({ "message": "not found" })),
	}
}

fn replace(documents: &mut [Value], keys: &[(&str, &str)], body: Option<&Value>) -> Response {
	match (position(documents, keys), body) {
		(Some(index), Some(body)) => {
			documents[index] = body.clone();
			Response::new(200, body.clone())
		}
		(Some(_), None) => Response::new(400, json!({ "message": "missing body" })),
		(None, _) => Response::new(404, json!({ "message": "not found" })),
	}
}

fn page(items: &[Value], key: &str, body: Option<&Value>, reported_total: Option<usize>) -> Response {
	let pagination = body.map(|body| &body["pagination"]);
	let offset = pagination
		.and_then(|p| p["offset"].as_u64())
		.unwrap_or(0) as usize;
	let limit = pagination
		.and_then(|p| p["limit"].as_u64())
		.map(|limit| limit as usize)
		.unwrap_or(items.len());

	let data = items
		.iter()
		.skip(offset)
		.take(limit)
		.cloned()
		.collect::<Vec<_>>();

	let mut json = Map::new();
	json.insert("status".to_string(), json!("success"));
	json.insert(key.to_string(), Value::Array(data));
	json.insert(
		"meta".to_string(),
		json!({
			"pagination": {
				"offset": offset,
				"limit": limit,
				"total": reported_total.unwrap_or(items.len()),
			}
		}),
	);

	Response::new(200, Value::Object(json))
}
