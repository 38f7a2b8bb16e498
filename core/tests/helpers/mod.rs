//! Test helper modules for integration tests
#![allow(dead_code)]

pub mod mock_tenant;
pub mod scripted_operator;

pub use mock_tenant::*;
pub use scripted_operator::*;

use serde_json::{json, Value};

pub fn client(client_id: u64, name: &str, tags: &[&str]) -> Value {
	json!({ "client_id": client_id, "name": name, "tags": tags, "poc": "Jane Doe" })
}

pub fn asset(asset_id: &str, client_id: u64, name: &str, tags: &[&str]) -> Value {
	json!({
		"id": asset_id,
		"client_id": client_id,
		"asset": name,
		"tags": tags,
		"type": "Workstation",
	})
}

pub fn report(report_id: u64, client_id: u64, name: &str, tags: &[&str]) -> Value {
	json!({
		"id": report_id,
		"client_id": client_id,
		"name": name,
		"tags": tags,
		"status": "Published",
	})
}

pub fn finding(flaw_id: u64, client_id: u64, report_id: u64, title: &str, tags: &[&str]) -> Value {
	json!({
		"flaw_id": flaw_id,
		"client_id": client_id,
		"report_id": report_id,
		"title": title,
		"tags": tags,
		"severity": "High",
	})
}

pub fn writeup(doc_id: u64, title: &str, tags: &[&str]) -> Value {
	json!({ "doc_id": doc_id, "title": title, "tags": tags, "source": "custom" })
}

pub fn tags_of(document: &Value) -> Vec<String> {
	document["tags"]
		.as_array()
		.map(|tags| {
			tags.iter()
				.filter_map(|tag| tag.as_str().map(str::to_string))
				.collect()
		})
		.unwrap_or_default()
}
