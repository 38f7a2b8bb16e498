use crate::{auth::Session, Error, Method, Response, Transport};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
	/// Instances running on https without a valid certificate need this off.
	pub verify_ssl: bool,
	/// How many times a request is repeated after a transport error or a 5xx.
	pub retries: u32,
}

impl Default for HttpOptions {
	fn default() -> Self {
		Self {
			verify_ssl: true,
			retries: 0,
		}
	}
}

/// [`Transport`] backed by a `reqwest` client.
pub struct HttpTransport {
	client: reqwest::Client,
	base_url: String,
	token: Option<String>,
	retries: u32,
}

impl HttpTransport {
	pub fn new(base_url: impl Into<String>, options: HttpOptions) -> Result<Self, Error> {
		let client = reqwest::Client::builder()
			.danger_accept_invalid_certs(!options.verify_ssl)
			.build()?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			token: None,
			retries: options.retries,
		})
	}

	pub fn with_session(mut self, session: &Session) -> Self {
		self.token = Some(session.token.clone());
		self
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	async fn send_once(
		&self,
		method: Method,
		path: &str,
		body: Option<&Value>,
	) -> Result<Response, Error> {
		let mut req = self
			.client
			.request(method, format!("{}{}", self.base_url, path))
			.with_auth(self.token.as_deref());

		if let Some(body) = body {
			req = req.json(body);
		}

		let res = req.send().await?;
		let status_code = res.status().as_u16();
		let bytes = res.bytes().await?;

		let json = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes)
				.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
		};

		Ok(Response::new(status_code, json))
	}
}

trait WithAuth {
	fn with_auth(self, token: Option<&str>) -> Self;
}

impl WithAuth for reqwest::RequestBuilder {
	fn with_auth(self, token: Option<&str>) -> Self {
		match token {
			Some(token) => self.header("authorization", format!("Bearer {token}")),
			None => self,
		}
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn send(
		&self,
		method: Method,
		path: &str,
		body: Option<&Value>,
	) -> Result<Response, Error> {
		let mut attempt = 0;

		loop {
			let result = self.send_once(method.clone(), path, body).await;
			if attempt >= self.retries {
				return result;
			}

			let retry = match &result {
				Ok(res) if res.status_code >= 500 => {
					warn!(%method, path, status = res.status_code, attempt, "server error, retrying");
					true
				}
				Err(e) => {
					warn!(%method, path, error = %e, attempt, "request failed, retrying");
					true
				}
				Ok(_) => false,
			};
			if !retry {
				return result;
			}

			attempt += 1;
			debug!(%method, path, attempt, "retry");
		}
	}
}
