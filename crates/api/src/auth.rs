//! Username/password login with an optional MFA step.

use crate::{Error, Transport};

use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct Credentials {
	pub username: String,
	pub password: String,
}

/// An authenticated session, handed explicitly to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	pub tenant_id: u64,
	pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Login {
	Complete(Session),
	/// The account has MFA enabled; the pending token must be exchanged
	/// together with a code through [`verify_mfa`].
	MfaRequired { tenant_id: u64, pending_token: String },
}

#[derive(Deserialize)]
struct AuthenticateResponse {
	#[serde(default)]
	status: String,
	token: Option<String>,
	tenant_id: Option<u64>,
	#[serde(default)]
	mfa_enabled: bool,
	message: Option<String>,
}

impl AuthenticateResponse {
	fn into_parts(self) -> Result<(u64, String, bool), Error> {
		if self.status != "success" {
			return Err(Error::Authentication(
				self.message.unwrap_or_else(|| format!("status '{}'", self.status)),
			));
		}

		match (self.tenant_id, self.token) {
			(Some(tenant_id), Some(token)) => Ok((tenant_id, token, self.mfa_enabled)),
			_ => Err(Error::Authentication(
				"response did not contain a token and tenant id".to_string(),
			)),
		}
	}
}

pub async fn login(api: &dyn Transport, credentials: &Credentials) -> Result<Login, Error> {
	let response = api
		.post(
			"/api/v1/authenticate",
			&json!({
				"username": credentials.username,
				"password": credentials.password,
			}),
		)
		.await?;

	let (tenant_id, token, mfa_enabled) =
		serde_json::from_value::<AuthenticateResponse>(response.json)?.into_parts()?;

	Ok(if mfa_enabled {
		Login::MfaRequired {
			tenant_id,
			pending_token: token,
		}
	} else {
		Login::Complete(Session { tenant_id, token })
	})
}

pub async fn verify_mfa(
	api: &dyn Transport,
	tenant_id: u64,
	pending_token: &str,
	code: &str,
) -> Result<Session, Error> {
	let response = api
		.post(
			"/api/v1/authenticate/mfa",
			&json!({
				"token": pending_token,
				"code": code,
			}),
		)
		.await?;

	// The MFA answer does not always repeat the tenant id.
	let res: AuthenticateResponse = serde_json::from_value(response.json)?;
	let (_, token, _) = AuthenticateResponse {
		tenant_id: res.tenant_id.or(Some(tenant_id)),
		..res
	}
	.into_parts()?;

	Ok(Session { tenant_id, token })
}
