mod config;
mod logging;
mod operator;
mod ui;

use crate::{
	config::Config,
	operator::{ConsoleOperator, TagArg},
};

use bt_api::{
	auth::{self, Credentials, Login, Session},
	HttpOptions, HttpTransport,
};
use bt_core::{ObjectKind, Orchestrator, RunOutcome, TagAction, TagLocations, TagPlan};

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use dialoguer::{Input, Password};
use std::{path::PathBuf, process::ExitCode};
use tracing::{info, warn};

/// Exit status when the operator declines a confirmation.
const DECLINED: u8 = 2;

#[derive(Parser, Debug)]
#[command(
	name = "bulk-tags",
	version,
	about = "Refactor, remove or add tags across every object of a tenant"
)]
struct Cli {
	/// Path to the TOML configuration file
	#[arg(long, env = "BULK_TAGS_CONFIG", default_value = config::DEFAULT_CONFIG_FILE)]
	config: PathBuf,

	/// Instance URL, overrides `instance_url`
	#[arg(long)]
	instance_url: Option<String>,

	/// Overrides `username`
	#[arg(long)]
	username: Option<String>,

	/// Don't verify TLS certificates
	#[arg(long, default_value_t = false)]
	insecure: bool,

	/// Times a failed request is repeated, overrides `requests.retries`
	#[arg(long)]
	retries: Option<u32>,

	/// Overrides `logging.level`
	#[arg(long)]
	log_level: Option<String>,

	/// refactor, remove or add. Asked interactively when omitted
	#[arg(long, requires = "tags")]
	action: Option<TagAction>,

	/// `old=new` for refactor and add, `old` for remove. Repeatable
	#[arg(long = "tag", requires = "action")]
	tags: Vec<TagArg>,

	/// Only update these object kinds, e.g. `--only clients,assets`
	#[arg(long, value_delimiter = ',')]
	only: Vec<ObjectKind>,

	/// Answer yes to every confirmation
	#[arg(long, short = 'y', default_value_t = false)]
	yes: bool,
}

impl Cli {
	fn apply_to(&self, config: &mut Config) {
		if let Some(instance_url) = &self.instance_url {
			config.instance_url = instance_url.clone();
		}
		if let Some(username) = &self.username {
			config.username = Some(username.clone());
		}
		if self.insecure {
			config.requests.verify_ssl = false;
		}
		if let Some(retries) = self.retries {
			config.requests.retries = retries;
		}
		if let Some(level) = &self.log_level {
			config.logging.level = level.clone();
		}
	}

	fn locations(&self) -> TagLocations {
		if self.only.is_empty() {
			TagLocations::all()
		} else {
			TagLocations::only(self.only.iter().copied())
		}
	}

	/// The plan given through `--action` and `--tag`, validated up front.
	fn preset_plan(&self) -> Result<Option<TagPlan>> {
		let Some(action) = self.action else {
			return Ok(None);
		};

		let pairs = self.tags.iter().cloned().map(TagArg::into_pair);
		Ok(Some(TagPlan::new(action, pairs)?))
	}
}

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();

	match run(cli).await {
		Ok(code) => code,
		Err(e) => {
			eprintln!("{} {e:#}", "error:".red().bold());
			ExitCode::FAILURE
		}
	}
}

async fn run(cli: Cli) -> Result<ExitCode> {
	let mut config = Config::load(&cli.config)?;
	cli.apply_to(&mut config);
	if let Err(errors) = config.validate() {
		bail!(errors.join("; "));
	}

	let preset = cli.preset_plan()?;
	let locations = cli.locations();

	let _guard = logging::init(&config.logging)?;
	ui::print_banner();

	let options = HttpOptions {
		verify_ssl: config.requests.verify_ssl,
		retries: config.requests.retries,
	};
	if !options.verify_ssl {
		warn!("TLS certificate verification is disabled");
	}

	let transport = HttpTransport::new(&config.instance_url, options)?;
	let session = authenticate(&transport, &config).await?;
	let api = transport.with_session(&session);
	info!(instance = api.base_url(), tenant_id = session.tenant_id, "authenticated");

	let operator = ConsoleOperator::new(preset, cli.yes);
	let outcome = Orchestrator::new(&api, session.tenant_id, &operator)
		.with_locations(locations)
		.run()
		.await?;

	Ok(match outcome {
		RunOutcome::Declined(stage) => {
			warn!(%stage, "stopped by operator, nothing was changed");
			ExitCode::from(DECLINED)
		}
		RunOutcome::Completed(report) => {
			ui::print_summary(&report);
			if report.is_success() {
				ExitCode::SUCCESS
			} else {
				ExitCode::FAILURE
			}
		}
	})
}

async fn authenticate(api: &HttpTransport, config: &Config) -> Result<Session> {
	let username = match &config.username {
		Some(username) => username.clone(),
		None => Input::<String>::new().with_prompt("Username").interact_text()?,
	};
	let password = match &config.password {
		Some(password) => password.clone(),
		None => Password::new().with_prompt("Password").interact()?,
	};

	let spinner = ui::create_spinner("Authenticating...");
	let login = auth::login(api, &Credentials { username, password }).await;
	spinner.finish_and_clear();

	match login.context("could not log in")? {
		Login::Complete(session) => Ok(session),
		Login::MfaRequired {
			tenant_id,
			pending_token,
		} => {
			let code: String = Input::new().with_prompt("MFA code").interact_text()?;

			let spinner = ui::create_spinner("Verifying MFA code...");
			let session = auth::verify_mfa(api, tenant_id, &pending_token, code.trim()).await;
			spinner.finish_and_clear();

			session.context("could not verify MFA code")
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn flags_override_config() {
		let cli = Cli::parse_from([
			"bulk-tags",
			"--instance-url",
			"https://other.example.com",
			"--insecure",
			"--retries",
			"2",
			"--log-level",
			"debug",
		]);
		let mut config = Config::default();
		config.instance_url = "https://reports.example.com".to_string();
		config.username = Some("auditor".to_string());

		cli.apply_to(&mut config);

		assert_eq!(config.instance_url, "https://other.example.com");
		assert_eq!(config.username.as_deref(), Some("auditor"));
		assert!(!config.requests.verify_ssl);
		assert_eq!(config.requests.retries, 2);
		assert_eq!(config.logging.level, "debug");
	}

	#[test]
	fn tags_on_the_command_line_make_a_plan() {
		let cli = Cli::parse_from([
			"bulk-tags",
			"--action",
			"refactor",
			"--tag",
			"old=new",
			"--tag",
			"a=b",
		]);

		let plan = cli.preset_plan().unwrap().unwrap();

		assert_eq!(plan, TagPlan::refactor([("old", "new"), ("a", "b")]).unwrap());
	}

	#[test]
	fn invalid_command_line_plan_is_rejected() {
		let cli = Cli::parse_from(["bulk-tags", "--action", "add", "--tag", "critical"]);
		assert!(cli.preset_plan().is_err());

		let cli = Cli::parse_from(["bulk-tags", "--action", "remove", "--tag", "a", "--tag", "a"]);
		assert!(cli.preset_plan().is_err());
	}

	#[test]
	fn tags_need_an_action() {
		assert!(Cli::try_parse_from(["bulk-tags", "--tag", "old=new"]).is_err());
	}

	#[test]
	fn only_limits_locations() {
		let cli = Cli::parse_from(["bulk-tags", "--only", "clients,findings"]);
		let locations = cli.locations();

		assert_eq!(
			locations.selected(),
			vec![ObjectKind::Client, ObjectKind::Finding]
		);
		assert!(Cli::parse_from(["bulk-tags"]).locations().is_all_selected());
	}
}
