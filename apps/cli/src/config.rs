//! CLI configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Tool configuration, read from a TOML file next to the binary by default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Base URL of the instance, e.g. `https://reports.example.com`
	pub instance_url: String,
	/// Asked for at start-up when not set
	pub username: Option<String>,
	/// Asked for at start-up when not set
	pub password: Option<String>,
	pub requests: RequestsConfig,
	pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestsConfig {
	pub verify_ssl: bool,
	pub retries: u32,
}

impl Default for RequestsConfig {
	fn default() -> Self {
		Self {
			verify_ssl: true,
			retries: 0,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// Any `tracing` level: error, warn, info, debug, trace
	pub level: String,
	pub save_to_file: bool,
	pub directory: PathBuf,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			save_to_file: true,
			directory: PathBuf::from("logs"),
		}
	}
}

impl Config {
	/// Load the config file, writing a default one first if it doesn't exist
	pub fn load(path: &Path) -> Result<Self> {
		if path.exists() {
			let raw = std::fs::read_to_string(path)
				.with_context(|| format!("failed to read {}", path.display()))?;
			toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
		} else {
			let config = Self::default();
			config.save(path)?;
			Ok(config)
		}
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent)?;
		}

		let raw = toml::to_string_pretty(self)?;
		std::fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))?;
		Ok(())
	}

	pub fn validate(&self) -> Result<(), Vec<String>> {
		let mut errors = Vec::new();

		if self.instance_url.trim().is_empty() {
			errors.push("instance_url is not set".to_string());
		} else if !self.instance_url.starts_with("https://")
			&& !self.instance_url.starts_with("http://")
		{
			errors.push(format!(
				"instance_url '{}' must start with http:// or https://",
				self.instance_url
			));
		}

		if self.logging.level.parse::<LevelFilter>().is_err() {
			errors.push(format!("unknown log level '{}'", self.logging.level));
		}

		if errors.is_empty() {
			Ok(())
		} else {
			Err(errors)
		}
	}
}
