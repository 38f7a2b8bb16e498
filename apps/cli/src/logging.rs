use crate::config::LoggingConfig;

use anyhow::{Context, Result};
use tracing_appender::{
	non_blocking::WorkerGuard,
	rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_NAME: &str = "bulk-tags.log";

/// Initialize tracing with console output and, when enabled, a daily rotated
/// log file. The returned guard must live until exit or buffered lines are lost.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

	let (file_layer, guard) = if config.save_to_file {
		std::fs::create_dir_all(&config.directory).with_context(|| {
			format!(
				"failed to create logs directory {}",
				config.directory.display()
			)
		})?;

		let appender = RollingFileAppender::new(Rotation::DAILY, &config.directory, LOG_FILE_NAME);
		let (writer, guard) = tracing_appender::non_blocking(appender);

		let layer = fmt::layer()
			.with_target(true)
			.with_ansi(false) // No ANSI colors in log files
			.with_writer(writer);

		(Some(layer), Some(guard))
	} else {
		(None, None)
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_target(false).with_writer(std::io::stdout))
		.with(file_layer)
		.try_init()
		.context("failed to initialize tracing")?;

	Ok(guard)
}

/// Our own crates log at `level`, dependencies only warn.
fn default_directives(level: &str) -> String {
	format!("warn,bt_api={level},bt_core={level},bulk_tags={level}")
}
