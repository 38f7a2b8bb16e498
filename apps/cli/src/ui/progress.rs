//! Spinners for the few long waits that happen before any logging starts

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
	let pb = ProgressBar::new_spinner();
	pb.set_style(
		ProgressStyle::with_template("{spinner:.green} {msg}")
			.unwrap_or_else(|_| ProgressStyle::default_spinner())
			.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
	);
	pb.set_message(message.to_string());
	pb.enable_steady_tick(Duration::from_millis(100));
	pb
}
