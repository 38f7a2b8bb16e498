use std::{
	fmt,
	time::{Duration, Instant},
};

/// Progress over a known number of items, with elapsed time and an ETA.
#[derive(Debug)]
pub struct IterationMetrics {
	total: usize,
	index: usize,
	started: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationStatus {
	pub index: usize,
	pub total: usize,
	pub elapsed: Duration,
	pub eta: Duration,
}

impl IterationMetrics {
	pub fn new(total: usize) -> Self {
		Self {
			total,
			index: 0,
			started: Instant::now(),
		}
	}

	/// Marks one more item as done.
	pub fn tick(&mut self) -> IterationStatus {
		self.index = (self.index + 1).min(self.total.max(1));
		self.status_at(self.started.elapsed())
	}

	fn status_at(&self, elapsed: Duration) -> IterationStatus {
		let remaining = self.total.saturating_sub(self.index) as u32;
		let eta = match self.index {
			0 => Duration::ZERO,
			done => (elapsed / done as u32) * remaining,
		};

		IterationStatus {
			index: self.index,
			total: self.total,
			elapsed,
			eta,
		}
	}
}

impl IterationStatus {
	pub fn percent(&self) -> f64 {
		if self.total == 0 {
			100.0
		} else {
			self.index as f64 * 100.0 / self.total as f64
		}
	}
}

impl fmt::Display for IterationStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}/{} ({:.1}%) elapsed {} eta {}",
			self.index,
			self.total,
			self.percent(),
			HumanDuration(self.elapsed),
			HumanDuration(self.eta)
		)
	}
}

struct HumanDuration(Duration);

impl fmt::Display for HumanDuration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let secs = self.0.as_secs();
		match (secs / 3600, (secs % 3600) / 60, secs % 60) {
			(0, 0, s) => write!(f, "{s}s"),
			(0, m, s) => write!(f, "{m}m{s:02}s"),
			(h, m, s) => write!(f, "{h}h{m:02}m{s:02}s"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn eta_is_average_time_times_remaining() {
		let mut metrics = IterationMetrics::new(4);
		metrics.index = 1;

		let status = metrics.status_at(Duration::from_secs(10));

		assert_eq!(status.eta, Duration::from_secs(30));
		assert_eq!(status.percent(), 25.0);
		assert_eq!(status.to_string(), "1/4 (25.0%) elapsed 10s eta 30s");
	}

	#[test]
	fn tick_never_runs_past_total() {
		let mut metrics = IterationMetrics::new(2);
		metrics.tick();
		metrics.tick();
		let status = metrics.tick();

		assert_eq!(status.index, 2);
		assert_eq!(status.eta, Duration::ZERO);
	}

	#[test]
	fn long_durations_are_readable() {
		assert_eq!(HumanDuration(Duration::from_secs(75)).to_string(), "1m15s");
		assert_eq!(HumanDuration(Duration::from_secs(3725)).to_string(), "1h02m05s");
	}
}
