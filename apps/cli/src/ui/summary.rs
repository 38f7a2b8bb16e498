use bt_core::{Deregistration, ObjectKind, RunReport};

use colored::Colorize;
use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};

/// Per-kind counts of a finished run.
pub fn summary_table(report: &RunReport) -> Table {
	let mut table = Table::new();
	table.load_preset(UTF8_BORDERS_ONLY);
	table.set_header(vec!["Object", "Updated", "Unchanged", "Skipped"]);

	for kind in ObjectKind::ALL {
		let tally = report.tally(kind);
		table.add_row(vec![
			kind.to_string(),
			tally.updated.to_string(),
			tally.unchanged.to_string(),
			tally.skipped.to_string(),
		]);
	}

	table
}

fn deregistration_line(deregistration: Deregistration) -> Option<String> {
	match deregistration {
		Deregistration::NotApplicable => None,
		Deregistration::Done { all_removed: true } => {
			Some("old tags removed from the tenant".to_string())
		}
		Deregistration::Done { all_removed: false } => {
			Some("some old tags could not be removed from the tenant".to_string())
		}
		Deregistration::WithheldForSkips => Some(
			"old tags kept on the tenant since some objects could not be updated".to_string(),
		),
		Deregistration::WithheldForUnreadFindings => Some(
			"old tags kept on the tenant since the findings of some reports could not be loaded"
				.to_string(),
		),
		Deregistration::WithheldForLocations => Some(
			"old tags kept on the tenant since only some object kinds were updated".to_string(),
		),
	}
}

pub fn print_summary(report: &RunReport) {
	println!();
	println!("{}", summary_table(report));

	if report.registered == Some(false) {
		println!(
			"{} some new tags could not be added to the tenant and will not show up in tag pickers",
			"!".yellow()
		);
	}

	if let Some(line) = deregistration_line(report.deregistration) {
		let marker = match report.deregistration {
			Deregistration::Done { all_removed: true } => "✓".green(),
			_ => "!".yellow(),
		};
		println!("{marker} {line}");
	}

	if report.is_success() {
		println!("{} {} finished", "✓".green(), report.action);
	} else {
		println!(
			"{} {} finished with problems, see the log file for details",
			"✗".red(),
			report.action
		);
	}
}
