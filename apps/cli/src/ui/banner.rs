use colored::Colorize;

const WIDTH: usize = 68;

const LINES: [&str; 3] = [
	"Refactor, remove or add tags in bulk across every place a tag",
	"can live: clients, assets, reports, findings and writeups.",
	"Nothing is changed before you confirm twice.",
];

/// Print the start-up banner
pub fn print_banner() {
	let border = "=".repeat(WIDTH);
	let inner = WIDTH - 4;

	println!("{}", border.bright_blue());
	let title = format!("Bulk Tags v{}", env!("CARGO_PKG_VERSION"));
	println!(
		"{} {} {}",
		"=".bright_blue(),
		format!("{title:<inner$}").bold(),
		"=".bright_blue()
	);
	println!("{}", format!("={}=", "-".repeat(WIDTH - 2)).bright_blue());
	for line in LINES {
		println!("{} {line:<inner$} {}", "=".bright_blue(), "=".bright_blue());
	}
	println!("{}", border.bright_blue());
	println!();
}
