//! Console implementation of the run's operator

use bt_core::{sanitize_tag, Error, Operator, Result, TagAction, TagPlan};

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::str::FromStr;
use tracing::info;

/// A `--tag` argument: `old=new` for refactor and add, `old` for remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagArg {
	pub source: String,
	pub destination: Option<String>,
}

impl TagArg {
	pub fn into_pair(self) -> (String, Option<String>) {
		(self.source, self.destination)
	}
}

impl FromStr for TagArg {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		let (source, destination) = match s.split_once('=') {
			Some((source, destination)) => (source.trim(), Some(destination.trim())),
			None => (s.trim(), None),
		};

		if source.is_empty() {
			return Err(format!("'{s}' has no source tag"));
		}
		if destination == Some("") {
			return Err(format!("'{s}' has an empty destination tag"));
		}

		Ok(Self {
			source: source.to_string(),
			destination: destination.map(str::to_string),
		})
	}
}

/// Asks the person at the terminal. A plan given on the command line skips
/// the tag questions, `assume_yes` skips the confirmations.
pub struct ConsoleOperator {
	preset: Option<TagPlan>,
	assume_yes: bool,
}

impl ConsoleOperator {
	pub fn new(preset: Option<TagPlan>, assume_yes: bool) -> Self {
		Self { preset, assume_yes }
	}

	fn select_action(&self) -> Result<TagAction> {
		let items = [
			"refactor - replace tags with new ones",
			"remove - delete tags",
			"add - add new tags next to existing ones",
		];

		let index = Select::with_theme(&ColorfulTheme::default())
			.with_prompt("What would you like to do")
			.items(&items)
			.default(0)
			.interact()
			.map_err(prompt_failed)?;

		Ok(TagAction::ALL[index])
	}

	/// Asks for one tag, offering to re-enter it when it isn't in canonical form.
	fn prompt_tag(&self, prompt: &str, sanitize: bool) -> Result<String> {
		let theme = ColorfulTheme::default();

		loop {
			let raw: String = Input::with_theme(&theme)
				.with_prompt(prompt)
				.interact_text()
				.map_err(prompt_failed)?;
			let tag = raw.trim().to_string();

			if tag.is_empty() {
				continue;
			}

			let clean = sanitize_tag(&tag);
			if !sanitize || clean == tag {
				return Ok(tag);
			}

			let keep = Confirm::with_theme(&theme)
				.with_prompt(format!(
					"'{tag}' contains characters tags usually don't ('{clean}' would be clean). Keep it anyway"
				))
				.default(false)
				.interact()
				.map_err(prompt_failed)?;

			if keep {
				return Ok(tag);
			}
		}
	}

	fn collect_sources(&self, action: TagAction) -> Result<Vec<String>> {
		// Whatever exists on the instance can be removed, clean or not.
		let sanitize = action != TagAction::Remove;
		let mut sources: Vec<String> = Vec::new();

		loop {
			let tag = self.prompt_tag(&format!("Tag to {action}"), sanitize)?;

			if sources.contains(&tag) {
				println!("{} '{tag}' was already entered", "!".yellow());
			} else {
				sources.push(tag);
			}

			let more = Confirm::with_theme(&ColorfulTheme::default())
				.with_prompt("Add another tag")
				.default(false)
				.interact()
				.map_err(prompt_failed)?;

			if !more {
				return Ok(sources);
			}
		}
	}
}

impl Operator for ConsoleOperator {
	fn collect_plan(&self) -> Result<TagPlan> {
		if let Some(plan) = &self.preset {
			return Ok(plan.clone());
		}

		let action = self.select_action()?;
		let sources = self.collect_sources(action)?;

		let mut pairs = Vec::with_capacity(sources.len());
		for source in sources {
			let destination = if action.needs_destination() {
				let prompt = match action {
					TagAction::Add => format!("Tag to add next to '{source}'"),
					_ => format!("Replace '{source}' with"),
				};
				Some(self.prompt_tag(&prompt, true)?)
			} else {
				None
			};
			pairs.push((source, destination));
		}

		Ok(TagPlan::new(action, pairs)?)
	}

	fn confirm(&self, question: &str) -> Result<bool> {
		if self.assume_yes {
			info!(question, "confirmed by --yes");
			return Ok(true);
		}

		Confirm::with_theme(&ColorfulTheme::default())
			.with_prompt(question)
			.default(false)
			.interact()
			.map_err(prompt_failed)
	}
}

fn prompt_failed(e: dialoguer::Error) -> Error {
	Error::Operator(e.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn tag_args_parse() {
		assert_eq!(
			"old=new".parse::<TagArg>().unwrap(),
			TagArg {
				source: "old".to_string(),
				destination: Some("new".to_string())
			}
		);
		assert_eq!(
			" stale ".parse::<TagArg>().unwrap(),
			TagArg {
				source: "stale".to_string(),
				destination: None
			}
		);
	}

	#[test]
	fn malformed_tag_args_are_rejected() {
		assert!("=new".parse::<TagArg>().is_err());
		assert!("old=".parse::<TagArg>().is_err());
		assert!("".parse::<TagArg>().is_err());
	}

	#[test]
	fn preset_plan_is_used_without_prompting() {
		let plan = TagPlan::refactor([("old", "new")]).unwrap();
		let operator = ConsoleOperator::new(Some(plan.clone()), true);

		assert_eq!(operator.collect_plan().unwrap(), plan);
		assert!(operator.confirm("Continue").unwrap());
	}
}
