//! Operator that answers from a script instead of a terminal

use bt_core::{Operator, Result, TagPlan};
use std::{collections::VecDeque, sync::Mutex};

pub struct ScriptedOperator {
	plan: TagPlan,
	/// Answers to confirmations in order; once exhausted every answer is yes
	answers: Mutex<VecDeque<bool>>,
	questions: Mutex<Vec<String>>,
}

impl ScriptedOperator {
	pub fn approving(plan: TagPlan) -> Self {
		Self::answering(plan, Vec::new())
	}

	pub fn answering(plan: TagPlan, answers: impl IntoIterator<Item = bool>) -> Self {
		Self {
			plan,
			answers: Mutex::new(answers.into_iter().collect()),
			questions: Mutex::new(Vec::new()),
		}
	}

	pub fn questions(&self) -> Vec<String> {
		self.questions.lock().unwrap().clone()
	}
}

impl Operator for ScriptedOperator {
	fn collect_plan(&self) -> Result<TagPlan> {
		Ok(self.plan.clone())
	}

	fn confirm(&self, question: &str) -> Result<bool> {
		self.questions.lock().unwrap().push(question.to_string());
		Ok(self.answers.lock().unwrap().pop_front().unwrap_or(true))
	}
}
