//! The intake wizard: one validated answer per question, in order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ValidationError, WizardError};
use crate::question::{default_currency_symbol, default_questions, CompiledRule, Question};

/// Separator placed between answers in the plan prompt
pub const DEFAULT_SEPARATOR: &str = ", ";

/// Everything that shapes a wizard: the questions and how answers are joined
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WizardConfig {
    /// Joins the answers into the plan prompt
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Currency symbol used by the default questions
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Custom question list; empty means the default questions
    #[serde(default)]
    pub questions: Vec<Question>,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            currency_symbol: default_currency_symbol(),
            questions: Vec::new(),
        }
    }
}

impl WizardConfig {
    /// The configured questions, or the defaults in the configured currency
    pub fn resolved_questions(&self) -> Vec<Question> {
        if self.questions.is_empty() {
            default_questions(&self.currency_symbol)
        } else {
            self.questions.clone()
        }
    }
}

/// Where the wizard is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum WizardState {
    /// Waiting for the answer to question `i`
    AskingQuestion(usize),
    /// Every answer is in; the plan has been requested
    PlanPending,
    /// A plan (or the failure text) has come back
    PlanReady,
}

/// Result of a submission that passed validation (or was ignored)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Moved on to question `next`
    Advanced { next: usize },
    /// The last answer was accepted; `prompt` is the joined answer set
    Completed { prompt: String },
    /// The submission targeted a question that is no longer active
    Ignored,
}

/// The intake state machine
#[derive(Debug, Clone)]
pub struct Wizard {
    questions: Vec<Question>,
    rules: Vec<Vec<CompiledRule>>,
    separator: String,
    answers: Vec<String>,
    state: WizardState,
}

impl Wizard {
    pub fn new(config: &WizardConfig) -> Result<Self, WizardError> {
        let questions = config.resolved_questions();

        let rules = questions
            .iter()
            .map(|q| {
                q.rules
                    .iter()
                    .map(|r| r.compile(&q.id))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let answers = vec![String::new(); questions.len()];

        Ok(Self {
            questions,
            rules,
            separator: config.separator.clone(),
            answers,
            state: WizardState::AskingQuestion(0),
        })
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Index of the active question; `None` once every answer is in
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            WizardState::AskingQuestion(i) => Some(i),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().map(|i| &self.questions[i])
    }

    /// Answers so far; unanswered slots are empty strings
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn is_complete(&self) -> bool {
        !matches!(self.state, WizardState::AskingQuestion(_))
    }

    pub fn progress_percent(&self) -> u8 {
        let answered = self.current_index().unwrap_or(self.total());
        ((answered * 100) / self.total()) as u8
    }

    /// The answer set joined in question order
    pub fn joined_answers(&self) -> String {
        self.answers.join(&self.separator)
    }

    /// Check an answer against a question without touching any state
    pub fn validate(&self, index: usize, answer: &str) -> Result<(), WizardError> {
        let (question, rules) = self
            .questions
            .get(index)
            .zip(self.rules.get(index))
            .ok_or(WizardError::NoSuchQuestion {
                index,
                total: self.total(),
            })?;
        for rule in rules {
            if let Err(message) = rule.check(answer) {
                return Err(ValidationError {
                    question_id: question.id.clone(),
                    index,
                    message: message.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Submit an answer for the active question
    pub fn submit(&mut self, answer: &str) -> Result<Step, WizardError> {
        match self.current_index() {
            Some(i) => self.submit_at(i, answer),
            None => Err(WizardError::NotAcceptingAnswers),
        }
    }

    /// Submit an answer for the question that was on screen when the user hit enter.
    ///
    /// A submission for any other question than the active one is ignored, so a
    /// repeated submit of the same form advances at most one step.
    pub fn submit_at(&mut self, index: usize, answer: &str) -> Result<Step, WizardError> {
        let current = match self.state {
            WizardState::AskingQuestion(i) if i == index => i,
            state => {
                debug!(index, ?state, "Ignoring submission for inactive question");
                return Ok(Step::Ignored);
            }
        };

        self.validate(current, answer)?;
        self.answers[current] = answer.to_string();

        if current + 1 < self.total() {
            self.state = WizardState::AskingQuestion(current + 1);
            Ok(Step::Advanced { next: current + 1 })
        } else {
            self.state = WizardState::PlanPending;
            Ok(Step::Completed {
                prompt: self.joined_answers(),
            })
        }
    }

    /// Record that the plan request has resolved, successfully or not
    pub fn mark_plan_ready(&mut self) {
        if self.state == WizardState::PlanPending {
            self.state = WizardState::PlanReady;
        }
    }

    /// Return to the first question with a blank answer set
    pub fn restart(&mut self) {
        self.answers = vec![String::new(); self.total()];
        self.state = WizardState::AskingQuestion(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::ValidationRule;

    const REFERENCE_ANSWERS: [&str; 7] = [
        "30",
        "$75000",
        "$3000",
        "Savings: $10000, Checking: $3000, 401k: $25000",
        "Car Loan: $5000, Credit Card Debt: $2000",
        "Pay off debt in 2 years, Buy a house in 5 years",
        "Moderately Aggressive",
    ];

    fn wizard() -> Wizard {
        Wizard::new(&WizardConfig::default()).unwrap()
    }

    #[test]
    fn test_starts_at_first_question() {
        let wizard = wizard();
        assert_eq!(wizard.state(), WizardState::AskingQuestion(0));
        assert_eq!(wizard.total(), 7);
        assert_eq!(wizard.current_question().unwrap().id, "age");
        assert_eq!(wizard.progress_percent(), 0);
    }

    #[test]
    fn test_invalid_answer_does_not_advance_or_mutate() {
        let mut wizard = wizard();
        wizard.submit("30").unwrap();

        let before = wizard.answers().to_vec();
        let err = wizard.submit("lots").unwrap_err();

        match err {
            WizardError::Validation(e) => {
                assert_eq!(e.question_id, "income");
                assert_eq!(e.index, 1);
                assert_eq!(e.message, "Must be a valid currency amount");
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
        assert_eq!(wizard.state(), WizardState::AskingQuestion(1));
        assert_eq!(wizard.answers(), before.as_slice());
    }

    #[test]
    fn test_every_question_rejects_blank_answer() {
        let mut wizard = wizard();
        for (i, answer) in REFERENCE_ANSWERS.iter().enumerate() {
            let before = wizard.answers().to_vec();
            assert!(wizard.submit("").is_err(), "question {i} accepted blank");
            assert_eq!(wizard.current_index(), Some(i));
            assert_eq!(wizard.answers(), before.as_slice());
            wizard.submit(answer).unwrap();
        }
    }

    #[test]
    fn test_completion_joins_answers_once() {
        let mut wizard = wizard();
        let mut completions = Vec::new();

        for answer in REFERENCE_ANSWERS {
            if let Step::Completed { prompt } = wizard.submit(answer).unwrap() {
                completions.push(prompt);
            }
        }

        assert_eq!(completions, vec![REFERENCE_ANSWERS.join(", ")]);
        assert_eq!(wizard.state(), WizardState::PlanPending);
        assert_eq!(wizard.progress_percent(), 100);
        assert!(matches!(
            wizard.submit("again"),
            Err(WizardError::NotAcceptingAnswers)
        ));
    }

    #[test]
    fn test_validate_out_of_range_index() {
        let wizard = wizard();
        assert!(matches!(
            wizard.validate(7, "30"),
            Err(WizardError::NoSuchQuestion { index: 7, total: 7 })
        ));
        assert!(wizard.validate(0, "30").is_ok());
    }

    #[test]
    fn test_age_accepts_large_numbers_up_to_length_limit() {
        let mut wizard = wizard();
        assert!(matches!(
            wizard.submit(&"1".repeat(120)),
            Err(WizardError::Validation(ref e)) if e.message == "Are you sure you're that old?"
        ));
        assert_eq!(wizard.current_index(), Some(0));
        assert_eq!(wizard.submit("150").unwrap(), Step::Advanced { next: 1 });
    }

    #[test]
    fn test_double_submit_advances_one_step() {
        let mut wizard = wizard();

        assert_eq!(
            wizard.submit_at(0, "30").unwrap(),
            Step::Advanced { next: 1 }
        );
        assert_eq!(wizard.submit_at(0, "30").unwrap(), Step::Ignored);
        assert_eq!(wizard.state(), WizardState::AskingQuestion(1));
        assert_eq!(wizard.answers()[1], "");
    }

    #[test]
    fn test_resubmitting_last_answer_does_not_complete_twice() {
        let mut wizard = wizard();
        for (i, answer) in REFERENCE_ANSWERS.iter().enumerate() {
            wizard.submit_at(i, answer).unwrap();
        }

        assert_eq!(wizard.submit_at(6, "Moderate").unwrap(), Step::Ignored);
        assert_eq!(wizard.answers()[6], "Moderately Aggressive");
    }

    #[test]
    fn test_mark_ready_and_restart() {
        let mut wizard = wizard();
        wizard.mark_plan_ready();
        assert_eq!(wizard.state(), WizardState::AskingQuestion(0));

        for answer in REFERENCE_ANSWERS {
            wizard.submit(answer).unwrap();
        }
        wizard.mark_plan_ready();
        assert_eq!(wizard.state(), WizardState::PlanReady);

        wizard.restart();
        assert_eq!(wizard.state(), WizardState::AskingQuestion(0));
        assert!(wizard.answers().iter().all(String::is_empty));
    }

    #[test]
    fn test_custom_questions_and_separator() {
        let config = WizardConfig {
            separator: " | ".to_string(),
            currency_symbol: "€".to_string(),
            questions: vec![
                Question::new("name", "Name?").with_rule(ValidationRule::Required {
                    message: "name please".to_string(),
                }),
                Question::new("zip", "Postcode?").with_rule(ValidationRule::Pattern {
                    regex: r"^\d{5}$".to_string(),
                    message: "five digits".to_string(),
                }),
            ],
        };
        let mut wizard = Wizard::new(&config).unwrap();

        wizard.submit("Ada").unwrap();
        assert_eq!(
            wizard.submit("1234").unwrap_err().to_string(),
            "five digits"
        );
        assert_eq!(
            wizard.submit("10115").unwrap(),
            Step::Completed {
                prompt: "Ada | 10115".to_string()
            }
        );
    }

    #[test]
    fn test_default_questions_use_configured_currency() {
        let config = WizardConfig {
            currency_symbol: "€".to_string(),
            ..Default::default()
        };
        let mut wizard = Wizard::new(&config).unwrap();
        wizard.submit("41").unwrap();

        assert!(wizard.questions()[1].text.contains("€50,000"));
        assert!(wizard.submit("$50,000").is_err());
        assert_eq!(
            wizard.submit("€50,000").unwrap(),
            Step::Advanced { next: 2 }
        );
    }
}
