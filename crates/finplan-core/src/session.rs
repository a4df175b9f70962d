//! Per-user session state: the wizard, the plan and the latest follow-up.
//!
//! The plan region and the follow-up region are separate fields. Nothing a
//! follow-up does can reach the plan; only a new generation run replaces it,
//! and then wholesale.

use serde::Serialize;
use tracing::debug;

use crate::error::SessionError;
use crate::protocol::{FollowUpRequest, GeneratePlanRequest};
use crate::wizard::{Step, Wizard, WizardState};

/// Shown in the plan region while generation is outstanding
pub const LOADING_TEXT: &str = "Loading...";

/// Shown in the plan region when generation fails
pub const PLAN_FALLBACK_TEXT: &str =
    "Sorry, there was an error generating your financial advice. Please try again.";

/// Shown in the follow-up region when a follow-up fails
pub const FOLLOW_UP_FALLBACK_TEXT: &str =
    "Sorry, there was an error answering your question. Please try again.";

/// Contents of the plan region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum PlanState {
    NotRequested,
    Loading,
    /// The oracle's markdown, verbatim
    Ready(String),
    /// Generation failed; holds the reason for logs, not for display
    Failed(String),
}

impl PlanState {
    /// What the plan region shows
    pub fn display_text(&self) -> Option<&str> {
        match self {
            PlanState::NotRequested => None,
            PlanState::Loading => Some(LOADING_TEXT),
            PlanState::Ready(text) => Some(text),
            PlanState::Failed(_) => Some(PLAN_FALLBACK_TEXT),
        }
    }

    /// The plan text, only once one has actually been generated
    pub fn text(&self) -> Option<&str> {
        match self {
            PlanState::Ready(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PlanState::Loading)
    }
}

/// Contents of the follow-up region: the latest exchange only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FollowUpState {
    Idle,
    Pending { question: String },
    Answered { question: String, answer: String },
    Failed { question: String, reason: String },
}

impl FollowUpState {
    pub fn question(&self) -> Option<&str> {
        match self {
            FollowUpState::Idle => None,
            FollowUpState::Pending { question }
            | FollowUpState::Answered { question, .. }
            | FollowUpState::Failed { question, .. } => Some(question),
        }
    }

    /// What the follow-up region shows
    pub fn display_text(&self) -> Option<&str> {
        match self {
            FollowUpState::Idle => None,
            FollowUpState::Pending { .. } => Some(LOADING_TEXT),
            FollowUpState::Answered { answer, .. } => Some(answer),
            FollowUpState::Failed { .. } => Some(FOLLOW_UP_FALLBACK_TEXT),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FollowUpState::Pending { .. })
    }
}

/// Everything one user's session owns
#[derive(Debug, Clone)]
pub struct PlanSession {
    id: String,
    wizard: Wizard,
    plan: PlanState,
    follow_up: FollowUpState,
}

impl PlanSession {
    pub fn new(wizard: Wizard) -> Self {
        Self {
            id: format!("session-{}", uuid::Uuid::new_v4()),
            wizard,
            plan: PlanState::NotRequested,
            follow_up: FollowUpState::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn plan(&self) -> &PlanState {
        &self.plan
    }

    pub fn follow_up(&self) -> &FollowUpState {
        &self.follow_up
    }

    /// Submit the answer for the question shown at `index`
    pub fn submit_answer(&mut self, index: usize, answer: &str) -> Result<Step, SessionError> {
        Ok(self.wizard.submit_at(index, answer)?)
    }

    /// Claim the single generation slot and build the request.
    ///
    /// The plan region switches to the loading sentinel until
    /// [`finish_plan_generation`](Self::finish_plan_generation) is called.
    pub fn begin_plan_generation(&mut self) -> Result<GeneratePlanRequest, SessionError> {
        if self.plan.is_loading() {
            return Err(SessionError::GenerationInFlight);
        }
        if let WizardState::AskingQuestion(_) = self.wizard.state() {
            return Err(SessionError::WizardIncomplete);
        }

        self.plan = PlanState::Loading;
        debug!(session = %self.id, "Plan generation started");

        Ok(GeneratePlanRequest {
            prompt: self.wizard.joined_answers(),
        })
    }

    /// Store the outcome of a generation run. The run is terminal either way.
    pub fn finish_plan_generation(&mut self, result: Result<String, String>) {
        if !self.plan.is_loading() {
            debug!(session = %self.id, "Ignoring plan result without a pending request");
            return;
        }

        self.plan = match result {
            Ok(text) => PlanState::Ready(text),
            Err(reason) => PlanState::Failed(reason),
        };
        // An exchange about the previous plan no longer applies
        self.follow_up = FollowUpState::Idle;
        self.wizard.mark_plan_ready();
    }

    /// Claim the follow-up slot and build the request against the displayed plan
    pub fn begin_follow_up(&mut self, question: &str) -> Result<FollowUpRequest, SessionError> {
        if question.trim().is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        if self.follow_up.is_pending() {
            return Err(SessionError::FollowUpInFlight);
        }
        let plan = self.plan.text().ok_or(SessionError::NoPlan)?.to_string();

        self.follow_up = FollowUpState::Pending {
            question: question.to_string(),
        };

        Ok(FollowUpRequest {
            prompt: question.to_string(),
            financial_plan: plan,
        })
    }

    /// Store the outcome of the pending follow-up
    pub fn finish_follow_up(&mut self, result: Result<String, String>) {
        let question = match &self.follow_up {
            FollowUpState::Pending { question } => question.clone(),
            _ => {
                debug!(session = %self.id, "Ignoring follow-up result without a pending request");
                return;
            }
        };

        self.follow_up = match result {
            Ok(answer) => FollowUpState::Answered { question, answer },
            Err(reason) => FollowUpState::Failed { question, reason },
        };
    }

    /// Discard answers, plan and follow-up and start the wizard over
    pub fn restart(&mut self) -> Result<(), SessionError> {
        if self.plan.is_loading() {
            return Err(SessionError::GenerationInFlight);
        }
        self.wizard.restart();
        self.plan = PlanState::NotRequested;
        self.follow_up = FollowUpState::Idle;
        Ok(())
    }
}
