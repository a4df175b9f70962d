use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use finplan_logging::{LogEvent, Logger};

use crate::error::SessionError;
use crate::service::PlanService;
use crate::session::{FollowUpState, PlanSession, PlanState};
use crate::wizard::{Step, Wizard};

/// Drives one user's session against a plan service.
///
/// Completing the wizard triggers plan generation exactly once. Failures of
/// the service never surface as errors here; they end up as the fallback
/// text of the affected region.
pub struct Advisor<'a> {
    service: &'a dyn PlanService,
    logger: Arc<Logger>,
    session: PlanSession,
}

impl<'a> Advisor<'a> {
    pub fn new(service: &'a dyn PlanService, logger: Arc<Logger>, wizard: Wizard) -> Self {
        let session = PlanSession::new(wizard);
        logger.log(&LogEvent::WizardStarted {
            session_id: session.id().to_string(),
            questions: session.wizard().total(),
        });
        Self {
            service,
            logger,
            session,
        }
    }

    pub fn session(&self) -> &PlanSession {
        &self.session
    }

    /// Submit the answer for the question shown at `index`.
    ///
    /// When this was the last answer the plan is generated before returning.
    pub async fn submit_answer(&mut self, index: usize, answer: &str) -> Result<Step, SessionError> {
        let step = match self.session.submit_answer(index, answer) {
            Ok(step) => step,
            Err(e) => {
                if let Some(rejected) = e.as_validation() {
                    self.logger.log(&LogEvent::AnswerRejected {
                        index: rejected.index,
                        question_id: rejected.question_id.clone(),
                        message: rejected.message.clone(),
                    });
                }
                return Err(e);
            }
        };

        if step != Step::Ignored {
            let question_id = self.session.wizard().questions()[index].id.clone();
            self.logger
                .log(&LogEvent::AnswerAccepted { index, question_id });
        }

        if let Step::Completed { .. } = step {
            self.generate_plan().await?;
        }

        Ok(step)
    }

    /// Request a fresh plan from the stored answers, replacing the current one
    pub async fn regenerate(&mut self) -> Result<&PlanState, SessionError> {
        self.generate_plan().await?;
        Ok(self.session.plan())
    }

    async fn generate_plan(&mut self) -> Result<(), SessionError> {
        let request = self.session.begin_plan_generation()?;
        self.logger.log(&LogEvent::PlanRequested {
            prompt_len: request.prompt.len(),
        });
        info!(session = %self.session.id(), "Requesting financial plan");

        let start = Instant::now();
        let result = self.service.generate_plan(&request).await;
        let duration_secs = start.elapsed().as_secs_f64();

        match result {
            Ok(response) => {
                self.logger.log(&LogEvent::PlanReady {
                    plan_len: response.text.len(),
                    duration_secs,
                });
                self.session.finish_plan_generation(Ok(response.text));
            }
            Err(e) => {
                warn!(session = %self.session.id(), error = %e, "Plan generation failed");
                self.logger.log(&LogEvent::PlanFailed {
                    error: e.to_string(),
                    duration_secs,
                });
                self.session.finish_plan_generation(Err(e.to_string()));
            }
        }
        Ok(())
    }

    /// Ask about the displayed plan. The plan itself is never modified.
    pub async fn ask_follow_up(&mut self, question: &str) -> Result<&FollowUpState, SessionError> {
        let request = self.session.begin_follow_up(question)?;
        self.logger.log(&LogEvent::FollowUpAsked {
            question: question.to_string(),
        });

        let start = Instant::now();
        let result = self.service.follow_up(&request).await;
        let duration_secs = start.elapsed().as_secs_f64();

        match result {
            Ok(response) => {
                self.logger.log(&LogEvent::FollowUpAnswered {
                    answer_len: response.text.len(),
                    duration_secs,
                });
                self.session.finish_follow_up(Ok(response.text));
            }
            Err(e) => {
                warn!(session = %self.session.id(), error = %e, "Follow-up failed");
                self.logger.log(&LogEvent::FollowUpFailed {
                    error: e.to_string(),
                    duration_secs,
                });
                self.session.finish_follow_up(Err(e.to_string()));
            }
        }

        Ok(self.session.follow_up())
    }

    /// Start over with a blank answer set
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.session.restart()?;
        self.logger.log(&LogEvent::WizardStarted {
            session_id: self.session.id().to_string(),
            questions: self.session.wizard().total(),
        });
        Ok(())
    }
}
