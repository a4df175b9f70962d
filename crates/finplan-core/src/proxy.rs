//! Server-side proxies that turn a request into exactly one oracle call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use finplan_oracle::{Oracle, OracleError, OracleRequest};
use finplan_prompts::{FollowUpContext, PlanContext, PromptTemplates, TemplateError};

use crate::protocol::{CompletionResponse, FollowUpRequest, GeneratePlanRequest};

/// Ceiling on a single proxied call
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Prompt template failed: {0}")]
    Template(#[from] TemplateError),

    #[error("Oracle call failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("Oracle call exceeded {0:?}")]
    TimedOut(Duration),
}

impl ProxyError {
    /// True when the call ran out of time, either here or inside the oracle client
    pub fn is_timeout(&self) -> bool {
        match self {
            ProxyError::TimedOut(_) => true,
            ProxyError::Oracle(e) => e.is_timeout(),
            ProxyError::Template(_) => false,
        }
    }
}

/// Handles Generate Plan: plan instructions plus the raw answer string
pub struct CompletionProxy {
    oracle: Arc<dyn Oracle>,
    templates: Arc<PromptTemplates>,
    max_duration: Duration,
}

impl CompletionProxy {
    pub fn new(oracle: Arc<dyn Oracle>, templates: Arc<PromptTemplates>) -> Self {
        Self {
            oracle,
            templates,
            max_duration: DEFAULT_MAX_DURATION,
        }
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub async fn handle(
        &self,
        request: &GeneratePlanRequest,
    ) -> Result<CompletionResponse, ProxyError> {
        let system = self.templates.plan_system()?;
        let prompt = self.templates.plan_prompt(&PlanContext {
            user_answers: &request.prompt,
        })?;

        let text = call_oracle(
            self.oracle.as_ref(),
            OracleRequest::new(system, prompt),
            self.max_duration,
            "plan",
        )
        .await?;

        Ok(CompletionResponse { text })
    }
}

/// Handles Follow-up: follow-up instructions plus the plan and the question
pub struct FollowUpProxy {
    oracle: Arc<dyn Oracle>,
    templates: Arc<PromptTemplates>,
    max_duration: Duration,
}

impl FollowUpProxy {
    pub fn new(oracle: Arc<dyn Oracle>, templates: Arc<PromptTemplates>) -> Self {
        Self {
            oracle,
            templates,
            max_duration: DEFAULT_MAX_DURATION,
        }
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub async fn handle(&self, request: &FollowUpRequest) -> Result<CompletionResponse, ProxyError> {
        let system = self.templates.followup_system()?;
        let prompt = self.templates.followup_prompt(&FollowUpContext {
            financial_plan: &request.financial_plan,
            question: &request.prompt,
        })?;

        let text = call_oracle(
            self.oracle.as_ref(),
            OracleRequest::new(system, prompt),
            self.max_duration,
            "follow_up",
        )
        .await?;

        Ok(CompletionResponse { text })
    }
}

/// One attempt, bounded by `max_duration`. The text comes back untouched.
async fn call_oracle(
    oracle: &dyn Oracle,
    request: OracleRequest,
    max_duration: Duration,
    kind: &str,
) -> Result<String, ProxyError> {
    debug!(
        oracle = oracle.name(),
        model = oracle.model(),
        kind,
        prompt_len = request.prompt.len(),
        "Calling oracle"
    );
    let start = Instant::now();

    match tokio::time::timeout(max_duration, oracle.complete(&request)).await {
        Ok(Ok(text)) => {
            info!(
                kind,
                len = text.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Oracle call completed"
            );
            Ok(text)
        }
        Ok(Err(e)) => {
            warn!(kind, error = %e, "Oracle call failed");
            Err(e.into())
        }
        Err(_) => {
            warn!(kind, ?max_duration, "Oracle call timed out");
            Err(ProxyError::TimedOut(max_duration))
        }
    }
}
