use async_trait::async_trait;
use thiserror::Error;

use crate::protocol::{CompletionResponse, FollowUpRequest, GeneratePlanRequest};
use crate::proxy::{CompletionProxy, FollowUpProxy, ProxyError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Could not reach the plan server: {0}")]
    Transport(String),

    #[error("Plan server answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response from the plan server: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

/// The two operations a client needs from whoever holds the oracle
#[async_trait]
pub trait PlanService: Send + Sync {
    async fn generate_plan(
        &self,
        request: &GeneratePlanRequest,
    ) -> Result<CompletionResponse, ServiceError>;

    async fn follow_up(&self, request: &FollowUpRequest)
        -> Result<CompletionResponse, ServiceError>;
}

/// Runs both proxies in-process
pub struct LocalPlanService {
    completions: CompletionProxy,
    questions: FollowUpProxy,
}

impl LocalPlanService {
    pub fn new(completions: CompletionProxy, questions: FollowUpProxy) -> Self {
        Self {
            completions,
            questions,
        }
    }
}

#[async_trait]
impl PlanService for LocalPlanService {
    async fn generate_plan(
        &self,
        request: &GeneratePlanRequest,
    ) -> Result<CompletionResponse, ServiceError> {
        Ok(self.completions.handle(request).await?)
    }

    async fn follow_up(
        &self,
        request: &FollowUpRequest,
    ) -> Result<CompletionResponse, ServiceError> {
        Ok(self.questions.handle(request).await?)
    }
}
