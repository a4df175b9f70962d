//! Scripted test doubles for the oracle and the plan service.
//!
//! Built only under `cfg(test)` or the `test-utils` feature, which the
//! integration tests and the binary's router tests enable as a dev-dependency.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use finplan_oracle::{Oracle, OracleError, OracleRequest, OracleType};

use crate::protocol::{CompletionResponse, FollowUpRequest, GeneratePlanRequest};
use crate::service::{PlanService, ServiceError};

/// An oracle that returns a fixed reply (or a fixed failure) and records every call
pub struct MockOracle {
    reply: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<OracleRequest>>,
}

impl MockOracle {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with an upstream 500
    pub fn failing() -> Self {
        Self {
            reply: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<OracleRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    fn name(&self) -> &str {
        "Mock"
    }

    fn oracle_type(&self) -> OracleType {
        OracleType::OpenAi
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(OracleError::Api {
                status: 500,
                message: "upstream exploded".to_string(),
            }),
        }
    }
}

/// A plan service that plays back queued replies and records the requests it saw.
///
/// Each queued `Err(message)` becomes a transport failure.
#[derive(Default)]
pub struct MockPlanService {
    plans: Mutex<VecDeque<Result<String, String>>>,
    answers: Mutex<VecDeque<Result<String, String>>>,
    plan_requests: Mutex<Vec<GeneratePlanRequest>>,
    follow_up_requests: Mutex<Vec<FollowUpRequest>>,
}

impl MockPlanService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(self, reply: Result<&str, &str>) -> Self {
        if let Ok(mut plans) = self.plans.lock() {
            plans.push_back(reply.map(str::to_string).map_err(str::to_string));
        }
        self
    }

    pub fn with_follow_up(self, reply: Result<&str, &str>) -> Self {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(reply.map(str::to_string).map_err(str::to_string));
        }
        self
    }

    pub fn plan_requests(&self) -> Vec<GeneratePlanRequest> {
        self.plan_requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn follow_up_requests(&self) -> Vec<FollowUpRequest> {
        self.follow_up_requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

fn next_reply(
    queue: &Mutex<VecDeque<Result<String, String>>>,
) -> Result<CompletionResponse, ServiceError> {
    let reply = queue
        .lock()
        .ok()
        .and_then(|mut q| q.pop_front())
        .unwrap_or_else(|| Err("no scripted reply".to_string()));
    reply
        .map(|text| CompletionResponse { text })
        .map_err(ServiceError::Transport)
}

#[async_trait]
impl PlanService for MockPlanService {
    async fn generate_plan(
        &self,
        request: &GeneratePlanRequest,
    ) -> Result<CompletionResponse, ServiceError> {
        if let Ok(mut requests) = self.plan_requests.lock() {
            requests.push(request.clone());
        }
        next_reply(&self.plans)
    }

    async fn follow_up(
        &self,
        request: &FollowUpRequest,
    ) -> Result<CompletionResponse, ServiceError> {
        if let Ok(mut requests) = self.follow_up_requests.lock() {
            requests.push(request.clone());
        }
        next_reply(&self.answers)
    }
}
