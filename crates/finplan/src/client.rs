//! HTTP transport to a running `finplan serve`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use finplan_core::{
    CompletionResponse, ErrorResponse, FollowUpRequest, GeneratePlanRequest, PlanService,
    ServiceError,
};

pub struct HttpPlanService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPlanService {
    /// `timeout` bounds each request; no request is ever retried
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Posting to plan server");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PlanService for HttpPlanService {
    async fn generate_plan(
        &self,
        request: &GeneratePlanRequest,
    ) -> Result<CompletionResponse, ServiceError> {
        self.post("/api/completions", request).await
    }

    async fn follow_up(
        &self,
        request: &FollowUpRequest,
    ) -> Result<CompletionResponse, ServiceError> {
        self.post("/api/questions", request).await
    }
}
