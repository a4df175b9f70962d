//! JSON bodies exchanged between the client and the two proxy endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/completions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratePlanRequest {
    /// The joined wizard answers
    pub prompt: String,
}

/// Body of `POST /api/questions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpRequest {
    /// The follow-up question
    pub prompt: String,
    /// The plan currently on display
    pub financial_plan: String,
}

/// Successful response of both endpoints: the oracle's raw text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
}

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
