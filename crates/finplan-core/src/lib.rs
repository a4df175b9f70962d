//! # finplan-core
//!
//! The intake wizard, per-user session state and the two oracle proxies.
//!
//! ## Flow
//!
//! 1. A [`Wizard`] collects one validated answer per [`Question`]
//! 2. The joined answers become a [`GeneratePlanRequest`]
//! 3. A [`PlanService`] (in-process [`LocalPlanService`] or an HTTP client)
//!    returns the plan, which the [`PlanSession`] displays verbatim
//! 4. Follow-up questions are answered against that plan in a separate region
//!
//! [`Advisor`] ties these steps together and emits log events along the way.

mod advisor;
mod error;
mod protocol;
mod proxy;
mod question;
mod service;
mod session;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
mod wizard;

pub use advisor::Advisor;
pub use error::{SessionError, ValidationError, WizardError};
pub use protocol::{CompletionResponse, ErrorResponse, FollowUpRequest, GeneratePlanRequest};
pub use proxy::{CompletionProxy, FollowUpProxy, ProxyError, DEFAULT_MAX_DURATION};
pub use question::{currency_pattern, default_questions, Question, ValidationRule};
pub use service::{LocalPlanService, PlanService, ServiceError};
pub use session::{
    FollowUpState, PlanSession, PlanState, FOLLOW_UP_FALLBACK_TEXT, LOADING_TEXT,
    PLAN_FALLBACK_TEXT,
};
pub use wizard::{Step, Wizard, WizardConfig, WizardState, DEFAULT_SEPARATOR};
