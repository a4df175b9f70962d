//! # finplan-prompts
//!
//! Instruction templates sent to the oracle. Templates are Handlebars files
//! compiled into the binary; a directory of `<name>.hbs` files can override
//! any of them without touching orchestration code.
//!
//! ## Templates
//!
//! - `plan-system` - instructions for generating the plan tables
//! - `plan-user` - the user answers block (`user_answers`)
//! - `followup-system` - instructions for answering questions about a plan
//! - `followup-user` - the prior plan and question blocks (`financial_plan`, `question`)

pub mod embedded;
mod prompts;

pub use prompts::{FollowUpContext, PlanContext, PromptTemplates, TemplateError};

/// Bumped whenever the wording or placeholders of an embedded template change
pub const TEMPLATE_VERSION: &str = "2024-11.1";
