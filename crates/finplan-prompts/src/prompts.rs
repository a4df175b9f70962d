use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use crate::embedded::{self, TEMPLATE_NAMES};

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to read template override {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to compile template '{name}': {message}")]
    Compile { name: String, message: String },

    #[error("Failed to render template '{name}': {message}")]
    Render { name: String, message: String },
}

/// Placeholders for the plan prompt
#[derive(Debug, Clone, Serialize)]
pub struct PlanContext<'a> {
    /// The joined wizard answers
    pub user_answers: &'a str,
}

/// Placeholders for a follow-up prompt
#[derive(Debug, Clone, Serialize)]
pub struct FollowUpContext<'a> {
    /// The plan the question is about
    pub financial_plan: &'a str,
    /// The user's question
    pub question: &'a str,
}

/// Compiled prompt templates
pub struct PromptTemplates {
    hbs: Handlebars<'static>,
}

impl PromptTemplates {
    /// Templates compiled from the embedded defaults
    pub fn embedded() -> Result<Self, TemplateError> {
        let mut hbs = Self::engine();
        for name in TEMPLATE_NAMES {
            // get_embedded covers every entry of TEMPLATE_NAMES
            let source = embedded::get_embedded(name).unwrap_or_default();
            register(&mut hbs, name, source)?;
        }
        Ok(Self { hbs })
    }

    /// Embedded defaults, with any `<name>.hbs` found in `dir` taking precedence
    pub fn with_overrides(dir: &Path) -> Result<Self, TemplateError> {
        let mut templates = Self::embedded()?;
        for name in TEMPLATE_NAMES {
            let path = dir.join(format!("{}.hbs", name));
            if !path.exists() {
                continue;
            }
            let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Read {
                path: path.display().to_string(),
                source,
            })?;
            info!(template = name, path = %path.display(), "Using template override");
            register(&mut templates.hbs, name, &source)?;
        }
        Ok(templates)
    }

    /// System instructions for plan generation
    pub fn plan_system(&self) -> Result<String, TemplateError> {
        self.render("plan-system", &())
    }

    /// The user prompt for plan generation
    pub fn plan_prompt(&self, ctx: &PlanContext<'_>) -> Result<String, TemplateError> {
        self.render("plan-user", ctx)
    }

    /// System instructions for follow-up questions
    pub fn followup_system(&self) -> Result<String, TemplateError> {
        self.render("followup-system", &())
    }

    /// The user prompt embedding the prior plan and the question
    pub fn followup_prompt(&self, ctx: &FollowUpContext<'_>) -> Result<String, TemplateError> {
        self.render("followup-user", ctx)
    }

    fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, TemplateError> {
        let rendered = self
            .hbs
            .render(name, data)
            .map_err(|e| TemplateError::Render {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        debug!(template = name, len = rendered.len(), "Rendered template");
        Ok(rendered)
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        // Answers and plans are markdown, not HTML
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }
}

fn register(hbs: &mut Handlebars<'static>, name: &str, source: &str) -> Result<(), TemplateError> {
    hbs.register_template_string(name, source)
        .map_err(|e| TemplateError::Compile {
            name: name.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_prompt_is_verbatim() {
        let templates = PromptTemplates::embedded().unwrap();
        let answers = "30, $75000, Savings: $10000 & <stocks>, \"Moderate\"";

        let prompt = templates
            .plan_prompt(&PlanContext {
                user_answers: answers,
            })
            .unwrap();

        assert_eq!(prompt, answers);
    }

    #[test]
    fn test_followup_prompt_embeds_plan_then_question() {
        let templates = PromptTemplates::embedded().unwrap();

        let prompt = templates
            .followup_prompt(&FollowUpContext {
                financial_plan: "| Goal | Amount |",
                question: "How much will I have saved by 50?",
            })
            .unwrap();

        assert_eq!(
            prompt,
            "Financial plan: | Goal | Amount |\nQuestion: How much will I have saved by 50?"
        );
    }

    #[test]
    fn test_system_templates_render() {
        let templates = PromptTemplates::embedded().unwrap();
        assert!(templates.plan_system().unwrap().contains("Balance Sheet"));
        assert!(templates
            .followup_system()
            .unwrap()
            .contains("follow-up question"));
    }

    #[test]
    fn test_override_directory_replaces_single_template() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("followup-user.hbs"),
            "PLAN>>{{financial_plan}}<<\nASK>>{{question}}<<",
        )
        .unwrap();

        let templates = PromptTemplates::with_overrides(dir.path()).unwrap();

        let prompt = templates
            .followup_prompt(&FollowUpContext {
                financial_plan: "P",
                question: "Q",
            })
            .unwrap();
        assert_eq!(prompt, "PLAN>>P<<\nASK>>Q<<");

        // Untouched templates keep the embedded text
        assert_eq!(
            templates.plan_system().unwrap(),
            crate::embedded::PLAN_SYSTEM
        );
    }

    #[test]
    fn test_override_with_unknown_placeholder_fails_to_render() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("plan-user.hbs"), "{{answers_block}}").unwrap();

        let templates = PromptTemplates::with_overrides(dir.path()).unwrap();
        let err = templates
            .plan_prompt(&PlanContext { user_answers: "x" })
            .unwrap_err();

        assert!(matches!(err, TemplateError::Render { .. }));
    }

    #[test]
    fn test_broken_override_is_a_compile_error() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("plan-system.hbs"), "{{#if}}").unwrap();

        let result = PromptTemplates::with_overrides(dir.path());
        assert!(matches!(result, Err(TemplateError::Compile { .. })));
    }
}
