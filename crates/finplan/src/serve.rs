use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use finplan_core::{CompletionProxy, FollowUpProxy};
use finplan_logging::Logger;
use finplan_oracle::{create_oracle, Oracle};
use finplan_prompts::PromptTemplates;

use crate::api::{self, AppState};
use crate::config::Settings;

/// Embedded templates, with overrides from `[templates] dir` when set
fn load_templates(settings: &Settings) -> Result<PromptTemplates> {
    match &settings.templates_dir {
        Some(dir) => PromptTemplates::with_overrides(dir)
            .with_context(|| format!("Failed to load templates from {}", dir.display())),
        None => PromptTemplates::embedded().context("Failed to compile embedded templates"),
    }
}

/// Build both proxies from the resolved settings
pub fn build_proxies(settings: &Settings) -> Result<(CompletionProxy, FollowUpProxy)> {
    let oracle: Arc<dyn Oracle> = Arc::from(
        create_oracle(settings.oracle_type, settings.oracle_config())
            .context("Failed to create oracle client")?,
    );
    let templates = Arc::new(load_templates(settings)?);

    info!(
        oracle = oracle.name(),
        model = oracle.model(),
        max_duration = ?settings.max_duration,
        "Oracle ready"
    );

    Ok((
        CompletionProxy::new(oracle.clone(), templates.clone())
            .with_max_duration(settings.max_duration),
        FollowUpProxy::new(oracle, templates).with_max_duration(settings.max_duration),
    ))
}

pub async fn handle_serve(settings: &Settings, logger: Arc<Logger>) -> Result<()> {
    let (completions, questions) = build_proxies(settings)?;

    let router = api::create_router(AppState {
        completions: Arc::new(completions),
        questions: Arc::new(questions),
        logger,
    });

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind server to {}", settings.bind))?;

    eprintln!();
    eprintln!(
        "  {} {}",
        "->".bright_green(),
        format!("Listening on http://{}", settings.bind).bold()
    );
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
    eprintln!("\nShutting down...");
}
