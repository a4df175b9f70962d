//! The interactive intake wizard.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Input, Select};

use finplan_core::{Advisor, LocalPlanService, PlanService, PlanState, Wizard};
use finplan_logging::Logger;

use crate::client::HttpPlanService;
use crate::config::Settings;
use crate::render;

/// Where plan and follow-up requests go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// A running `finplan serve` at this base URL
    Server(String),
    /// Proxies run inside this process
    Local,
}

impl Transport {
    /// `--server` wins, then `--local`, then `[client] server`, else local
    pub fn choose(server: Option<String>, local: bool, settings: &Settings) -> Self {
        match (server, local) {
            (Some(url), _) => Transport::Server(url),
            (None, true) => Transport::Local,
            (None, false) => settings
                .server_url
                .clone()
                .map(Transport::Server)
                .unwrap_or(Transport::Local),
        }
    }
}

fn build_service(transport: &Transport, settings: &Settings) -> Result<Box<dyn PlanService>> {
    match transport {
        Transport::Server(url) => Ok(Box::new(
            HttpPlanService::new(url, settings.max_duration)
                .context("Failed to create HTTP client")?,
        )),
        Transport::Local => {
            let (completions, questions) = crate::serve::build_proxies(settings)?;
            Ok(Box::new(LocalPlanService::new(completions, questions)))
        }
    }
}

pub async fn handle_interview(
    settings: &Settings,
    transport: Transport,
    logger: Arc<Logger>,
) -> Result<()> {
    let service = build_service(&transport, settings)?;
    let wizard = Wizard::new(&settings.wizard).context("Invalid [wizard] configuration")?;
    let mut advisor = Advisor::new(service.as_ref(), logger, wizard);

    loop {
        run_wizard(&mut advisor).await?;
        print_plan(&advisor);

        while matches!(advisor.session().plan(), PlanState::Failed(_)) {
            match failure_menu()? {
                FailureChoice::Retry => {
                    eprintln!("{}", render::loading());
                    advisor.regenerate().await?;
                    print_plan(&advisor);
                }
                FailureChoice::StartOver => advisor.restart()?,
                FailureChoice::Quit => return Ok(()),
            }
        }

        // Back at the first question after a restart
        if advisor.session().wizard().current_index().is_some() {
            continue;
        }

        return follow_up_loop(&mut advisor).await;
    }
}

async fn run_wizard(advisor: &mut Advisor<'_>) -> Result<()> {
    while let Some(index) = advisor.session().wizard().current_index() {
        let wizard = advisor.session().wizard();
        let total = wizard.total();
        let question = wizard.questions()[index].clone();

        eprintln!();
        eprintln!(
            "{}",
            render::question_header(index, total, wizard.progress_percent(), &question)
        );

        let mut initial = String::new();
        loop {
            let answer: String = Input::new()
                .with_prompt(question.text.as_str())
                .with_initial_text(initial.as_str())
                .allow_empty(true)
                .interact_text()?;

            let is_last = index + 1 == total;
            if is_last && advisor.session().wizard().validate(index, &answer).is_ok() {
                eprintln!();
                eprintln!("{}", render::loading());
            }

            match advisor.submit_answer(index, &answer).await {
                Ok(_) => break,
                Err(e) => match e.as_validation() {
                    Some(rejected) => {
                        eprintln!("{}", render::validation_message(&rejected.message));
                        // Keep what the user typed so they can fix it
                        initial = answer;
                    }
                    None => return Err(e.into()),
                },
            }
        }
    }
    Ok(())
}

fn print_plan(advisor: &Advisor<'_>) {
    if let Some(region) = render::plan_region(advisor.session().plan()) {
        println!();
        println!("{}", region);
    }
}

enum FailureChoice {
    Retry,
    StartOver,
    Quit,
}

fn failure_menu() -> Result<FailureChoice> {
    let choice = Select::new()
        .with_prompt("What next?")
        .items(&["Try again", "Start over", "Quit"])
        .default(0)
        .interact()?;

    Ok(match choice {
        0 => FailureChoice::Retry,
        1 => FailureChoice::StartOver,
        _ => FailureChoice::Quit,
    })
}

async fn follow_up_loop(advisor: &mut Advisor<'_>) -> Result<()> {
    eprintln!(
        "{}",
        "Ask a follow-up question about your plan (empty line or 'exit' to quit)".dimmed()
    );

    loop {
        let question: String = Input::new()
            .with_prompt("Follow-up")
            .allow_empty(true)
            .interact_text()?;

        let trimmed = question.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        eprintln!("{}", render::loading());
        let state = advisor.ask_follow_up(&question).await?;
        if let Some(region) = render::follow_up_region(state) {
            println!();
            println!("{}", region);
        }
    }

    Ok(())
}
