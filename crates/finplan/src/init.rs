//! Interactive initialization for finplan.
//!
//! Sets up the global config file with user-selected defaults.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Select;
use std::fs;

use finplan_oracle::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL};

use crate::config::global_config_path;

/// Model info for display and config
struct ModelInfo {
    display_name: &'static str,
    config_name: &'static str,
}

const MODELS: &[ModelInfo] = &[
    ModelInfo {
        display_name: "GPT-4o mini (fast, inexpensive)",
        config_name: "gpt-4o-mini",
    },
    ModelInfo {
        display_name: "GPT-4o",
        config_name: "gpt-4o",
    },
    ModelInfo {
        display_name: "GPT-4.1",
        config_name: "gpt-4.1",
    },
];

const CURRENCIES: &[&str] = &["$", "€", "£", "¥"];

/// The config file `finplan init` writes
pub fn render_config(model: &str, currency_symbol: &str) -> String {
    format!(
        r#"[oracle]
provider = "openai"
model = "{model}"
base_url = "{base_url}"
api_key_env = "{api_key_env}"
# max_tokens = 4096

[server]
bind = "127.0.0.1:3000"
max_duration = "30s"

# [client]
# server = "http://127.0.0.1:3000"  # Use a running `finplan serve` for interviews

[wizard]
separator = ", "
currency_symbol = "{currency_symbol}"

# Replace the default questions:
# [[wizard.questions]]
# id = "age"
# text = "What is your age?"
# rules = [{{ kind = "required", message = "Age is required" }}]

# [templates]
# dir = "prompts"  # Directory of <name>.hbs overrides
"#,
        model = model,
        base_url = DEFAULT_BASE_URL,
        api_key_env = DEFAULT_API_KEY_ENV,
        currency_symbol = currency_symbol,
    )
}

pub fn handle_init() -> Result<()> {
    eprintln!("{}", "Setting up finplan...".bold());
    eprintln!();

    // Step 1: Check for an API key
    eprintln!("{}", "Checking for an API key...".dimmed());
    if std::env::var(DEFAULT_API_KEY_ENV).is_ok() {
        eprintln!("  {} {} is set", "✓".bright_green(), DEFAULT_API_KEY_ENV);
    } else {
        eprintln!(
            "  {} {} is not set. Export it before running {}.",
            "⚠".bright_yellow(),
            DEFAULT_API_KEY_ENV,
            "finplan interview".bright_cyan()
        );
    }
    eprintln!();

    // Step 2: Pick model and currency
    let items: Vec<&str> = MODELS.iter().map(|m| m.display_name).collect();
    let model = Select::new()
        .with_prompt("Select the model that writes your plans")
        .items(&items)
        .default(0)
        .interact()?;

    let currency = Select::new()
        .with_prompt("Select your currency")
        .items(CURRENCIES)
        .default(0)
        .interact()?;

    // Step 3: Write global config
    let config_path = global_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    if let Some(dir) = config_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    if config_path.exists() {
        eprintln!(
            "{} Config already exists at {}",
            "⚠".bright_yellow(),
            config_path.display()
        );

        let overwrite = Select::new()
            .with_prompt("Overwrite existing config?")
            .items(&["No, keep existing", "Yes, replace it"])
            .default(0)
            .interact()?;

        if overwrite == 0 {
            eprintln!();
            eprintln!("Keeping existing config. Edit it manually if needed:");
            eprintln!("  {}", config_path.display().to_string().dimmed());
            return Ok(());
        }
    }

    let content = render_config(MODELS[model].config_name, CURRENCIES[currency]);
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    eprintln!();
    eprintln!(
        "{} Config saved to {}",
        "✓".bright_green(),
        config_path.display()
    );

    print_getting_started();

    Ok(())
}

/// Print the getting started guide
pub fn print_getting_started() {
    eprintln!();
    eprintln!("{}", "Getting started:".bold());
    eprintln!(
        "  {} Answer the questionnaire: {}",
        "1.".dimmed(),
        "finplan interview".bright_cyan()
    );
    eprintln!(
        "  {} Or run the completion server: {}",
        "2.".dimmed(),
        "finplan serve".bright_cyan()
    );
    eprintln!(
        "  {} and point interviews at it: {}",
        "3.".dimmed(),
        "finplan interview --server".bright_cyan()
    );
}
