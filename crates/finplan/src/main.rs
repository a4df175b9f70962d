mod api;
mod client;
mod config;
mod init;
mod interview;
mod render;
mod serve;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use finplan_logging::{init_tracing, LogFormat, Logger};

use crate::config::{FileConfig, Settings, DEFAULT_SERVER_URL};
use crate::interview::Transport;

#[derive(Parser, Debug)]
#[command(
    name = "finplan",
    about = "Answer a short questionnaire, get a financial plan",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Tracing filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Use this config file instead of the global one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model to use (overrides config)
    #[arg(short, long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the completion server
    Serve {
        /// Address to listen on (e.g. 0.0.0.0:3000)
        #[arg(short, long)]
        bind: Option<String>,

        /// Ceiling on a single oracle call (e.g. "45s")
        #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
        max_duration: Option<Duration>,
    },
    /// Answer the questionnaire and ask follow-up questions
    Interview {
        /// Send requests to a running server (default: [client] server or local)
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_SERVER_URL)]
        server: Option<String>,

        /// Run the proxies in this process
        #[arg(long, conflicts_with = "server")]
        local: bool,

        /// Also append session events to this JSON-lines file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Write the global config interactively
    Init,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let working_dir = std::env::current_dir().context("Failed to get current directory")?;

    let mut settings = match &cli.config {
        Some(path) => {
            let global = FileConfig::load(path)?
                .with_context(|| format!("Config file not found: {}", path.display()))?;
            Settings::from_files(Some(global), &working_dir)?
        }
        None => Settings::load(&working_dir)?,
    };

    if let Some(model) = &cli.model {
        settings.model = model.clone();
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    match &cli.command {
        Commands::Init => init::handle_init(),
        Commands::Serve { bind, max_duration } => {
            let mut settings = load_settings(&cli)?;
            if let Some(bind) = bind {
                settings.bind = bind.clone();
            }
            if let Some(max_duration) = max_duration {
                settings.max_duration = *max_duration;
            }

            let logger = Arc::new(Logger::new(log_format));
            serve::handle_serve(&settings, logger).await
        }
        Commands::Interview {
            server,
            local,
            log_file,
        } => {
            let settings = load_settings(&cli)?;
            let transport = Transport::choose(server.clone(), *local, &settings);

            let logger = match log_file {
                Some(path) => Logger::with_file(log_format, path)
                    .with_context(|| format!("Failed to open log file {}", path.display()))?,
                None => Logger::new(log_format),
            };

            interview::handle_interview(&settings, transport, Arc::new(logger)).await
        }
    }
}
