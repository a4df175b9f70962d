use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Which endpoint a request went to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Plan,
    FollowUp,
}

/// Structured log events for a planning session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    WizardStarted {
        session_id: String,
        questions: usize,
    },
    AnswerAccepted {
        index: usize,
        question_id: String,
    },
    AnswerRejected {
        index: usize,
        question_id: String,
        message: String,
    },
    PlanRequested {
        prompt_len: usize,
    },
    PlanReady {
        plan_len: usize,
        duration_secs: f64,
    },
    PlanFailed {
        error: String,
        duration_secs: f64,
    },
    FollowUpAsked {
        question: String,
    },
    FollowUpAnswered {
        answer_len: usize,
        duration_secs: f64,
    },
    FollowUpFailed {
        error: String,
        duration_secs: f64,
    },
    /// A proxied oracle call on the server side
    ProxyCall {
        kind: RequestKind,
        status: u16,
        duration_secs: f64,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }

    /// Single-line rendering for compact mode
    pub fn compact_line(&self, timestamp: &str) -> String {
        match self {
            LogEvent::WizardStarted {
                session_id,
                questions,
            } => format!("[{}] wizard:start {} q={}", timestamp, session_id, questions),
            LogEvent::AnswerAccepted { index, question_id } => {
                format!("[{}] answer:ok:{} {}", timestamp, index + 1, question_id)
            }
            LogEvent::AnswerRejected {
                index,
                question_id,
                message,
            } => format!(
                "[{}] answer:rejected:{} {} {}",
                timestamp,
                index + 1,
                question_id,
                message
            ),
            LogEvent::PlanRequested { prompt_len } => {
                format!("[{}] plan:start {}b", timestamp, prompt_len)
            }
            LogEvent::PlanReady {
                plan_len,
                duration_secs,
            } => format!(
                "[{}] plan:done {}b {:.1}s",
                timestamp, plan_len, duration_secs
            ),
            LogEvent::PlanFailed {
                error,
                duration_secs,
            } => format!(
                "[{}] plan:error {:.1}s {}",
                timestamp, duration_secs, error
            ),
            LogEvent::FollowUpAsked { .. } => format!("[{}] followup:start", timestamp),
            LogEvent::FollowUpAnswered {
                answer_len,
                duration_secs,
            } => format!(
                "[{}] followup:done {}b {:.1}s",
                timestamp, answer_len, duration_secs
            ),
            LogEvent::FollowUpFailed {
                error,
                duration_secs,
            } => format!(
                "[{}] followup:error {:.1}s {}",
                timestamp, duration_secs, error
            ),
            LogEvent::ProxyCall {
                kind,
                status,
                duration_secs,
            } => {
                let kind = match kind {
                    RequestKind::Plan => "plan",
                    RequestKind::FollowUp => "followup",
                };
                format!(
                    "[{}] proxy:{} {} {:.1}s",
                    timestamp, kind, status, duration_secs
                )
            }
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for session events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    quiet: bool,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            quiet: false,
            file_writer: None,
        }
    }

    /// A logger that writes nothing to the console (file sink still applies)
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::new(LogFormat::Compact)
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            quiet: false,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON lines
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        if self.quiet {
            return;
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::WizardStarted { questions, .. } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "finplan".bold().bright_white(),
                    " ".repeat(60) + &"│".bright_blue().to_string()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Questions:".dimmed(),
                    Self::truncate_with_padding(&questions.to_string(), 50, 57).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::AnswerAccepted { .. } | LogEvent::AnswerRejected { .. } => {
                // The interactive prompt shows both inline
            }
            LogEvent::PlanRequested { .. } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "▶".bright_cyan(),
                    "GENERATING PLAN".bright_cyan().bold()
                );
            }
            LogEvent::PlanReady { duration_secs, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} Done ({:.1}s)",
                    "✓".bright_green(),
                    duration_secs
                );
                let _ = writeln!(stderr);
            }
            LogEvent::PlanFailed {
                error,
                duration_secs,
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} Failed ({:.1}s): {}",
                    "✗".bright_red(),
                    duration_secs,
                    error.bright_red()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::FollowUpAsked { .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "▶".bright_magenta(),
                    "FOLLOW-UP".bright_magenta().bold()
                );
            }
            LogEvent::FollowUpAnswered { duration_secs, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} Answered ({:.1}s)",
                    "✓".bright_green(),
                    duration_secs
                );
            }
            LogEvent::FollowUpFailed {
                error,
                duration_secs,
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} Failed ({:.1}s): {}",
                    "✗".bright_red(),
                    duration_secs,
                    error.bright_red()
                );
            }
            LogEvent::ProxyCall {
                kind,
                status,
                duration_secs,
            } => {
                let label = match kind {
                    RequestKind::Plan => "completions",
                    RequestKind::FollowUp => "questions",
                };
                let status = if *status < 400 {
                    status.to_string().bright_green()
                } else {
                    status.to_string().bright_red()
                };
                let _ = writeln!(
                    stderr,
                    "  {} /api/{} {} ({:.1}s)",
                    "→".dimmed(),
                    label,
                    status,
                    duration_secs
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let timestamp = chrono::Utc::now().format("%H:%M:%S").to_string();
        let _ = writeln!(std::io::stderr(), "{}", event.compact_line(&timestamp));
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let truncated = if s.chars().count() > max_len {
            let kept: String = s.chars().take(max_len - 3).collect();
            format!("{}...", kept)
        } else {
            s.to_string()
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1);
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}
