//! Terminal rendering of the plan and follow-up regions.
//!
//! Plans are markdown tables. Rendering only styles them: headings and bold
//! cells are highlighted, everything else is printed as returned.

use colored::Colorize;

use finplan_core::{FollowUpState, PlanState, Question, LOADING_TEXT};

const RULE_WIDTH: usize = 70;

fn region_header(title: &str) -> String {
    let label = format!("─ {} ", title);
    let padding = "─".repeat(RULE_WIDTH.saturating_sub(label.chars().count()));
    format!("{}{}", label.bright_blue().bold(), padding.bright_blue())
}

/// Strip `**` markers, highlighting what they enclosed
fn style_bold(line: &str) -> String {
    let mut out = String::new();
    for (i, part) in line.split("**").enumerate() {
        if i % 2 == 1 {
            out.push_str(&part.bold().to_string());
        } else {
            out.push_str(part);
        }
    }
    out
}

fn is_table_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

/// Style one markdown document for the terminal
pub fn style_markdown(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                let heading = trimmed.trim_start_matches('#').trim();
                style_bold(heading).bright_cyan().bold().to_string()
            } else if is_table_separator(line) {
                line.dimmed().to_string()
            } else {
                style_bold(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The question prompt header: position, progress and hint
pub fn question_header(index: usize, total: usize, progress: u8, question: &Question) -> String {
    let mut out = format!(
        "{} {}",
        format!("Question {} of {}", index + 1, total).bold(),
        format!("({}%)", progress).dimmed()
    );
    if let Some(hint) = &question.hint {
        out.push('\n');
        out.push_str(&hint.dimmed().to_string());
    }
    out
}

pub fn validation_message(message: &str) -> String {
    format!("  {} {}", "✗".bright_red(), message.bright_red())
}

pub fn plan_region(plan: &PlanState) -> Option<String> {
    let body = match plan {
        PlanState::NotRequested => return None,
        PlanState::Loading => LOADING_TEXT.dimmed().to_string(),
        PlanState::Ready(text) => style_markdown(text),
        PlanState::Failed(_) => plan.display_text().unwrap_or_default().bright_red().to_string(),
    };
    Some(format!("{}\n\n{}\n", region_header("Financial Plan"), body))
}

pub fn follow_up_region(follow_up: &FollowUpState) -> Option<String> {
    let question = follow_up.question()?;
    let body = match follow_up {
        FollowUpState::Answered { answer, .. } => style_markdown(answer),
        FollowUpState::Failed { .. } => follow_up
            .display_text()
            .unwrap_or_default()
            .bright_red()
            .to_string(),
        _ => follow_up.display_text().unwrap_or_default().dimmed().to_string(),
    };
    Some(format!(
        "{}\n\n{} {}\n\n{}\n",
        region_header("Follow-up"),
        "Q:".bright_magenta().bold(),
        question,
        body
    ))
}

pub fn loading() -> String {
    LOADING_TEXT.dimmed().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use finplan_core::PLAN_FALLBACK_TEXT;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_markdown_headings_and_bold() {
        plain();
        let styled = style_markdown("## Balance Sheet\n| **Savings** | $10,000 |\n|---|---|");
        assert_eq!(styled, "Balance Sheet\n| Savings | $10,000 |\n|---|---|");
    }

    #[test]
    fn test_table_separator_detection() {
        assert!(is_table_separator("|------|:------:|"));
        assert!(!is_table_separator("| Savings | $10 |"));
        assert!(!is_table_separator("plain text"));
    }

    #[test]
    fn test_plan_region_states() {
        plain();
        assert!(plan_region(&PlanState::NotRequested).is_none());
        assert!(plan_region(&PlanState::Loading)
            .unwrap()
            .contains(LOADING_TEXT));
        assert!(plan_region(&PlanState::Failed("boom".to_string()))
            .unwrap()
            .contains(PLAN_FALLBACK_TEXT));
        let ready = plan_region(&PlanState::Ready("| a | b |".to_string())).unwrap();
        assert!(ready.contains("| a | b |"));
        assert!(ready.contains("Financial Plan"));
    }

    #[test]
    fn test_follow_up_region_echoes_question() {
        plain();
        assert!(follow_up_region(&FollowUpState::Idle).is_none());

        let region = follow_up_region(&FollowUpState::Answered {
            question: "By 50?".to_string(),
            answer: "About **$400k**".to_string(),
        })
        .unwrap();
        assert!(region.contains("Q: By 50?"));
        assert!(region.contains("About $400k"));
    }

    #[test]
    fn test_question_header() {
        plain();
        let question = Question::new("age", "How old?").with_hint("Be honest");
        assert_eq!(
            question_header(0, 7, 0, &question),
            "Question 1 of 7 (0%)\nBe honest"
        );
    }
}
