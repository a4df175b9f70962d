//! Intake questions and the rules their answers must satisfy.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// A single check applied to an answer.
///
/// Rules of a question run in order and the first failure is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationRule {
    /// The answer must contain something other than whitespace
    Required { message: String },
    /// At least `min` characters
    MinLength { min: usize, message: String },
    /// At most `max` characters
    MaxLength { max: usize, message: String },
    /// ASCII digits only
    Digits { message: String },
    /// A whole number no greater than `max`; non-numeric answers are left to other rules
    MaxValue { max: u64, message: String },
    /// An amount such as `$75,000.00`, with the symbol optional
    Currency {
        #[serde(default = "default_currency_symbol")]
        symbol: String,
        message: String,
    },
    /// A custom regular expression
    Pattern { regex: String, message: String },
}

pub fn default_currency_symbol() -> String {
    "$".to_string()
}

/// Build the currency pattern for a symbol
pub fn currency_pattern(symbol: &str) -> String {
    format!(
        r"^(?:{})?\d+(?:,\d{{3}})*(?:\.\d{{2}})?$",
        regex::escape(symbol)
    )
}

impl ValidationRule {
    pub fn message(&self) -> &str {
        match self {
            ValidationRule::Required { message }
            | ValidationRule::MinLength { message, .. }
            | ValidationRule::MaxLength { message, .. }
            | ValidationRule::Digits { message }
            | ValidationRule::MaxValue { message, .. }
            | ValidationRule::Currency { message, .. }
            | ValidationRule::Pattern { message, .. } => message,
        }
    }

    pub(crate) fn compile(&self, question_id: &str) -> Result<CompiledRule, WizardError> {
        let source = match self {
            ValidationRule::Currency { symbol, .. } => Some(currency_pattern(symbol)),
            ValidationRule::Pattern { regex, .. } => Some(regex.clone()),
            _ => None,
        };

        let pattern = source
            .map(|s| Regex::new(&s))
            .transpose()
            .map_err(|e| WizardError::InvalidPattern {
                question_id: question_id.to_string(),
                message: e.to_string(),
            })?;

        Ok(CompiledRule {
            rule: self.clone(),
            pattern,
        })
    }
}

/// A rule with its regular expression compiled once up front
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    rule: ValidationRule,
    pattern: Option<Regex>,
}

impl CompiledRule {
    pub(crate) fn check(&self, answer: &str) -> Result<(), &str> {
        let ok = match &self.rule {
            ValidationRule::Required { .. } => !answer.trim().is_empty(),
            ValidationRule::MinLength { min, .. } => answer.chars().count() >= *min,
            ValidationRule::MaxLength { max, .. } => answer.chars().count() <= *max,
            ValidationRule::Digits { .. } => {
                !answer.is_empty() && answer.chars().all(|c| c.is_ascii_digit())
            }
            ValidationRule::MaxValue { max, .. } => match answer.parse::<u64>() {
                Ok(value) => value <= *max,
                // Digits that overflow u64 are certainly past the limit
                Err(_) => !answer.chars().all(|c| c.is_ascii_digit()),
            },
            ValidationRule::Currency { .. } | ValidationRule::Pattern { .. } => self
                .pattern
                .as_ref()
                .map(|p| p.is_match(answer))
                .unwrap_or(false),
        };

        if ok {
            Ok(())
        } else {
            Err(self.rule.message())
        }
    }
}

/// One step of the intake wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier (e.g. "income")
    pub id: String,
    /// The question itself
    pub text: String,
    /// Light-hearted helper line shown under the question
    #[serde(default)]
    pub hint: Option<String>,
    /// Checks the answer must pass before the wizard advances
    #[serde(default)]
    pub rules: Vec<ValidationRule>,
}

impl Question {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            hint: None,
            rules: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }
}

fn required(message: &str) -> ValidationRule {
    ValidationRule::Required {
        message: message.to_string(),
    }
}

fn currency(symbol: &str) -> ValidationRule {
    ValidationRule::Currency {
        symbol: symbol.to_string(),
        message: "Must be a valid currency amount".to_string(),
    }
}

/// The seven reference questions, with amounts written in `symbol`
pub fn default_questions(symbol: &str) -> Vec<Question> {
    vec![
        Question::new("age", "What is your age? (e.g., 25)")
            .with_hint("Don't worry, we won't tell anyone you're still playing Fortnite at 40 🎮")
            .with_rule(required("Age is required"))
            .with_rule(ValidationRule::MaxLength {
                max: 99,
                message: "Are you sure you're that old?".to_string(),
            })
            .with_rule(ValidationRule::Digits {
                message: "No shananigans".to_string(),
            }),
        Question::new(
            "income",
            format!("What is your annual income? (e.g., {}50,000)", symbol),
        )
        .with_hint("Time to find out if you're eating caviar or instant ramen 🍜")
        .with_rule(required("Income is required"))
        .with_rule(currency(symbol)),
        Question::new(
            "expenses",
            format!("What are your monthly expenses? (e.g., {}2,500)", symbol),
        )
        .with_hint("Let's see how many streaming services you're 'borrowing' from family 📺")
        .with_rule(required("Expenses are required"))
        .with_rule(currency(symbol)),
        Question::new(
            "assets",
            format!(
                "What are your current assets? (e.g., Savings: {s}5,000, Checking: {s}2,000)",
                s = symbol
            ),
        )
        .with_hint("Your collection of rare Pokémon cards counts too! 💳")
        .with_rule(required("Assets information is required")),
        Question::new(
            "debts",
            format!(
                "What are your current debts? (e.g., Student Loans: {}20,000)",
                symbol
            ),
        )
        .with_hint("Those late-night Amazon purchases are coming back to haunt you 👻")
        .with_rule(required("Debt information is required")),
        Question::new(
            "goals",
            "What are your financial goals? (e.g., Buy a house in 5 years, Retire at 65)",
        )
        .with_hint("Besides becoming a TikTok millionaire, of course 🤑")
        .with_rule(ValidationRule::MinLength {
            min: 10,
            message: "Please provide more detail about your financial goals".to_string(),
        }),
        Question::new("riskTolerance", "What is your risk tolerance? (e.g., Moderate)")
            .with_hint("On a scale from 'piggy bank' to 'crypto YOLO' 🎲")
            .with_rule(required("Risk tolerance is required")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(rule: ValidationRule, answer: &str) -> bool {
        rule.compile("q").unwrap().check(answer).is_ok()
    }

    #[test]
    fn test_currency_accepts_reference_formats() {
        let rule = currency("$");
        for ok in ["75000", "$75000", "$75,000", "$1,234,567.89", "3000.50"] {
            assert!(check(rule.clone(), ok), "{ok} should pass");
        }
        for bad in ["", "$", "75k", "$75,00", "75.5", "€75000", "-100"] {
            assert!(!check(rule.clone(), bad), "{bad} should fail");
        }
    }

    #[test]
    fn test_currency_respects_configured_symbol() {
        let rule = currency("€");
        assert!(check(rule.clone(), "€2,500"));
        assert!(!check(rule, "$2,500"));
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(!check(required("x"), ""));
        assert!(!check(required("x"), "   "));
        assert!(check(required("x"), "Savings: $10"));
    }

    #[test]
    fn test_max_value_bounds() {
        let rule = ValidationRule::MaxValue {
            max: 99,
            message: "too old".to_string(),
        };
        assert!(check(rule.clone(), "99"));
        assert!(!check(rule.clone(), "100"));
        assert!(check(rule.clone(), "abc"));
        assert!(!check(rule, &"9".repeat(30)));
    }

    #[test]
    fn test_min_length_counts_characters() {
        let rule = ValidationRule::MinLength {
            min: 10,
            message: "more".to_string(),
        };
        assert!(!check(rule.clone(), "Retire"));
        assert!(check(rule, "Retire at 60"));
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let age = &default_questions("$")[0];
        let rules: Vec<_> = age.rules.iter().map(|r| r.compile("age").unwrap()).collect();
        let first_error = |answer: &str| rules.iter().find_map(|r| r.check(answer).err());

        assert_eq!(first_error(""), Some("Age is required"));
        assert_eq!(
            first_error(&"1".repeat(120)),
            Some("Are you sure you're that old?")
        );
        assert_eq!(first_error("3O"), Some("No shananigans"));
        assert_eq!(first_error("30"), None);
    }

    #[test]
    fn test_age_limit_is_a_length() {
        let age = &default_questions("$")[0];
        let rules: Vec<_> = age.rules.iter().map(|r| r.compile("age").unwrap()).collect();
        let passes = |answer: &str| rules.iter().all(|r| r.check(answer).is_ok());

        assert!(passes("150"));
        assert!(passes(&"1".repeat(99)));
        assert!(!passes(&"1".repeat(100)));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let rule = ValidationRule::Pattern {
            regex: "([".to_string(),
            message: "x".to_string(),
        };
        assert!(matches!(
            rule.compile("zip"),
            Err(WizardError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_default_questions_order() {
        let ids: Vec<_> = default_questions("$").into_iter().map(|q| q.id).collect();
        assert_eq!(
            ids,
            [
                "age",
                "income",
                "expenses",
                "assets",
                "debts",
                "goals",
                "riskTolerance"
            ]
        );
    }

    #[test]
    fn test_rule_deserializes_from_tagged_toml() {
        let rule: ValidationRule =
            toml::from_str("kind = \"currency\"\nmessage = \"amount please\"").unwrap();
        assert_eq!(
            rule,
            ValidationRule::Currency {
                symbol: "$".to_string(),
                message: "amount please".to_string()
            }
        );
    }
}
