//! Embedded templates, compiled in from `templates/*.hbs`.

pub const PLAN_SYSTEM: &str = include_str!("../templates/plan-system.hbs");
pub const PLAN_USER: &str = include_str!("../templates/plan-user.hbs");
pub const FOLLOWUP_SYSTEM: &str = include_str!("../templates/followup-system.hbs");
pub const FOLLOWUP_USER: &str = include_str!("../templates/followup-user.hbs");

/// Every template name the loader knows about
pub const TEMPLATE_NAMES: [&str; 4] = ["plan-system", "plan-user", "followup-system", "followup-user"];

/// Get the embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    match name {
        "plan-system" => Some(PLAN_SYSTEM),
        "plan-user" => Some(PLAN_USER),
        "followup-system" => Some(FOLLOWUP_SYSTEM),
        "followup-user" => Some(FOLLOWUP_USER),
        _ => None,
    }
}
