//! Configuration file support for finplan.
//!
//! Settings come from, in increasing priority: built-in defaults, the global
//! `~/.config/finplan/config.toml`, a project `finplan.toml` in the working
//! directory, and finally command-line flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use finplan_core::{WizardConfig, DEFAULT_MAX_DURATION};
use finplan_oracle::{
    OracleConfig, OracleType, DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL,
};

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "finplan.toml";

/// Directory under the platform config dir holding the global config
pub const GLOBAL_CONFIG_DIR: &str = "finplan";

/// The global config file name
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// One config file as written on disk; every field is optional
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub oracle: OracleSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub client: ClientSection,
    /// Replaces the wizard setup of lower-priority files wholesale
    pub wizard: Option<WizardConfig>,
    #[serde(default)]
    pub templates: TemplatesSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OracleSection {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<String>,
    /// Ceiling on a single oracle call, e.g. "30s"
    #[serde(default, with = "humantime_serde")]
    pub max_duration: Option<Duration>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    /// Base URL of a running `finplan serve`
    pub server: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TemplatesSection {
    /// Directory of `<name>.hbs` overrides
    pub dir: Option<PathBuf>,
}

impl FileConfig {
    /// Load a config file.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    /// Layer `over` on top of `self`; fields set in `over` win
    pub fn merge(self, over: FileConfig) -> FileConfig {
        FileConfig {
            oracle: OracleSection {
                provider: over.oracle.provider.or(self.oracle.provider),
                model: over.oracle.model.or(self.oracle.model),
                base_url: over.oracle.base_url.or(self.oracle.base_url),
                api_key_env: over.oracle.api_key_env.or(self.oracle.api_key_env),
                max_tokens: over.oracle.max_tokens.or(self.oracle.max_tokens),
            },
            server: ServerSection {
                bind: over.server.bind.or(self.server.bind),
                max_duration: over.server.max_duration.or(self.server.max_duration),
            },
            client: ClientSection {
                server: over.client.server.or(self.client.server),
            },
            wizard: over.wizard.or(self.wizard),
            templates: TemplatesSection {
                dir: over.templates.dir.or(self.templates.dir),
            },
        }
    }
}

/// Path of the global config file, if the platform has a config dir
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub oracle_type: OracleType,
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    pub bind: String,
    pub max_duration: Duration,
    pub server_url: Option<String>,
    pub wizard: WizardConfig,
    pub templates_dir: Option<PathBuf>,
}

impl Settings {
    /// Load global then project config and resolve against the defaults
    pub fn load(working_dir: &Path) -> Result<Self> {
        let global = match global_config_path() {
            Some(path) => FileConfig::load(&path)?,
            None => None,
        };
        Self::from_files(global, working_dir)
    }

    /// Resolve with an already-loaded global config (for tests and `--config`)
    pub fn from_files(global: Option<FileConfig>, working_dir: &Path) -> Result<Self> {
        let project = FileConfig::load(&working_dir.join(CONFIG_FILE_NAME))?;
        let merged = global.unwrap_or_default().merge(project.unwrap_or_default());
        Self::resolve(merged, working_dir)
    }

    fn resolve(config: FileConfig, working_dir: &Path) -> Result<Self> {
        let oracle_type = match config.oracle.provider.as_deref() {
            Some(p) => p
                .parse::<OracleType>()
                .map_err(|e| anyhow::anyhow!("Invalid [oracle] provider: {}", e))?,
            None => OracleType::default(),
        };

        // Relative override dirs are relative to the project, not the shell
        let templates_dir = config.templates.dir.map(|dir| {
            if dir.is_absolute() {
                dir
            } else {
                working_dir.join(dir)
            }
        });

        Ok(Self {
            oracle_type,
            model: config.oracle.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: config
                .oracle
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key_env: config
                .oracle
                .api_key_env
                .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string()),
            max_tokens: config.oracle.max_tokens.unwrap_or(4096),
            bind: config.server.bind.unwrap_or_else(|| DEFAULT_BIND.to_string()),
            max_duration: config.server.max_duration.unwrap_or(DEFAULT_MAX_DURATION),
            server_url: config.client.server,
            wizard: config.wizard.unwrap_or_default(),
            templates_dir,
        })
    }

    /// Oracle client settings, reading the key from the configured variable
    pub fn oracle_config(&self) -> OracleConfig {
        OracleConfig::new(self.model.clone())
            .with_base_url(self.base_url.clone())
            .with_api_key(std::env::var(&self.api_key_env).ok())
            .with_max_tokens(self.max_tokens)
            .with_timeout(self.max_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(toml: &str) -> FileConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::from_files(None, dir.path()).unwrap();

        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.bind, DEFAULT_BIND);
        assert_eq!(settings.max_duration, Duration::from_secs(30));
        assert_eq!(settings.wizard.separator, ", ");
        assert!(settings.server_url.is_none());
        assert!(settings.templates_dir.is_none());
    }

    #[test]
    fn test_project_overrides_global() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[oracle]\nmodel = \"gpt-4o\"\n\n[server]\nmax_duration = \"45s\"\n",
        )
        .unwrap();

        let global = parse(
            "[oracle]\nmodel = \"gpt-4o-mini\"\nmax_tokens = 2048\n\n[server]\nbind = \"0.0.0.0:8080\"\n",
        );
        let settings = Settings::from_files(Some(global), dir.path()).unwrap();

        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.max_tokens, 2048);
        assert_eq!(settings.bind, "0.0.0.0:8080");
        assert_eq!(settings.max_duration, Duration::from_secs(45));
    }

    #[test]
    fn test_wizard_section_with_custom_questions() {
        let config = parse(
            r#"
[wizard]
separator = "; "
currency_symbol = "€"

[[wizard.questions]]
id = "age"
text = "How old are you?"
rules = [{ kind = "required", message = "Age please" }]

[[wizard.questions]]
id = "income"
text = "Yearly income?"
hint = "Before tax"
rules = [{ kind = "currency", symbol = "€", message = "Amount please" }]
"#,
        );

        let wizard = config.wizard.unwrap();
        assert_eq!(wizard.separator, "; ");
        assert_eq!(wizard.questions.len(), 2);
        assert_eq!(wizard.questions[1].hint.as_deref(), Some("Before tax"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[oracle]\ntemperature = 0.2\n",
        )
        .unwrap();

        let err = Settings::from_files(None, dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_invalid_provider_is_rejected() {
        let dir = TempDir::new().unwrap();
        let global = parse("[oracle]\nprovider = \"carrier-pigeon\"\n");
        assert!(Settings::from_files(Some(global), dir.path()).is_err());
    }

    #[test]
    fn test_relative_template_dir_resolves_against_project() {
        let dir = TempDir::new().unwrap();
        let global = parse("[templates]\ndir = \"prompts\"\n");
        let settings = Settings::from_files(Some(global), dir.path()).unwrap();

        assert_eq!(settings.templates_dir, Some(dir.path().join("prompts")));
    }

    #[test]
    fn test_oracle_config_uses_configured_key_variable() {
        let dir = TempDir::new().unwrap();
        let global = parse(
            "[oracle]\nbase_url = \"http://localhost:11434/\"\napi_key_env = \"FINPLAN_TEST_KEY_UNSET\"\n",
        );
        let settings = Settings::from_files(Some(global), dir.path()).unwrap();
        let oracle = settings.oracle_config();

        assert_eq!(oracle.base_url, "http://localhost:11434");
        assert!(oracle.api_key.is_none());
        assert_eq!(oracle.timeout, Some(Duration::from_secs(30)));
    }
}
