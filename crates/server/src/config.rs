//! Runtime settings: an optional `trudy.toml`, then environment variables
//! (after `.env` is loaded). Environment always wins.

use llm::GatewayConfig;
use orchestrator::{ModelConfig, OrchestratorConfig, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const CONFIG_FILE: &str = "trudy.toml";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:trudy.db";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EXPORT_DIR: &str = "exports";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub default: String,
    pub framing: Option<String>,
    pub create: Option<String>,
    pub evaluation: Option<String>,
    pub synthesis: Option<String>,
    pub judge: Option<String>,
    /// Retried once when a gpt-5 model returns nothing.
    pub fallback: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            default: DEFAULT_MODEL.to_string(),
            framing: None,
            create: None,
            evaluation: None,
            synthesis: None,
            judge: None,
            fallback: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_url: String,
    pub port: u16,
    #[serde(skip_serializing)]
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub models: ModelSettings,
    pub fake_runs: bool,
    pub trace: bool,
    pub proof_export: bool,
    pub export_dir: PathBuf,
    /// Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: DEFAULT_PORT,
            openai_api_key: String::new(),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            models: ModelSettings::default(),
            fake_runs: false,
            trace: false,
            proof_export: false,
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            cors_origins: Vec::new(),
        }
    }
}

impl Settings {
    /// Load `.env`, the config file named by `TRUDY_CONFIG` (or
    /// `trudy.toml` when present), then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }

        let path = std::env::var("TRUDY_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));
        let mut settings = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Config file loaded");
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay environment variables read through `lookup`. Blank values
    /// are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(port) = get("PORT") {
            self.port = port.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: port,
            })?;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.openai_api_key = key;
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.openai_base_url = url;
        }

        if let Some(model) = get("MODEL_DEFAULT") {
            self.models.default = model;
        }
        for (key, slot) in [
            ("MODEL_FRAMING", &mut self.models.framing),
            ("MODEL_CREATE", &mut self.models.create),
            ("MODEL_EVAL", &mut self.models.evaluation),
            ("MODEL_SYNTHESIS", &mut self.models.synthesis),
            ("MODEL_JUDGE", &mut self.models.judge),
        ] {
            if let Some(model) = get(key) {
                *slot = Some(model);
            }
        }
        if let Some(model) = get("MODEL_FALLBACK") {
            self.models.fallback = model;
        }

        if let Some(flag) = get("TRUDY_FAKE_RUNS") {
            self.fake_runs = parse_flag(&flag);
        }
        if get("DEMO_MODE").is_some_and(|flag| parse_flag(&flag)) {
            self.fake_runs = true;
        }
        if let Some(flag) = get("TRUDY_TRACE") {
            self.trace = parse_flag(&flag);
        }
        if let Some(flag) = get("TRUDY_PROOF_EXPORT") {
            self.proof_export = parse_flag(&flag);
        }
        if let Some(dir) = get("EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
        if let Some(origins) = get("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(())
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            fallback_model: self.models.fallback.clone(),
            fake_runs: self.fake_runs,
            trace: self.trace,
        }
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            default: self.models.default.clone(),
            framing: self.models.framing.clone(),
            create: self.models.create.clone(),
            evaluation: self.models.evaluation.clone(),
            synthesis: self.models.synthesis.clone(),
            judge: self.models.judge.clone(),
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let config = OrchestratorConfig::default().with_models(self.model_config());
        if self.proof_export {
            config.with_proof_export(&self.export_dir)
        } else {
            config
        }
    }
}

/// `1`, `true`, `yes` and `on` (any case) are true; anything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.database_url, "sqlite:trudy.db");
        assert_eq!(settings.port, 3001);
        assert_eq!(settings.models.default, "gpt-4o");
        assert!(!settings.fake_runs);
        assert!(settings.orchestrator_config().proof_export_dir.is_none());
    }

    #[test]
    fn test_parse_flag() {
        for value in ["1", "true", "YES", " on "] {
            assert!(parse_flag(value), "{value}");
        }
        for value in ["0", "false", "off", "", "enabled"] {
            assert!(!parse_flag(value), "{value}");
        }
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[
                ("PORT", "8080"),
                ("MODEL_DEFAULT", "gpt-4.1"),
                ("MODEL_EVAL", "gpt-5"),
                ("MODEL_JUDGE", "  "),
                ("TRUDY_PROOF_EXPORT", "on"),
                ("EXPORT_DIR", "/tmp/proofs"),
                ("CORS_ORIGINS", "http://a.test, ,http://b.test"),
            ]))
            .unwrap();

        assert_eq!(settings.port, 8080);
        let models = settings.model_config();
        assert_eq!(models.evaluation(), "gpt-5");
        assert_eq!(models.judge(), "gpt-4.1");
        assert_eq!(settings.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(
            settings.orchestrator_config().proof_export_dir,
            Some(PathBuf::from("/tmp/proofs"))
        );
    }

    #[test]
    fn test_demo_mode_implies_fake_runs() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[("TRUDY_FAKE_RUNS", "0"), ("DEMO_MODE", "true")]))
            .unwrap();
        assert!(settings.fake_runs);
        assert!(settings.gateway_config().fake_runs);
    }

    #[test]
    fn test_invalid_port() {
        let mut settings = Settings::default();
        let err = settings.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_toml_then_env() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trudy.toml");
        std::fs::write(
            &path,
            r#"
port = 4000
fake_runs = true

[models]
default = "gpt-4o-mini"
create = "gpt-5"
"#,
        )
        .unwrap();

        let mut settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.port, 4000);
        assert!(settings.fake_runs);
        assert_eq!(settings.models.fallback, "gpt-4o");

        settings.apply_env(env(&[("PORT", "5000")])).unwrap();
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.model_config().create(), "gpt-5");
        assert_eq!(settings.model_config().framing(), "gpt-4o-mini");
    }
}
