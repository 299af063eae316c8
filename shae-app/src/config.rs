//! SHAE client configuration loader.
//!
//! TOML file, then environment overrides, then validation.

use serde::Deserialize;
use shae_actions::{Delay, UnknownIdPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShaeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Dev,
    Prod,
}

impl AppEnv {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Some(Self::Dev),
            "prod" | "production" => Some(Self::Prod),
            _ => None,
        }
    }

    /// Unknown suggestion ids are loud in development, quiet in production.
    pub fn unknown_id_policy(self) -> UnknownIdPolicy {
        match self {
            Self::Dev => UnknownIdPolicy::Loud,
            Self::Prod => UnknownIdPolicy::Quiet,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub app_env: AppEnv,
    /// Where the session id file lives. Default: `~/.shae/data`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    shae_api::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Presentation delays, in milliseconds. Zero is allowed everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_suggestion_reveal_ms")]
    pub suggestion_reveal_ms: u64,
    #[serde(default = "default_skip_ack_ms")]
    pub skip_ack_ms: u64,
    #[serde(default = "default_completion_ack_ms")]
    pub completion_ack_ms: u64,
}

fn default_suggestion_reveal_ms() -> u64 {
    1000
}

fn default_skip_ack_ms() -> u64 {
    300
}

fn default_completion_ack_ms() -> u64 {
    500
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            suggestion_reveal_ms: default_suggestion_reveal_ms(),
            skip_ack_ms: default_skip_ack_ms(),
            completion_ack_ms: default_completion_ack_ms(),
        }
    }
}

impl PacingConfig {
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            suggestion_reveal_ms: 0,
            skip_ack_ms: 0,
            completion_ack_ms: 0,
        }
    }

    pub fn delay(&self, delay: Delay) -> Duration {
        let ms = match delay {
            Delay::Immediate => 0,
            Delay::SkipAcknowledgement => self.skip_ack_ms,
            Delay::CompletionAffirmation => self.completion_ack_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn suggestion_reveal(&self) -> Duration {
        Duration::from_millis(self.suggestion_reveal_ms)
    }
}

impl ShaeConfig {
    /// An explicit path must exist; a missing default file falls back to defaults.
    pub async fn load(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let explicit = path.is_some();
        let path = path.unwrap_or_else(default_config_path);

        let mut cfg = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Self::from_toml_str(&contents)
                .map_err(|e| anyhow::anyhow!("parse config {}: {e}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                Self::default()
            }
            Err(e) => return Err(anyhow::anyhow!("read config {}: {e}", path.display())),
        };

        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("SHAE_API_BASE_URL") {
            self.backend.base_url = v;
        }
        if let Some(v) = non_empty("SHAE_APP_ENV").or_else(|| non_empty("APP_ENV")) {
            match AppEnv::parse(&v) {
                Some(env) => self.general.app_env = env,
                None => tracing::warn!(value = %v, "ignoring unrecognised app env"),
            }
        }
        if let Some(v) = non_empty("SHAE_DATA_DIR") {
            self.general.data_dir = Some(PathBuf::from(v));
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("backend.base_url is required"));
        }
        if self.backend.timeout_secs == 0 {
            return Err(anyhow::anyhow!("backend.timeout_secs must be > 0"));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.general.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }
}

pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".shae").join("config.toml")
}

pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".shae").join("data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use uuid::Uuid;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = ShaeConfig::from_toml_str("").expect("parse empty config");
        assert_eq!(cfg.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(cfg.backend.timeout_secs, 60);
        assert_eq!(cfg.general.app_env, AppEnv::Dev);
        assert_eq!(cfg.pacing, PacingConfig::default());
        assert_eq!(cfg.pacing.delay(Delay::SkipAcknowledgement), Duration::from_millis(300));
        assert_eq!(
            cfg.pacing.delay(Delay::CompletionAffirmation),
            Duration::from_millis(500)
        );
        assert_eq!(cfg.pacing.suggestion_reveal(), Duration::from_secs(1));
    }

    #[test]
    fn parses_sections() {
        let cfg = ShaeConfig::from_toml_str(
            r#"
[general]
app_env = "prod"
data_dir = "/tmp/shae-data"

[backend]
base_url = "https://shae.example.com"

[pacing]
skip_ack_ms = 0
"#,
        )
        .expect("parse config");
        assert_eq!(cfg.general.app_env, AppEnv::Prod);
        assert_eq!(cfg.data_dir(), PathBuf::from("/tmp/shae-data"));
        assert_eq!(cfg.backend.base_url, "https://shae.example.com");
        assert_eq!(cfg.backend.timeout_secs, 60);
        assert_eq!(cfg.pacing.skip_ack_ms, 0);
        assert_eq!(cfg.pacing.completion_ack_ms, 500);
        assert_eq!(cfg.general.app_env.unknown_id_policy(), UnknownIdPolicy::Quiet);
    }

    #[test]
    fn env_overrides_win_and_blank_values_are_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SHAE_API_BASE_URL", "http://10.0.0.2:9000"),
            ("SHAE_APP_ENV", "  "),
            ("APP_ENV", "production"),
            ("SHAE_DATA_DIR", "/var/lib/shae"),
        ]);
        let mut cfg = ShaeConfig::default();
        cfg.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.backend.base_url, "http://10.0.0.2:9000");
        assert_eq!(cfg.general.app_env, AppEnv::Prod);
        assert_eq!(cfg.data_dir(), PathBuf::from("/var/lib/shae"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut cfg = ShaeConfig::default();
        cfg.backend.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[tokio::test]
    async fn explicit_missing_path_is_an_error() {
        let path = std::env::temp_dir().join(format!("shae-config-{}.toml", Uuid::new_v4()));
        let err = ShaeConfig::load(Some(path)).await.expect_err("missing file");
        assert!(err.to_string().contains("read config"));
    }

    #[tokio::test]
    async fn load_reads_explicit_file() {
        let path = std::env::temp_dir().join(format!("shae-config-{}.toml", Uuid::new_v4()));
        tokio::fs::write(&path, "[backend]\ntimeout_secs = 5\n")
            .await
            .expect("write config");
        let cfg = ShaeConfig::load(Some(path.clone())).await.expect("load config");
        assert_eq!(cfg.backend.timeout_secs, 5);
        let _ = std::fs::remove_file(path);
    }
}
