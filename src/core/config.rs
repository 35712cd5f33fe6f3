use crate::core::currency::CurrencyCode;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_api_base_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeConfig {
    #[serde(default = "default_exchange_base_url")]
    pub base_url: String,
    #[serde(default = "default_exchange_timeout")]
    pub timeout_secs: u64,
}

impl ExchangeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            base_url: default_exchange_base_url(),
            timeout_secs: default_exchange_timeout(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://case.nodelabs.dev/api".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_exchange_base_url() -> String {
    "https://doviz.dev".to_string()
}

fn default_exchange_timeout() -> u64 {
    10
}

fn default_currency() -> CurrencyCode {
    CurrencyCode::Try
}

fn default_locale() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// Display currency used until the user picks one.
    #[serde(default = "default_currency")]
    pub currency: CurrencyCode,
    #[serde(default = "default_locale")]
    pub locale: String,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api: ApiConfig::default(),
            exchange: ExchangeConfig::default(),
            currency: default_currency(),
            locale: default_locale(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or the defaults when no
    /// config file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "maglo", "maglo")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "maglo", "maglo")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api:
  base_url: "http://localhost:8080/api"
  timeout_secs: 5
exchange:
  base_url: "http://localhost:9090"
currency: "USD"
locale: "tr-TR"
data_path: "/tmp/maglo"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
        assert_eq!(config.exchange.base_url, "http://localhost:9090");
        assert_eq!(config.exchange.timeout_secs, 10);
        assert_eq!(config.currency, CurrencyCode::Usd);
        assert_eq!(config.locale, "tr-TR");
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/maglo")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.api.base_url, "https://case.nodelabs.dev/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.exchange.base_url, "https://doviz.dev");
        assert_eq!(config.currency, CurrencyCode::Try);
        assert_eq!(config.locale, "en");
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_unsupported_currency_is_rejected() {
        let result = serde_yaml::from_str::<AppConfig>("currency: BTC");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "currency: EUR").unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.currency, CurrencyCode::Eur);

        let missing = AppConfig::load_from_path("/definitely/not/here.yaml");
        assert!(
            missing
                .unwrap_err()
                .to_string()
                .starts_with("Failed to read config file")
        );
    }
}
