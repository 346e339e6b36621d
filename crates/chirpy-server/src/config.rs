use std::path::PathBuf;

use thiserror::Error;

use chirpy_api::{ApiConfig, Platform};

/// Signing secrets that ship in sample `.env` files and must never reach a running server.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is unset or still a placeholder")]
    MissingSecret,
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub assets_dir: PathBuf,
    pub api: ApiConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET")
            .filter(|s| !PLACEHOLDER_SECRETS.contains(&s.as_str()))
            .ok_or(ConfigError::MissingSecret)?;

        let port = match get("CHIRPY_PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "CHIRPY_PORT", value })?,
            None => 8080,
        };

        Ok(Self {
            db_path: get("DB_URL").unwrap_or_else(|| "chirpy.db".into()).into(),
            host: get("CHIRPY_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            assets_dir: get("CHIRPY_ASSETS_DIR").unwrap_or_else(|| "./assets".into()).into(),
            api: ApiConfig {
                jwt_secret,
                platform: Platform::from_env_value(&get("PLATFORM").unwrap_or_default()),
                polka_key: get("POLKA_KEY"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[("JWT_SECRET", "s3cr3t")]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("chirpy.db"));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.assets_dir, PathBuf::from("./assets"));
        assert_eq!(config.api.platform, Platform::Production);
        assert!(config.api.polka_key.is_none());
    }

    #[test]
    fn reads_everything() {
        let config = config(&[
            ("JWT_SECRET", "s3cr3t"),
            ("DB_URL", "/var/lib/chirpy/chirpy.db"),
            ("PLATFORM", "dev"),
            ("POLKA_KEY", "f271c81ff7084ee5b99a5091b42d486e"),
            ("CHIRPY_HOST", "127.0.0.1"),
            ("CHIRPY_PORT", "9000"),
            ("CHIRPY_ASSETS_DIR", "/srv/chirpy"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/chirpy/chirpy.db"));
        assert_eq!(config.api.platform, Platform::Dev);
        assert_eq!(config.api.polka_key.as_deref(), Some("f271c81ff7084ee5b99a5091b42d486e"));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.assets_dir, PathBuf::from("/srv/chirpy"));
    }

    #[test]
    fn secret_required() {
        assert!(matches!(config(&[]), Err(ConfigError::MissingSecret)));
        assert!(matches!(config(&[("JWT_SECRET", "  ")]), Err(ConfigError::MissingSecret)));
        assert!(matches!(
            config(&[("JWT_SECRET", "dev-secret-change-me")]),
            Err(ConfigError::MissingSecret)
        ));
    }

    #[test]
    fn bad_port() {
        assert!(matches!(
            config(&[("JWT_SECRET", "s3cr3t"), ("CHIRPY_PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "CHIRPY_PORT", .. })
        ));
    }
}
