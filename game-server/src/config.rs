use std::env;
use std::str::FromStr;

use game_core::DEFAULT_GRID_SIZE;
use game_persistence::connection::DEFAULT_DATABASE_URL;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub grid_size: usize,
    /// Fixed RNG seed for reproducible spins. Unset in production.
    pub rng_seed: Option<u64>,
    pub auth_dev_mode: bool,
    pub firebase_project_id: String,
    /// Emails promoted to admin when they sign in.
    pub admin_emails: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            grid_size: parse_or(&lookup, "GRID_SIZE", defaults.grid_size)?,
            rng_seed: lookup("RNG_SEED")
                .map(|value| parse_value("RNG_SEED", value))
                .transpose()?,
            auth_dev_mode: parse_or(&lookup, "AUTH_DEV_MODE", defaults.auth_dev_mode)?,
            firebase_project_id: lookup("FIREBASE_PROJECT_ID")
                .unwrap_or(defaults.firebase_project_id),
            admin_emails: lookup("ADMIN_EMAILS")
                .map(|value| {
                    value
                        .split(',')
                        .map(|email| email.trim().to_lowercase())
                        .filter(|email| !email.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            grid_size: DEFAULT_GRID_SIZE,
            rng_seed: None,
            auth_dev_mode: false,
            firebase_project_id: "magruit".to_string(),
            admin_emails: Vec::new(),
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => parse_value(name, value),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.grid_size, 3);
        assert_eq!(config.rng_seed, None);
        assert!(!config.auth_dev_mode);
        assert!(config.admin_emails.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("GRID_SIZE", "4"),
            ("RNG_SEED", "17"),
            ("AUTH_DEV_MODE", "true"),
            ("ADMIN_EMAILS", "Boss@Example.com, ops@example.com,"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.grid_size, 4);
        assert_eq!(config.rng_seed, Some(17));
        assert!(config.auth_dev_mode);
        assert_eq!(config.admin_emails, vec!["boss@example.com", "ops@example.com"]);
        assert!(config.is_admin_email("BOSS@example.com"));
        assert!(!config.is_admin_email("player@example.com"));
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }
}
