use anyhow::{Context, Result};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match var("PORT") {
            Some(port) => port.trim().parse().context("PORT must be a number")?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: var("DATABASE_URL").context("Cannot load DATABASE_URL env variable")?,
            api_keys: var("API_KEYS").unwrap_or_default(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_and_required_database_url() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/judging")]))
            .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.api_keys.is_empty());

        assert!(Config::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/judging"),
            ("PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }
}
