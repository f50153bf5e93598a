use std::{env, path::PathBuf};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/preferences.json";
pub const DEFAULT_API_BASE_URL: &str = "https://saudediaria-990926851328.southamerica-east1.run.app";

/// Settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub api_base_url: String,
}

impl Config {
    /// `PORT`, `APP_DATA_PATH` and `API_BASE_URL`; unset or blank values use
    /// the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            port: value("PORT")
                .and_then(|port| port.trim().parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            data_path: value("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            api_base_url: value("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("APP_DATA_PATH", "/tmp/prefs.json"),
            ("API_BASE_URL", "http://localhost:8081"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, PathBuf::from("/tmp/prefs.json"));
        assert_eq!(config.api_base_url, "http://localhost:8081");
    }

    #[test]
    fn blank_or_invalid_values_fall_back() {
        let config = config(&[("PORT", "not-a-port"), ("API_BASE_URL", "  ")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }
}
