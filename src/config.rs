use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::gemini::DEFAULT_API_URL;
use crate::orchestrator::{BatchConfig, DEFAULT_BATCH_SIZE};

const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_ERROR_BODY_BYTES: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
    pub max_error_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub batch: BatchConfig,
    pub taxonomy_path: Option<PathBuf>,
}

impl Config {
    /// Optional:
    /// - `GEMINI_API_KEY` (without it every classification degrades)
    /// - `GEMINI_API_URL`
    /// - `LOG_TRIAGE_BATCH_SIZE` (default: 5)
    /// - `LOG_TRIAGE_CALL_TIMEOUT_SECS` (default: 60, `0` disables)
    /// - `LOG_TRIAGE_TAXONOMY` (path to a JSON taxonomy)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let api_url = get("GEMINI_API_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let batch_size = match get("LOG_TRIAGE_BATCH_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "LOG_TRIAGE_BATCH_SIZE",
                    expected: "a positive integer",
                    value: raw,
                })?,
            None => DEFAULT_BATCH_SIZE,
        };

        let timeout_secs = match get("LOG_TRIAGE_CALL_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "LOG_TRIAGE_CALL_TIMEOUT_SECS",
                expected: "a whole number of seconds",
                value: raw,
            })?,
            None => DEFAULT_CALL_TIMEOUT_SECS,
        };

        Ok(Self {
            gemini: GeminiConfig {
                api_url,
                api_key: get("GEMINI_API_KEY"),
                connect_timeout: Duration::from_secs(10),
                max_error_body_bytes: DEFAULT_MAX_ERROR_BODY_BYTES,
            },
            batch: BatchConfig {
                batch_size,
                call_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            },
            taxonomy_path: get("LOG_TRIAGE_TAXONOMY").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.gemini.api_url, DEFAULT_API_URL);
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.batch.batch_size, 5);
        assert_eq!(config.batch.call_timeout, Some(Duration::from_secs(60)));
        assert!(config.taxonomy_path.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_API_URL", "http://localhost:9000/generate/"),
            ("LOG_TRIAGE_BATCH_SIZE", "8"),
            ("LOG_TRIAGE_CALL_TIMEOUT_SECS", "0"),
            ("LOG_TRIAGE_TAXONOMY", "/etc/taxonomy.json"),
        ]))
        .unwrap();
        assert_eq!(config.gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(config.gemini.api_url, "http://localhost:9000/generate");
        assert_eq!(config.batch.batch_size, 8);
        assert_eq!(config.batch.call_timeout, None);
        assert_eq!(config.taxonomy_path, Some(PathBuf::from("/etc/taxonomy.json")));
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert!(config.gemini.api_key.is_none());
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(Config::from_lookup(lookup(&[("LOG_TRIAGE_BATCH_SIZE", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("LOG_TRIAGE_BATCH_SIZE", "five")])).is_err());
        assert!(Config::from_lookup(lookup(&[("LOG_TRIAGE_CALL_TIMEOUT_SECS", "-1")])).is_err());
    }
}
