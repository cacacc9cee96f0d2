use serde::Deserialize;
use std::time::Duration;

/// Client configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Root against which /mock, /blend, /blend/test and /health are resolved
    #[serde(default = "default_backend_base_url")]
    pub backend_base_url: String,

    /// Delay between two reveal steps, in milliseconds
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,

    /// Optional HTTP timeout; requests wait on the transport when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_backend_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_reveal_interval_ms() -> u64 {
    800
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_base_url: default_backend_base_url(),
            reveal_interval_ms: default_reveal_interval_ms(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.backend_base_url, "http://localhost:8000");
        assert_eq!(config.reveal_interval(), Duration::from_millis(800));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_overrides_from_environment() {
        let vars = vec![
            ("BACKEND_BASE_URL".to_string(), "https://blend.example.com".to_string()),
            ("REVEAL_INTERVAL_MS".to_string(), "250".to_string()),
            ("REQUEST_TIMEOUT_SECS".to_string(), "60".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.backend_base_url, "https://blend.example.com");
        assert_eq!(config.reveal_interval(), Duration::from_millis(250));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(60)));
    }
}
