//! Core configuration

use std::path::PathBuf;

/// Which backend the auth service talks to.
///
/// Selected at composition time; the service surface is identical either
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Local file-backed store emulating the backend (demo/offline)
    #[default]
    Local,
    /// Hosted HTTP API
    Remote,
}

/// Configuration for the core data layer
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Root directory for persisted state
    pub data_dir: PathBuf,

    /// Base URL of the hosted API (no trailing slash)
    pub api_base_url: String,

    /// Backend selection
    pub mode: BackendMode,

    /// Artificial latency for local store operations, emulating network
    /// round-trips for UI purposes. Applied outside any critical section.
    pub simulated_latency_ms: u64,

    /// Seed a bootstrap administrator into an empty local store.
    /// Demo convenience only; a backend-backed deployment provisions
    /// accounts server-side and composes with this off.
    pub seed_admin: bool,
}

impl CoreConfig {
    /// Create a configuration rooted at the given data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            api_base_url: std::env::var("SHINAS_API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
            mode: BackendMode::Local,
            simulated_latency_ms: 300,
            seed_admin: true,
        }
    }

    /// Set the API base URL
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the backend mode
    pub fn with_mode(mut self, mode: BackendMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the simulated latency
    pub fn with_simulated_latency_ms(mut self, millis: u64) -> Self {
        self.simulated_latency_ms = millis;
        self
    }

    /// Enable or disable the seed administrator
    pub fn with_seed_admin(mut self, seed: bool) -> Self {
        self.seed_admin = seed;
        self
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = std::env::var("SHINAS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".shinas"));
        Self::new(data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::new("/tmp/shinas-test");
        assert_eq!(config.mode, BackendMode::Local);
        assert_eq!(config.simulated_latency_ms, 300);
        assert!(config.seed_admin);
    }

    #[test]
    fn test_builders() {
        let config = CoreConfig::new("/tmp/shinas-test")
            .with_mode(BackendMode::Remote)
            .with_simulated_latency_ms(0)
            .with_seed_admin(false)
            .with_api_base_url("http://api.example.com");
        assert_eq!(config.mode, BackendMode::Remote);
        assert_eq!(config.simulated_latency_ms, 0);
        assert!(!config.seed_admin);
        assert_eq!(config.api_base_url, "http://api.example.com");
    }
}
