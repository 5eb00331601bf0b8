//! Settings structures for Compass Search configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Default ordered backend list when `COMPASS_ADAPTERS` is unset
pub const DEFAULT_BACKENDS: &[&str] = &["duckduckgo", "bing_stub", "brave_stub", "google_cse"];

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub search: SearchSettings,
    pub outgoing: OutgoingSettings,
    pub index: IndexSettings,
    pub google_cse: GoogleCseSettings,
    pub serper: SerperSettings,
    pub turso: TursoSettings,
    pub compass_ai: CompassAiSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with process environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge values from an arbitrary variable lookup.
    ///
    /// Empty values are ignored so that `KEY=` in an env file does not wipe a
    /// setting loaded from YAML.
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(val) = var("COMPASS_ADAPTERS") {
            self.search.backends = split_list(&val, ',');
        }
        if let Some(val) = var("COMPASS_API_KEYS") {
            self.search.api_keys.extend(parse_key_map(&val));
        }
        if let Some(val) = var("COMPASS_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("COMPASS_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = var("OPENSEARCH_URL") {
            self.index.url = Some(val);
        }
        if let Some(val) = var("GOOGLE_API_KEYS") {
            self.google_cse.api_keys = split_list(&val, ',');
        }
        if let Some(val) = var("GOOGLE_CSE_CXS") {
            self.google_cse.cx_ids = split_list(&val, ',');
        }
        if let Some(val) = var("GOOGLE_CSE_CX") {
            self.google_cse.default_cx = Some(val);
        }
        if let Some(val) = var("SERPER_API_KEY") {
            self.serper.api_key = Some(val);
        }
        if let Some(val) = var("TURSO_DB_URL") {
            self.turso.url = Some(val);
        }
        if let Some(val) = var("TURSO_AUTH_TOKEN") {
            self.turso.auth_token = Some(val);
        }
        if let Some(val) = var("COMPASS_AI_URL") {
            self.compass_ai.base_url = val;
        }
    }

    /// Credential configured for a backend in the per-backend key map
    pub fn api_key(&self, backend: &str) -> Option<&str> {
        self.search.api_keys.get(backend).map(String::as_str)
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Ordered list of enabled backend names
    pub backends: Vec<String>,
    /// Per-backend credential map
    pub api_keys: HashMap<String, String>,
    /// Page size when the caller gives none
    pub default_limit: usize,
    /// Largest page size served; bigger requests are clamped
    pub max_limit: usize,
    /// Timeout applied to backends that do not declare their own (seconds)
    pub backend_timeout: f64,
    /// Upper bound for any backend timeout (seconds)
    pub max_backend_timeout: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            backends: DEFAULT_BACKENDS.iter().map(|s| s.to_string()).collect(),
            api_keys: HashMap::new(),
            default_limit: 10,
            max_limit: 100,
            backend_timeout: 10.0,
            max_backend_timeout: 30.0,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            user_agent: format!("compass-search/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Durable index (OpenSearch) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Connection URL; its presence enables the `local_index` backend
    pub url: Option<String>,
    /// Index holding ingested pages
    pub pages_index: String,
    /// Budget for the startup reachability probe (seconds)
    pub ping_timeout: f64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            url: None,
            pages_index: "pages".to_string(),
            ping_timeout: 2.0,
        }
    }
}

/// Google Custom Search settings.
///
/// Keys and CX ids are paired by position; a shorter CX list is cycled and
/// `default_cx` fills in when no list is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleCseSettings {
    pub api_keys: Vec<String>,
    pub cx_ids: Vec<String>,
    pub default_cx: Option<String>,
    /// Seconds a cached response stays valid
    pub cache_ttl: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SerperSettings {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TursoSettings {
    pub url: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompassAiSettings {
    pub base_url: String,
}

impl Default for CompassAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://compassb.vercel.app".to_string(),
        }
    }
}

fn split_list(value: &str, sep: char) -> Vec<String> {
    value
        .split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `name:key;name2:key2`; keys may themselves contain `:`
fn parse_key_map(value: &str) -> HashMap<String, String> {
    value
        .split(';')
        .filter_map(|pair| pair.split_once(':'))
        .map(|(name, key)| (name.trim().to_string(), key.trim().to_string()))
        .filter(|(name, key)| !name.is_empty() && !key.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(
            settings.search.backends,
            vec!["duckduckgo", "bing_stub", "brave_stub", "google_cse"]
        );
        assert!(settings.index.url.is_none());
    }

    #[test]
    fn test_backend_list_from_env() {
        let mut settings = Settings::default();
        settings.merge_vars(vars(&[("COMPASS_ADAPTERS", " google_cse, ,duckduckgo ")]));
        assert_eq!(settings.search.backends, vec!["google_cse", "duckduckgo"]);
    }

    #[test]
    fn test_api_key_map() {
        let mut settings = Settings::default();
        settings.merge_vars(vars(&[("COMPASS_API_KEYS", "serper:abc;bing_stub:x:y;broken")]));
        assert_eq!(settings.api_key("serper"), Some("abc"));
        assert_eq!(settings.api_key("bing_stub"), Some("x:y"));
        assert_eq!(settings.api_key("broken"), None);
    }

    #[test]
    fn test_rotation_lists() {
        let mut settings = Settings::default();
        settings.merge_vars(vars(&[
            ("GOOGLE_API_KEYS", "k1,k2,k3"),
            ("GOOGLE_CSE_CXS", "c1,c2"),
            ("GOOGLE_CSE_CX", "fallback"),
        ]));
        assert_eq!(settings.google_cse.api_keys, vec!["k1", "k2", "k3"]);
        assert_eq!(settings.google_cse.cx_ids, vec!["c1", "c2"]);
        assert_eq!(settings.google_cse.default_cx.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_empty_env_value_ignored() {
        let mut settings = Settings::default();
        settings.merge_vars(vars(&[("OPENSEARCH_URL", "  "), ("COMPASS_PORT", "9001")]));
        assert!(settings.index.url.is_none());
        assert_eq!(settings.server.port, 9001);
    }

    #[test]
    fn test_yaml_round_trip_defaults() {
        let yaml = "search:\n  backends: [local_index, serper]\nindex:\n  url: http://localhost:9200\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.search.backends, vec!["local_index", "serper"]);
        assert_eq!(settings.search.default_limit, 10);
        assert_eq!(settings.search.max_limit, 100);
        assert_eq!(settings.index.pages_index, "pages");
    }
}
