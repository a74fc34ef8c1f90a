// Runtime configuration - read once from the environment at startup
use directories::ProjectDirs;
use std::path::PathBuf;

/// Model used for both enhancement and opinion requests
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Base URL of the generative-language API
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Settings for the text-generation client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ai: AiConfig,
    /// Holds the catalog database and spooled media
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ai = AiConfig {
            api_key: non_empty("GEMINI_API_KEY")
                .or_else(|| non_empty("API_KEY"))
                .map(|key| key.trim().to_string()),
            model: non_empty("VIEW4K_AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: non_empty("VIEW4K_AI_ENDPOINT")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        };

        let data_dir = non_empty("VIEW4K_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Self { ai, data_dir }
    }

    /// Path of the catalog database
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("catalog.db")
    }

    /// Directory for embedded videos written out for playback
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join("media")
    }
}

fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "view4k", "View4K") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        // Fallback to home directory
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".view4k")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[("VIEW4K_DATA_DIR", "/tmp/view4k")]);
        assert_eq!(config.ai, AiConfig::default());
        assert_eq!(config.catalog_path(), PathBuf::from("/tmp/view4k/catalog.db"));
        assert_eq!(config.media_dir(), PathBuf::from("/tmp/view4k/media"));
    }

    #[test]
    fn gemini_key_takes_precedence() {
        let config = config_from(&[("GEMINI_API_KEY", " AIza-primary "), ("API_KEY", "AIza-legacy")]);
        assert_eq!(config.ai.api_key.as_deref(), Some("AIza-primary"));

        let config = config_from(&[("GEMINI_API_KEY", ""), ("API_KEY", "AIza-legacy")]);
        assert_eq!(config.ai.api_key.as_deref(), Some("AIza-legacy"));
    }

    #[test]
    fn endpoint_and_model_overrides() {
        let config = config_from(&[
            ("VIEW4K_AI_ENDPOINT", "http://127.0.0.1:9000/"),
            ("VIEW4K_AI_MODEL", "test-model"),
        ]);
        assert_eq!(config.ai.endpoint, "http://127.0.0.1:9000");
        assert_eq!(config.ai.model, "test-model");
    }
}
