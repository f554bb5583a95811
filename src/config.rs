use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str =
    "https://courses.cs.washington.edu/courses/cse154/webservices/pokedex/";
pub const DEFAULT_STARTERS: [&str; 3] = ["bulbasaur", "charmander", "squirtle"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClientConfig {
    /// Base URL of the pokedex service, with or without a trailing slash.
    pub api_url: String,
    /// Entries that start out found in a fresh pokedex.
    #[serde(default = "default_starters")]
    pub starters: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            starters: default_starters(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, starters: Vec<String>) -> Self {
        let starters = if starters.is_empty() {
            default_starters()
        } else {
            starters
        };
        Self {
            api_url: api_url.into(),
            starters,
        }
    }

    pub fn base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base(), path.trim_start_matches('/'))
    }

    /// Resolves a relative image path from a detail record.
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        self.endpoint_url(path)
    }
}

fn default_starters() -> Vec<String> {
    DEFAULT_STARTERS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slash() {
        let config = ClientConfig::new("http://localhost:8000/pokedex/", Vec::new());
        assert_eq!(
            config.endpoint_url("game.php"),
            "http://localhost:8000/pokedex/game.php"
        );
        assert_eq!(
            config.asset_url("images/pikachu.jpg"),
            "http://localhost:8000/pokedex/images/pikachu.jpg"
        );
    }

    #[test]
    fn absolute_asset_urls_pass_through() {
        let config = ClientConfig::default();
        assert_eq!(
            config.asset_url("https://cdn.example/photo.png"),
            "https://cdn.example/photo.png"
        );
    }

    #[test]
    fn empty_starter_list_falls_back_to_defaults() {
        let config = ClientConfig::new(DEFAULT_API_URL, Vec::new());
        assert_eq!(config.starters, vec!["bulbasaur", "charmander", "squirtle"]);

        let custom = ClientConfig::new(DEFAULT_API_URL, vec!["pikachu".to_string()]);
        assert_eq!(custom.starters, vec!["pikachu"]);
    }
}
