use crate::pinned::{DEFAULT_PINNED_REPOS, PinnedRepoSet};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use url::Url;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,
    #[error("Cache TTL cannot be 0")]
    InvalidTtl,
    #[error("GitHub request timeout cannot be 0")]
    InvalidTimeout,
    #[error("GitHub username cannot be empty")]
    EmptyUsername,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }

    fn admin_default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3001,
        }
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct GitHub {
    pub api_base: Url,
    pub username: String,
    /// Sent as a bearer token when set.
    pub token: Option<String>,
    /// When true, a missing token fails the remote source instead of making
    /// an unauthenticated call.
    pub require_token: bool,
    pub timeout_secs: u64,
}

impl Default for GitHub {
    fn default() -> Self {
        GitHub {
            api_base: Url::parse("https://api.github.com").expect("valid default url"),
            username: "aashish000000".into(),
            token: None,
            require_token: false,
            timeout_secs: 8,
        }
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct Fallback {
    pub path: PathBuf,
}

impl Default for Fallback {
    fn default() -> Self {
        Fallback {
            path: PathBuf::from("data/projects.json"),
        }
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct Cache {
    pub ttl_secs: u64,
}

impl Default for Cache {
    fn default() -> Self {
        Cache { ttl_secs: 600 }
    }
}

fn default_pinned_repos() -> Vec<String> {
    DEFAULT_PINNED_REPOS.iter().map(|s| s.to_string()).collect()
}

fn default_admin_listener() -> Listener {
    Listener::admin_default()
}

// Missing admin listener fields fall back to the admin defaults, not the
// public listener's.
fn partial_admin_listener<'de, D>(deserializer: D) -> Result<Listener, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Partial {
        host: Option<String>,
        port: Option<u16>,
    }

    let partial = Partial::deserialize(deserializer)?;
    let defaults = Listener::admin_default();
    Ok(Listener {
        host: partial.host.unwrap_or(defaults.host),
        port: partial.port.unwrap_or(defaults.port),
    })
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    #[serde(
        default = "default_admin_listener",
        deserialize_with = "partial_admin_listener"
    )]
    pub admin_listener: Listener,
    #[serde(default)]
    pub github: GitHub,
    #[serde(default = "default_pinned_repos")]
    pub pinned_repos: Vec<String>,
    #[serde(default)]
    pub fallback: Fallback,
    #[serde(default)]
    pub cache: Cache,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listener: Listener::default(),
            admin_listener: Listener::admin_default(),
            github: GitHub::default(),
            pinned_repos: default_pinned_repos(),
            fallback: Fallback::default(),
            cache: Cache::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.cache.ttl_secs == 0 {
            return Err(ValidationError::InvalidTtl);
        }
        if self.github.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.github.username.trim().is_empty() {
            return Err(ValidationError::EmptyUsername);
        }
        Ok(())
    }

    pub fn pinned(&self) -> PinnedRepoSet {
        PinnedRepoSet::new(&self.pinned_repos)
    }

    /// Applies environment overrides on top of file values. `lookup` is
    /// `std::env::var` in production; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("GITHUB_TOKEN") {
            self.github.token = Some(token.trim().to_string());
        }
        if let Some(username) = get("GITHUB_USERNAME") {
            self.github.username = username.trim().to_string();
        }
        if let Some(list) = get("PINNED_REPOS") {
            self.pinned_repos = PinnedRepoSet::parse(&list).names().to_vec();
        }
        if let Some(port) = get("PORT") {
            match port.trim().parse() {
                Ok(port) => self.listener.port = port,
                Err(_) => tracing::warn!(%port, "ignoring invalid PORT override"),
            }
        }
        if let Some(path) = get("PROJECTS_FALLBACK_PATH") {
            self.fallback.path = PathBuf::from(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.admin_listener.port, 3001);
        assert_eq!(config.cache.ttl_secs, 600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r#"
            listener:
                host: 0.0.0.0
                port: 8080
            github:
                username: someone
                require_token: true
            pinned_repos: [demo-repo]
            fallback:
                path: /srv/projects.json
        "#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.github.username, "someone");
        assert!(config.github.require_token);
        assert_eq!(config.github.timeout_secs, 8);
        assert_eq!(config.pinned().names(), ["demo-repo"]);
        assert_eq!(config.fallback.path, PathBuf::from("/srv/projects.json"));
    }

    #[test]
    fn test_partial_listeners() {
        let yaml = r#"
            listener:
                port: 8080
            admin_listener:
                host: 0.0.0.0
        "#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.listener,
            Listener {
                host: "127.0.0.1".into(),
                port: 8080,
            }
        );
        assert_eq!(
            config.admin_listener,
            Listener {
                host: "0.0.0.0".into(),
                port: 3001,
            }
        );
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            ("GITHUB_TOKEN", "secret\n"),
            ("GITHUB_USERNAME", "other"),
            ("PINNED_REPOS", "a, b"),
            ("PORT", "9090"),
            ("PROJECTS_FALLBACK_PATH", ""),
        ]);
        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.github.token.as_deref(), Some("secret"));
        assert_eq!(config.github.username, "other");
        assert_eq!(config.pinned_repos, vec!["a", "b"]);
        assert_eq!(config.listener.port, 9090);
        // Empty values leave the default in place.
        assert_eq!(config.fallback.path, PathBuf::from("data/projects.json"));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.cache.ttl_secs = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidTtl));

        let mut config = Config::default();
        config.listener.port = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));

        let mut config = Config::default();
        config.github.username = " ".into();
        assert_eq!(config.validate(), Err(ValidationError::EmptyUsername));
    }
}
