use crate::error::{Result, VvcError};
use crate::visibility::DEFAULT_MAX_PARENT_DEPTH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_SITE_URL: &str = "http://localhost";
const DEFAULT_LOGIN_PATH: &str = "/wp-login.php";
const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;
/// Longest accepted cache lifetime: one day.
pub const MAX_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Site configuration, stored in `<site>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VvcConfig {
    /// Base URL of the site, used for login redirects.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Path of the login screen relative to `site_url`.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Lifetime of the cached hidden-page set.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Upper bound on ancestors walked when resolving page visibility.
    #[serde(default = "default_max_parent_depth")]
    pub max_parent_depth: usize,
}

fn default_site_url() -> String {
    DEFAULT_SITE_URL.to_string()
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_max_parent_depth() -> usize {
    DEFAULT_MAX_PARENT_DEPTH
}

impl Default for VvcConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            login_path: default_login_path(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_parent_depth: DEFAULT_MAX_PARENT_DEPTH,
        }
    }
}

impl VvcConfig {
    pub const KEYS: [&'static str; 4] = [
        "site-url",
        "login-path",
        "cache-ttl-secs",
        "max-parent-depth",
    ];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(VvcError::Io)?;
        let config: VvcConfig =
            serde_json::from_str(&content).map_err(VvcError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(VvcError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(VvcError::Serialization)?;
        fs::write(config_path, content).map_err(VvcError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "site-url" => Some(self.site_url.clone()),
            "login-path" => Some(self.login_path.clone()),
            "cache-ttl-secs" => Some(self.cache_ttl_secs.to_string()),
            "max-parent-depth" => Some(self.max_parent_depth.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "site-url" => self.site_url = value.trim_end_matches('/').to_string(),
            "login-path" => self.set_login_path(value),
            "cache-ttl-secs" => {
                let secs: u64 = parse_number(key, value)?;
                if secs > MAX_CACHE_TTL_SECS {
                    return Err(VvcError::Api(format!(
                        "cache-ttl-secs must be at most {}",
                        MAX_CACHE_TTL_SECS
                    )));
                }
                self.cache_ttl_secs = secs;
            }
            "max-parent-depth" => {
                let depth: usize = parse_number(key, value)?;
                if depth == 0 {
                    return Err(VvcError::Api(
                        "max-parent-depth must be at least 1".to_string(),
                    ));
                }
                self.max_parent_depth = depth;
            }
            other => return Err(VvcError::Api(format!("Unknown config key: {}", other))),
        }
        Ok(())
    }

    /// Set the login path (normalizes to start with a slash)
    pub fn set_login_path(&mut self, path: &str) {
        if path.starts_with('/') {
            self.login_path = path.to_string();
        } else {
            self.login_path = format!("/{}", path);
        }
    }

    /// Cache lifetime, clamped to [`MAX_CACHE_TTL_SECS`] for hand-edited files.
    pub fn cache_ttl(&self) -> chrono::Duration {
        let secs = self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS);
        i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(|| chrono::Duration::days(1))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| VvcError::Api(format!("Invalid value for {}: {}", key, value)))
}
