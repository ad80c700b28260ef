//! Configuration management for dbtcloudctl
//!
//! Configuration is stored in TOML with one table per named profile:
//!
//! ```toml
//! default_profile = "prod"
//!
//! [profiles.prod]
//! account_id = 12345
//! token = "${DBT_CLOUD_TOKEN}"
//! host_url = "https://emea.dbt.com/api"
//! ```

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use crate::client::DEFAULT_BASE_URL;

pub const ENV_ACCOUNT_ID: &str = "DBT_CLOUD_ACCOUNT_ID";
pub const ENV_TOKEN: &str = "DBT_CLOUD_TOKEN";
pub const ENV_HOST_URL: &str = "DBT_CLOUD_HOST_URL";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is given explicitly
    #[serde(default)]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Connection settings for one dbt Cloud account
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    pub account_id: i64,
    /// API token, or `keyring:<key>` when stored in the OS keyring
    pub token: String,
    #[serde(default = "default_host_url")]
    pub host_url: String,
}

/// Profile values after env var and keyring resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile {
    pub account_id: i64,
    pub token: String,
    pub host_url: String,
}

fn default_host_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Parse an account ID taken from the environment
pub fn parse_account_id(raw: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        ConfigError::CredentialError(format!(
            "{} must be an integer, got '{}'",
            ENV_ACCOUNT_ID, raw
        ))
    })
}

impl Profile {
    pub fn new(account_id: i64, token: impl Into<String>) -> Self {
        Self {
            account_id,
            token: token.into(),
            host_url: default_host_url(),
        }
    }

    /// Whether the token lives in the OS keyring
    pub fn uses_keyring(&self) -> bool {
        CredentialStore::is_keyring_reference(&self.token)
    }

    /// Resolve token and host URL (keyring, `DBT_CLOUD_*` env overrides)
    pub fn resolve_credentials(&self) -> Result<ResolvedProfile> {
        self.resolve(true)
    }

    /// Resolve from the stored values only, ignoring the environment
    pub fn resolve_stored_credentials(&self) -> Result<ResolvedProfile> {
        self.resolve(false)
    }

    fn resolve(&self, use_env: bool) -> Result<ResolvedProfile> {
        let store = CredentialStore::new();
        let env_var = |name: &'static str| use_env.then_some(name);

        let token = store
            .get_credential(&self.token, env_var(ENV_TOKEN))
            .map_err(|e| ConfigError::CredentialError(format!("Failed to resolve token: {}", e)))?;
        let host_url = store
            .get_credential(&self.host_url, env_var(ENV_HOST_URL))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve host URL: {}", e))
            })?;
        let account_id = match env_var(ENV_ACCOUNT_ID).and_then(|v| std::env::var(v).ok()) {
            Some(raw) => parse_account_id(&raw)?,
            None => self.account_id,
        };

        Ok(ResolvedProfile {
            account_id,
            token,
            host_url,
        })
    }
}

impl Config {
    /// Resolve the profile name to use
    ///
    /// Explicit name, then `default_profile`, then the first profile by name.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        if let Some((name, _)) = self.list_profiles().first() {
            return Ok((*name).clone());
        }

        Err(ConfigError::NoProfiles {
            suggestion: "Use 'dbtcloudctl profile set' to create a profile.".to_string(),
        })
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path; a missing file is an empty config
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);
        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path, creating parent directories
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name, clearing the default if it pointed here
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/dbtcloudctl/config.toml` wins when it (or its
    /// directory) exists; otherwise the platform default is used:
    /// - Linux: `~/.config/dbtcloudctl/config.toml`
    /// - macOS: `~/Library/Application Support/com.getdbt.dbtcloudctl/config.toml`
    /// - Windows: `%APPDATA%\getdbt\dbtcloudctl\config.toml`
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("dbtcloudctl")
                    .join("config.toml");

                if linux_style_path.exists()
                    || linux_style_path
                        .parent()
                        .map(|p| p.exists())
                        .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("com", "getdbt", "dbtcloudctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand `${VAR}` and `${VAR:-default}` references
    ///
    /// Unset variables are left as-is so profiles that are not used do not
    /// need their variables defined.
    fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.set_profile("prod".to_string(), Profile::new(12345, "dbtc_prod"));
        config.default_profile = Some("prod".to_string());

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(deserialized.default_profile.as_deref(), Some("prod"));
        assert_eq!(deserialized.profiles["prod"], Profile::new(12345, "dbtc_prod"));
    }

    #[test]
    fn test_host_url_defaults() {
        let config: Config = toml::from_str(
            r#"
[profiles.dev]
account_id = 1
token = "t"
"#,
        )
        .unwrap();
        assert_eq!(config.profiles["dev"].host_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_resolve_profile_order() {
        let mut config = Config::default();
        assert!(matches!(
            config.resolve_profile(None),
            Err(ConfigError::NoProfiles { .. })
        ));

        config.set_profile("zeta".to_string(), Profile::new(1, "a"));
        config.set_profile("alpha".to_string(), Profile::new(2, "b"));
        assert_eq!(config.resolve_profile(None).unwrap(), "alpha");

        config.default_profile = Some("zeta".to_string());
        assert_eq!(config.resolve_profile(None).unwrap(), "zeta");
        assert_eq!(config.resolve_profile(Some("other")).unwrap(), "other");
    }

    #[test]
    fn test_remove_profile_clears_default() {
        let mut config = Config::default();
        config.set_profile("prod".to_string(), Profile::new(1, "a"));
        config.default_profile = Some("prod".to_string());

        assert!(config.remove_profile("prod").is_some());
        assert!(config.default_profile.is_none());
        assert!(config.remove_profile("prod").is_none());
    }

    #[test]
    fn test_profile_lookup_error() {
        let config = Config::default();
        let err = config.profile("missing").unwrap_err();
        assert_eq!(err.to_string(), "Profile 'missing' not found");
    }

    #[test]
    #[serial]
    fn test_env_var_expansion() {
        unsafe {
            std::env::set_var("DBTCLOUD_TEST_TOKEN", "expanded-token");
        }

        let content = r#"
[profiles.test]
account_id = 5
token = "${DBTCLOUD_TEST_TOKEN}"
host_url = "${DBTCLOUD_TEST_UNSET_URL:-https://emea.dbt.com/api}"
"#;
        let config: Config = toml::from_str(&Config::expand_env_vars(content)).unwrap();
        let profile = &config.profiles["test"];
        assert_eq!(profile.token, "expanded-token");
        assert_eq!(profile.host_url, "https://emea.dbt.com/api");

        unsafe {
            std::env::remove_var("DBTCLOUD_TEST_TOKEN");
        }
    }

    #[test]
    #[serial]
    fn test_resolve_credentials_env_overrides() {
        let profile = Profile::new(100, "from-file");

        unsafe {
            std::env::remove_var(ENV_TOKEN);
            std::env::remove_var(ENV_HOST_URL);
            std::env::set_var(ENV_ACCOUNT_ID, "200");
        }
        let resolved = profile.resolve_credentials().unwrap();
        assert_eq!(resolved.account_id, 200);
        assert_eq!(resolved.token, "from-file");
        assert_eq!(resolved.host_url, DEFAULT_BASE_URL);
        assert_eq!(profile.resolve_stored_credentials().unwrap().account_id, 100);

        unsafe {
            std::env::set_var(ENV_ACCOUNT_ID, "not-a-number");
        }
        assert!(profile.resolve_credentials().is_err());

        unsafe {
            std::env::remove_var(ENV_ACCOUNT_ID);
        }
    }
}
