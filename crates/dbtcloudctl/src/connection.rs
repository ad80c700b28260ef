//! Connection management for dbt Cloud clients

use crate::error::{CtlError, Result as CliResult};
use anyhow::Context;
use dbtcloud_core::config::{ENV_ACCOUNT_ID, ENV_HOST_URL, ENV_TOKEN, parse_account_id};
use dbtcloud_core::{Config, DEFAULT_BASE_URL, DbtCloudClient};
use tracing::{debug, info, trace};

/// User agent string for dbtcloudctl HTTP requests
const DBTCLOUDCTL_USER_AGENT: &str = concat!("dbtcloudctl/", env!("CARGO_PKG_VERSION"));

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<std::path::PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<std::path::PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            self.config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            self.config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Path of the configuration file in use
    pub fn config_file_path(&self) -> CliResult<std::path::PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Config::config_path()?),
        }
    }

    /// Create a client from profile credentials with environment variable override support
    ///
    /// When --config-file is given, environment variables are ignored entirely.
    pub fn create_client(&self, profile_name: Option<&str>) -> CliResult<DbtCloudClient> {
        debug!("Creating dbt Cloud client");
        trace!("Profile name: {:?}", profile_name);

        let use_env_vars = self.config_path.is_none();
        if !use_env_vars {
            info!("--config-file specified explicitly, ignoring environment variables");
        }

        let env = |name: &str| {
            if use_env_vars {
                std::env::var(name).ok()
            } else {
                None
            }
        };
        let env_account_id = env(ENV_ACCOUNT_ID);
        let env_token = env(ENV_TOKEN);
        let env_host_url = env(ENV_HOST_URL);

        let (account_id, token, host_url) = if let (Some(raw_id), Some(token)) =
            (&env_account_id, &env_token)
            && profile_name.is_none()
        {
            info!("Using dbt Cloud credentials from environment variables");
            let host_url = env_host_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            (parse_account_id(raw_id)?, token.clone(), host_url)
        } else {
            let resolved_name = self.config.resolve_profile(profile_name)?;
            info!("Using dbt Cloud profile: {}", resolved_name);

            let profile = self.config.profile(&resolved_name)?;
            let resolved = if use_env_vars {
                profile.resolve_credentials()?
            } else {
                profile.resolve_stored_credentials()?
            };
            (resolved.account_id, resolved.token, resolved.host_url)
        };

        debug!("Account ID: {}, host URL: {}", account_id, host_url);

        DbtCloudClient::builder()
            .base_url(host_url)
            .account_id(account_id)
            .token(token)
            .user_agent(DBTCLOUDCTL_USER_AGENT)
            .build()
            .map_err(CtlError::from)
    }
}
