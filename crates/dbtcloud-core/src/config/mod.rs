//! Configuration and profile management for dbtcloudctl
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! Profiles hold the three things a [`DbtCloudClient`](crate::DbtCloudClient)
//! needs: account ID, API token and host URL.
//!
//! # Features
//!
//! - Multiple named profiles with an optional default
//! - Secure token storage using OS keyring (optional)
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

pub mod config;
pub mod credential;
pub mod error;

pub use config::{
    Config, ENV_ACCOUNT_ID, ENV_HOST_URL, ENV_TOKEN, Profile, ResolvedProfile, parse_account_id,
};
pub use credential::{CredentialStorage, CredentialStore};
pub use error::{ConfigError, Result};
