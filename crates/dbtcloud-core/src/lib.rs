//! # dbtcloud-core
//!
//! Typed client for the dbt Cloud v3 API's Databricks credential resource,
//! plus the profile configuration shared by `dbtcloudctl`.
//!
//! - [`client`] - authenticated HTTP executor ([`DbtCloudClient`])
//! - [`databricks_credential`] - credential types and CRUD handler
//! - [`config`] - TOML profiles with env var and keyring resolution
//! - [`error`] - [`CoreError`]: transport vs. decode failures
//!
//! ```rust,no_run
//! use dbtcloud_core::{DatabricksCredentialHandler, DbtCloudClient};
//!
//! # async fn run() -> dbtcloud_core::Result<()> {
//! let client = DbtCloudClient::builder()
//!     .base_url("https://cloud.getdbt.com/api")
//!     .account_id(12345)
//!     .token("dbtc_xxx")
//!     .build()?;
//!
//! let credential = DatabricksCredentialHandler::new(client).get(678, 910).await?;
//! println!("{} -> adapter {}", credential.target_name, credential.adapter_id);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod databricks_credential;
pub mod error;

pub use client::{DEFAULT_BASE_URL, DbtCloudClient, DbtCloudClientBuilder};
pub use config::{Config, ConfigError, CredentialStore, Profile};
pub use databricks_credential::{
    AdapterType, CreateDatabricksCredentialParams, DatabricksCredential,
    DatabricksCredentialHandler,
};
pub use error::{CoreError, Result};
