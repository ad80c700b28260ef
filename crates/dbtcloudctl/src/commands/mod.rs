pub mod databricks_credential;
pub mod profile;
