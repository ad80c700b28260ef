//! Error types for dbtcloudctl

use colored::Colorize;
use dbtcloud_core::{ConfigError, CoreError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'prod' not found
///
///   tip: list available profiles:
///       dbtcloudctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            tips: Vec::new(),
        }
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for dbtcloudctl
#[derive(Error, Debug)]
pub enum CtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'dbtcloudctl profile set' to configure a profile.")]
    NoProfileConfigured,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Unexpected API response: {message}")]
    DecodeError { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for dbtcloudctl operations
pub type Result<T> = std::result::Result<T, CtlError>;

impl CtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            CtlError::ProfileNotFound { name } => vec![
                "List available profiles: dbtcloudctl profile list".to_string(),
                format!(
                    "Create profile '{}': dbtcloudctl profile set {} --account-id <id> --token <token>",
                    name, name
                ),
            ],
            CtlError::NoProfileConfigured => vec![
                "Create a profile: dbtcloudctl profile set prod --account-id <id> --token <token>"
                    .to_string(),
                "Or export DBT_CLOUD_ACCOUNT_ID and DBT_CLOUD_TOKEN".to_string(),
            ],
            CtlError::AuthenticationFailed { .. } => vec![
                "Check your token: dbtcloudctl profile show <profile>".to_string(),
                "Make sure the token has access to the account and project".to_string(),
                "Ensure the host URL matches your dbt Cloud region".to_string(),
            ],
            CtlError::NotFound { .. } => vec![
                "Verify the project ID and credential ID".to_string(),
                "Check that you're using the correct profile".to_string(),
            ],
            CtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the host URL: dbtcloudctl profile show <profile>".to_string(),
            ],
            CtlError::DecodeError { .. } => vec![
                "Re-run with -vv to see the request that was sent".to_string(),
            ],
            CtlError::InvalidInput { .. } => vec![
                "Check the command syntax: dbtcloudctl <command> --help".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());
        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }
        diag.print();
    }
}

impl From<CoreError> for CtlError {
    fn from(err: CoreError) -> Self {
        if err.is_unauthorized() {
            return CtlError::AuthenticationFailed {
                message: err.to_string(),
            };
        }
        if err.is_not_found() {
            return CtlError::NotFound {
                message: err.to_string(),
            };
        }
        match err {
            CoreError::Transport(e) => CtlError::ConnectionError {
                message: e.to_string(),
            },
            CoreError::Decode(e) => CtlError::DecodeError {
                message: e.to_string(),
            },
            CoreError::Config(message) => CtlError::Configuration(message),
            api @ CoreError::Api { .. } => CtlError::ApiError {
                message: api.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => CtlError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => CtlError::NoProfileConfigured,
            other => CtlError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CtlError {
    fn from(err: serde_json::Error) -> Self {
        CtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<anyhow::Error> for CtlError {
    fn from(err: anyhow::Error) -> Self {
        CtlError::Configuration(format!("{:#}", err))
    }
}
