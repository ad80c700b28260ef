//! CLI structure and command definitions

use clap::{Parser, Subcommand};

pub mod credential;

pub use credential::*;

/// dbt Cloud credential management CLI
#[derive(Parser, Debug)]
#[command(name = "dbtcloudctl")]
#[command(version, about = "Manage dbt Cloud project credentials")]
#[command(long_about = "
Manage dbt Cloud project credentials

EXAMPLES:
    # Set up a profile
    dbtcloudctl profile set prod --account-id 12345 --token dbtc_xxx

    # Fetch a Databricks credential
    dbtcloudctl databricks-credential get --project-id 100 --credential-id 200

    # Show it as a table
    dbtcloudctl dbx get --project-id 100 --credential-id 200 -o table

    # Pull a single value out with JMESPath
    dbtcloudctl dbx get --project-id 100 --credential-id 200 -q 'target_name'

For more help on a specific command, run:
    dbtcloudctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "DBTCLOUDCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "DBTCLOUDCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// JMESPath query to filter output
    #[arg(long, short = 'q', global = true)]
    pub query: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON unless a command prefers otherwise
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Human-readable table format
    Table,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Profile management
    #[command(subcommand, visible_alias = "prof")]
    #[command(after_help = "EXAMPLES:
    # Create a profile
    dbtcloudctl profile set prod --account-id 12345 --token dbtc_xxx

    # Create a profile for the EMEA region, token in the OS keyring
    dbtcloudctl profile set emea --account-id 9 --token dbtc_xxx \\
        --host-url https://emea.dbt.com/api --use-keyring

    # List all profiles
    dbtcloudctl profile list

    # Make a profile the default
    dbtcloudctl profile default prod
")]
    Profile(ProfileCommands),

    /// Databricks credential operations
    #[command(subcommand, visible_alias = "dbx")]
    DatabricksCredential(DatabricksCredentialCommands),
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add")]
    Set {
        /// Profile name
        name: String,

        /// dbt Cloud account ID
        #[arg(long)]
        account_id: i64,

        /// API token (service token or personal access token)
        #[arg(long)]
        token: String,

        /// API host URL
        #[arg(long, default_value = dbtcloud_core::DEFAULT_BASE_URL)]
        host_url: String,

        /// Store the token in the OS keyring instead of the config file
        #[arg(long)]
        use_keyring: bool,

        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm")]
    Remove {
        /// Profile name to remove
        name: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Set the default profile
    Default {
        /// Profile name
        name: String,
    },
}
