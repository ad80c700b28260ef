use clap::Parser;
use dbtcloud_core::Config;
use tracing::{debug, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands, DatabricksCredentialCommands};
use connection::ConnectionManager;
use error::CtlError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        e.print_diagnostic();
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), CtlError> {
    // Load configuration from specified path or default location
    let (config, config_path) = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };
    let mut conn_mgr = ConnectionManager::with_config_path(config, config_path);

    execute_command(cli, &mut conn_mgr).await
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "dbtcloudctl=warn,dbtcloud_core=warn",
            1 => "dbtcloudctl=info,dbtcloud_core=info",
            2 => "dbtcloudctl=debug,dbtcloud_core=debug",
            _ => "dbtcloudctl=trace,dbtcloud_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &mut ConnectionManager) -> Result<(), CtlError> {
    trace!("Output format: {:?}, query: {:?}", cli.output, cli.query);
    info!("Command: {}", format_command(&cli.command));

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Profile(profile_cmd) => {
            commands::profile::handle_profile_command(profile_cmd, conn_mgr, cli.output)
        }
        Commands::DatabricksCredential(cmd) => {
            commands::databricks_credential::handle_databricks_credential_command(
                cmd,
                conn_mgr,
                cli.profile.as_deref(),
                cli.output,
                cli.query.as_deref(),
            )
            .await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => debug!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Describe a command for logging with secrets redacted
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name),
                Set { name, .. } => format!("profile set {} [token redacted]", name),
                Remove { name, .. } => format!("profile remove {}", name),
                Default { name } => format!("profile default {}", name),
            }
        }
        Commands::DatabricksCredential(cmd) => match cmd {
            DatabricksCredentialCommands::Get {
                project_id,
                credential_id,
            } => format!(
                "databricks-credential get --project-id {} --credential-id {}",
                project_id, credential_id
            ),
            DatabricksCredentialCommands::Create {
                project_id,
                adapter_type,
                ..
            } => format!(
                "databricks-credential create --project-id {} --adapter-type {} [token redacted]",
                project_id, adapter_type
            ),
            DatabricksCredentialCommands::Update {
                project_id,
                credential_id,
                ..
            } => format!(
                "databricks-credential update --project-id {} --credential-id {} [data redacted]",
                project_id, credential_id
            ),
            DatabricksCredentialCommands::Delete {
                project_id,
                credential_id,
            } => format!(
                "databricks-credential delete --project-id {} --credential-id {}",
                project_id, credential_id
            ),
        },
    }
}
