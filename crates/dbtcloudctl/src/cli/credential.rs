//! Databricks credential command definitions

use clap::Subcommand;

/// Databricks credential commands
#[derive(Subcommand, Debug)]
pub enum DatabricksCredentialCommands {
    /// Fetch a credential
    #[command(visible_alias = "show")]
    Get {
        /// Project ID
        #[arg(long)]
        project_id: i64,

        /// Credential ID
        #[arg(long)]
        credential_id: i64,
    },

    /// Create a credential
    #[command(after_help = "EXAMPLES:
    # Databricks adapter (catalog, schema, token)
    dbtcloudctl databricks-credential create --project-id 100 --adapter-id 7 \\
        --token dapi123 --catalog main --schema analytics

    # Legacy Spark adapter (schema, token, threads)
    dbtcloudctl databricks-credential create --project-id 100 --adapter-id 7 \\
        --token dapi123 --schema analytics --adapter-type spark
")]
    Create {
        /// Project ID
        #[arg(long)]
        project_id: i64,

        /// Adapter ID
        #[arg(long)]
        adapter_id: i64,

        /// Databricks personal access token
        #[arg(long)]
        token: String,

        /// Unity catalog name
        #[arg(long, default_value = "")]
        catalog: String,

        /// Target schema
        #[arg(long)]
        schema: String,

        /// Target name
        #[arg(long, default_value = "default")]
        target_name: String,

        /// Adapter type (databricks or spark)
        #[arg(long, default_value = "databricks")]
        adapter_type: String,

        /// Credential type
        #[arg(long = "type", default_value = "adapter")]
        credential_type: String,
    },

    /// Replace a credential with the given object
    #[command(after_help = "EXAMPLES:
    # Fetch, edit, write back
    dbtcloudctl dbx get --project-id 100 --credential-id 200 > cred.json
    dbtcloudctl dbx update --project-id 100 --credential-id 200 --data @cred.json
")]
    Update {
        /// Project ID
        #[arg(long)]
        project_id: i64,

        /// Credential ID
        #[arg(long)]
        credential_id: i64,

        /// Full credential object (JSON string or @file)
        #[arg(long)]
        data: String,
    },

    /// Delete a credential
    #[command(visible_alias = "rm")]
    Delete {
        /// Project ID
        #[arg(long)]
        project_id: i64,

        /// Credential ID
        #[arg(long)]
        credential_id: i64,
    },
}
