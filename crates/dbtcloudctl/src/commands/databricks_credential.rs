//! Databricks credential command implementations

use crate::cli::{DatabricksCredentialCommands, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::CtlError;
use crate::output;
use dbtcloud_core::{
    AdapterType, CreateDatabricksCredentialParams, DatabricksCredential,
    DatabricksCredentialHandler,
};
use tracing::{debug, info};

/// Handle Databricks credential commands
pub async fn handle_databricks_credential_command(
    cmd: &DatabricksCredentialCommands,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output_format: OutputFormat,
    query: Option<&str>,
) -> Result<(), CtlError> {
    let client = conn_mgr.create_client(profile_name)?;
    let handler = DatabricksCredentialHandler::new(client);

    match cmd {
        DatabricksCredentialCommands::Get {
            project_id,
            credential_id,
        } => {
            let credential = handler.get(*project_id, *credential_id).await?;
            log_missing_order_keys(&credential);
            output::print_credential(&credential, output_format, query)?;
        }
        DatabricksCredentialCommands::Create {
            project_id,
            adapter_id,
            token,
            catalog,
            schema,
            target_name,
            adapter_type,
            credential_type,
        } => {
            let params = CreateDatabricksCredentialParams {
                project_id: *project_id,
                credential_type: credential_type.clone(),
                target_name: target_name.clone(),
                adapter_id: *adapter_id,
                token: token.clone(),
                catalog: catalog.clone(),
                schema: schema.clone(),
                adapter_type: AdapterType::from(adapter_type.as_str()),
            };
            let credential = handler.create(&params).await?;
            info!("Created credential {:?}", credential.id);
            output::print_credential(&credential, output_format, query)?;
        }
        DatabricksCredentialCommands::Update {
            project_id,
            credential_id,
            data,
        } => {
            let credential = parse_credential_data(data)?;
            let updated = handler
                .update(*project_id, *credential_id, &credential)
                .await?;
            output::print_credential(&updated, output_format, query)?;
        }
        DatabricksCredentialCommands::Delete {
            project_id,
            credential_id,
        } => {
            handler.delete(*credential_id, *project_id).await?;
            match output_format {
                OutputFormat::Json | OutputFormat::Yaml => {
                    let output_data = serde_json::json!({
                        "deleted": true,
                        "project_id": project_id,
                        "credential_id": credential_id,
                    });
                    output::print_output(&output_data, output_format, query)?;
                }
                _ => println!(
                    "Credential {} deleted from project {}.",
                    credential_id, project_id
                ),
            }
        }
    }

    Ok(())
}

fn log_missing_order_keys(credential: &DatabricksCredential) {
    for key in credential.credential_details.missing_order_keys() {
        debug!("field_order lists '{}' but no such field was returned", key);
    }
}

/// Parse `--data` as inline JSON or `@path` to a JSON file
fn parse_credential_data(data: &str) -> Result<DatabricksCredential, CtlError> {
    if let Some(file_path) = data.strip_prefix('@') {
        let content = std::fs::read_to_string(file_path).map_err(|e| CtlError::InvalidInput {
            message: format!("Failed to read file {}: {}", file_path, e),
        })?;
        serde_json::from_str(&content).map_err(|e| CtlError::InvalidInput {
            message: format!("Failed to parse credential from file {}: {}", file_path, e),
        })
    } else {
        serde_json::from_str(data).map_err(|e| CtlError::InvalidInput {
            message: format!("Failed to parse credential from --data: {}", e),
        })
    }
}
