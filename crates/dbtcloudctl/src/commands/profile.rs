//! Profile management command implementations

use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::CtlError;
use crate::output;
use colored::Colorize;
use dbtcloud_core::{CredentialStore, Profile};
use std::io::{self, Write};
use tracing::{debug, info, trace};

/// Handle profile management commands
pub fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &mut ConnectionManager,
    output_format: OutputFormat,
) -> Result<(), CtlError> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set {
            name,
            account_id,
            token,
            host_url,
            use_keyring,
            default,
        } => handle_set(
            conn_mgr,
            name,
            *account_id,
            token,
            host_url,
            *use_keyring,
            *default,
        ),
        Remove { name, yes } => handle_remove(conn_mgr, name, *yes),
        Default { name } => handle_default(conn_mgr, name),
    }
}

/// Mask all but the last four characters of a token
fn mask_token(token: &str) -> String {
    if CredentialStore::is_keyring_reference(token) {
        return token.to_string();
    }
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> Result<(), CtlError> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());
    let default_name = conn_mgr.config.default_profile.as_deref();

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let config_path = conn_mgr
                .config_file_path()
                .ok()
                .map(|p| p.to_string_lossy().to_string());

            let profile_list: Vec<serde_json::Value> = profiles
                .iter()
                .map(|(name, profile)| {
                    serde_json::json!({
                        "name": name,
                        "account_id": profile.account_id,
                        "host_url": profile.host_url,
                        "uses_keyring": profile.uses_keyring(),
                        "is_default": default_name == Some(name.as_str()),
                    })
                })
                .collect();

            let output_data = serde_json::json!({
                "config_path": config_path,
                "profiles": profile_list,
                "count": profiles.len()
            });

            output::print_output(&output_data, output_format, None)?;
        }
        _ => {
            if let Ok(config_path) = conn_mgr.config_file_path() {
                println!("Configuration file: {}", config_path.display());
                println!();
            }

            if profiles.is_empty() {
                info!("No profiles configured");
                println!("No profiles configured.");
                println!("Use 'dbtcloudctl profile set' to create a profile.");
                return Ok(());
            }

            for (name, profile) in &profiles {
                if default_name == Some(name.as_str()) {
                    println!("{} {}", name.bold().cyan(), "(default)".green());
                } else {
                    println!("{}", name.bold().cyan());
                }
                println!("  {}  {}", "Account:".dimmed(), profile.account_id);
                println!("  {}      {}", "URL:".dimmed(), profile.host_url);
            }
        }
    }

    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> Result<(), CtlError> {
    let config_path = conn_mgr.config_file_path()?;

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let output_data = serde_json::json!({
                "config_path": config_path.to_string_lossy(),
                "exists": config_path.exists(),
            });
            output::print_output(&output_data, output_format, None)?;
        }
        _ => println!("{}", config_path.display()),
    }
    Ok(())
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: OutputFormat,
) -> Result<(), CtlError> {
    debug!("Showing profile: {}", name);
    let profile = conn_mgr.config.profile(name)?;
    let is_default = conn_mgr.config.default_profile.as_deref() == Some(name);

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let output_data = serde_json::json!({
                "name": name,
                "account_id": profile.account_id,
                "token": mask_token(&profile.token),
                "host_url": profile.host_url,
                "uses_keyring": profile.uses_keyring(),
                "is_default": is_default,
            });
            output::print_output(&output_data, output_format, None)?;
        }
        _ => {
            println!("Profile: {}", name.bold());
            println!("Account ID: {}", profile.account_id);
            println!("Token: {}", mask_token(&profile.token));
            println!("Host URL: {}", profile.host_url);
            if is_default {
                println!("Default: yes");
            }
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_set(
    conn_mgr: &mut ConnectionManager,
    name: &str,
    account_id: i64,
    token: &str,
    host_url: &str,
    use_keyring: bool,
    make_default: bool,
) -> Result<(), CtlError> {
    debug!("Setting profile: {}", name);

    if token.trim().is_empty() {
        return Err(CtlError::InvalidInput {
            message: "token must not be empty".to_string(),
        });
    }

    let stored_token = if use_keyring {
        store_in_keyring(name, token)?
    } else {
        token.to_string()
    };

    let mut profile = Profile::new(account_id, stored_token);
    profile.host_url = host_url.to_string();

    let is_new = !conn_mgr.config.profiles.contains_key(name);
    conn_mgr.config.set_profile(name.to_string(), profile);
    if make_default || conn_mgr.config.default_profile.is_none() {
        conn_mgr.config.default_profile = Some(name.to_string());
    }
    conn_mgr.save_config()?;

    if is_new {
        println!("Profile '{}' created successfully.", name);
    } else {
        println!("Profile '{}' updated successfully.", name);
    }
    if conn_mgr.config.default_profile.as_deref() == Some(name) {
        println!("Profile '{}' is the default profile.", name);
    }
    Ok(())
}

#[cfg(feature = "secure-storage")]
fn store_in_keyring(name: &str, token: &str) -> Result<String, CtlError> {
    let store = CredentialStore::keyring();
    let reference = store.store_credential(&format!("{}-token", name), token)?;
    info!(
        "Stored token for '{}' using {} storage",
        name,
        store.storage_backend()
    );
    Ok(reference)
}

#[cfg(not(feature = "secure-storage"))]
fn store_in_keyring(_name: &str, _token: &str) -> Result<String, CtlError> {
    Err(CtlError::InvalidInput {
        message: "--use-keyring requires dbtcloudctl built with the secure-storage feature"
            .to_string(),
    })
}

fn handle_remove(conn_mgr: &mut ConnectionManager, name: &str, yes: bool) -> Result<(), CtlError> {
    debug!("Removing profile: {}", name);

    let profile = conn_mgr.config.profile(name)?.clone();
    let was_default = conn_mgr.config.default_profile.as_deref() == Some(name);
    if was_default {
        println!("Warning: '{}' is the default profile.", name);
    }

    if !yes && !confirm(&format!("Are you sure you want to remove profile '{}'?", name))? {
        println!("Profile removal cancelled.");
        return Ok(());
    }

    conn_mgr.config.remove_profile(name);
    conn_mgr.save_config()?;

    if let Some(key) = CredentialStore::keyring_key(&profile.token) {
        if let Err(e) = CredentialStore::new().delete_credential(key) {
            debug!("Could not delete keyring entry '{}': {}", key, e);
        }
    }

    if was_default {
        println!("Default profile cleared.");
    }
    println!("Profile '{}' removed successfully.", name);
    Ok(())
}

fn handle_default(conn_mgr: &mut ConnectionManager, name: &str) -> Result<(), CtlError> {
    debug!("Setting default profile: {}", name);

    conn_mgr.config.profile(name)?;
    conn_mgr.config.default_profile = Some(name.to_string());
    conn_mgr.save_config()?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool, CtlError> {
    print!("{} (y/N): ", prompt);
    io::stdout().flush().map_err(io_error)?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).map_err(io_error)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

fn io_error(err: io::Error) -> CtlError {
    CtlError::InvalidInput {
        message: format!("failed to read confirmation: {}", err),
    }
}
