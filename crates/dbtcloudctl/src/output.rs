use anyhow::{Context, Result};
use comfy_table::Table;
use dbtcloud_core::DatabricksCredential;
use jpx_core::Runtime;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

use crate::cli::OutputFormat;

/// Shown in place of encrypted credential values
const MASKED_VALUE: &str = "********";

/// Global JMESPath runtime with extended functions
static JMESPATH_RUNTIME: OnceLock<Runtime> = OnceLock::new();

pub fn get_jmespath_runtime() -> &'static Runtime {
    JMESPATH_RUNTIME.get_or_init(|| Runtime::builder().with_all_extensions().build())
}

/// Apply an optional JMESPath query to `data`
pub fn apply_query<T: Serialize>(data: T, query: Option<&str>) -> Result<Value> {
    let json_value = serde_json::to_value(data)?;

    match query {
        Some(query_str) => {
            let expr = get_jmespath_runtime()
                .compile(query_str)
                .with_context(|| format!("Invalid JMESPath expression: {}", query_str))?;
            expr.search(&json_value).context("JMESPath query failed")
        }
        None => Ok(json_value),
    }
}

pub fn print_output<T: Serialize>(
    data: T,
    format: OutputFormat,
    query: Option<&str>,
) -> Result<()> {
    let json_value = apply_query(data, query)?;

    match format {
        OutputFormat::Auto | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json_value)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&json_value)?);
        }
        OutputFormat::Table => {
            println!("{}", render_table(&json_value));
        }
    }

    Ok(())
}

/// Print a credential; the table view lists its fields in display order
pub fn print_credential(
    credential: &DatabricksCredential,
    format: OutputFormat,
    query: Option<&str>,
) -> Result<()> {
    if format == OutputFormat::Table && query.is_none() {
        println!("{}", credential_table(credential));
        println!("{}", credential_fields_table(credential));
        return Ok(());
    }
    print_output(credential, format, query)
}

fn credential_table(credential: &DatabricksCredential) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Value"]);

    let id = credential
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    table.add_row(vec!["id".to_string(), id]);
    table.add_row(vec![
        "account_id".to_string(),
        credential.account_id.to_string(),
    ]);
    table.add_row(vec![
        "project_id".to_string(),
        credential.project_id.to_string(),
    ]);
    table.add_row(vec!["type".to_string(), credential.credential_type.clone()]);
    table.add_row(vec![
        "state".to_string(),
        format!("{:?}", credential.state).to_lowercase(),
    ]);
    table.add_row(vec!["threads".to_string(), credential.threads.to_string()]);
    table.add_row(vec![
        "target_name".to_string(),
        credential.target_name.clone(),
    ]);
    table.add_row(vec![
        "adapter_id".to_string(),
        credential.adapter_id.to_string(),
    ]);
    table
}

fn credential_fields_table(credential: &DatabricksCredential) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Label", "Type", "Value"]);

    for (name, field) in credential.credential_details.ordered_fields() {
        let value = if field.metadata.encrypt {
            MASKED_VALUE.to_string()
        } else {
            field.value.to_string()
        };
        table.add_row(vec![
            name.to_string(),
            field.metadata.label.clone(),
            field.metadata.field_type.to_string(),
            value,
        ]);
    }
    table
}

fn render_table(value: &Value) -> String {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            let mut table = Table::new();

            if let Value::Object(first) = &arr[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                table.set_header(&headers);

                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect();
                        table.add_row(row);
                    }
                }
            } else {
                table.set_header(vec!["Value"]);
                for item in arr {
                    table.add_row(vec![format_value(item)]);
                }
            }

            table.to_string()
        }
        Value::Object(obj) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);

            for (key, val) in obj {
                table.add_row(vec![key.clone(), format_value(val)]);
            }

            table.to_string()
        }
        _ => format_value(value),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credential() -> DatabricksCredential {
        serde_json::from_value(json!({
            "id": 7,
            "account_id": 1,
            "project_id": 2,
            "type": "adapter",
            "state": 1,
            "threads": 6,
            "target_name": "default",
            "adapter_id": 3,
            "credential_details": {
                "fields": {
                    "token": {
                        "metadata": {
                            "label": "Token",
                            "description": "Personalized user token.",
                            "field_type": "text",
                            "encrypt": true
                        },
                        "value": "dapi-secret"
                    },
                    "schema": {
                        "metadata": {
                            "label": "Schema",
                            "description": "User schema.",
                            "field_type": "text",
                            "encrypt": false
                        },
                        "value": "analytics"
                    }
                },
                "field_order": ["schema", "token"]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_query_selects_value() {
        let value = apply_query(credential(), Some("target_name")).unwrap();
        assert_eq!(value, json!("default"));
    }

    #[test]
    fn test_invalid_query_is_an_error() {
        assert!(apply_query(credential(), Some("[?")).is_err());
    }

    #[test]
    fn test_fields_table_masks_encrypted_values() {
        let rendered = credential_fields_table(&credential()).to_string();
        assert!(rendered.contains(MASKED_VALUE));
        assert!(!rendered.contains("dapi-secret"));
        assert!(rendered.contains("analytics"));

        let schema_at = rendered.find("Schema").unwrap();
        let token_at = rendered.find("Token").unwrap();
        assert!(schema_at < token_at, "fields should follow field_order");
    }

    #[test]
    fn test_fields_table_renders_unrecognized_shapes() {
        let mut credential = credential();
        let extra: dbtcloud_core::databricks_credential::CredentialField =
            serde_json::from_value(json!({
                "metadata": {"label": "SSO", "field_type": "select"},
                "value": true
            }))
            .unwrap();
        credential
            .credential_details
            .fields
            .insert("use_sso".to_string(), extra);

        let rendered = credential_fields_table(&credential).to_string();
        assert!(rendered.contains("select"));
        assert!(rendered.contains("true"));
        assert!(rendered.contains("SSO"));
    }

    #[test]
    fn test_credential_table_shows_state() {
        let rendered = credential_table(&credential()).to_string();
        assert!(rendered.contains("active"));
        assert!(rendered.contains("adapter_id"));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!(null)), "null");
        assert_eq!(format_value(&json!([1, 2])), "[2 items]");
        assert_eq!(format_value(&json!({"a": 1})), "{1 fields}");
    }
}
