//! Databricks credentials for dbt Cloud projects
//!
//! A credential binds a project to a Databricks (or Spark) warehouse: the
//! target name, thread count and a set of adapter-specific fields (token,
//! catalog, schema, threads) described by field metadata the dbt Cloud UI
//! uses for rendering and validation.
//!
//! All operations live on [`DatabricksCredentialHandler`]:
//!
//! | operation | request |
//! |---|---|
//! | [`get`](DatabricksCredentialHandler::get) | `GET  /v3/accounts/{a}/projects/{p}/credentials/{c}/?include_related=[adapter]` |
//! | [`create`](DatabricksCredentialHandler::create) | `POST /v3/accounts/{a}/projects/{p}/credentials/` |
//! | [`update`](DatabricksCredentialHandler::update) | `POST /v3/accounts/{a}/projects/{p}/credentials/{c}/` |
//! | [`delete`](DatabricksCredentialHandler::delete) | `DELETE /v3/accounts/{a}/projects/{p}/credentials/{c}/` |
//!
//! # Example
//!
//! ```rust,no_run
//! use dbtcloud_core::DbtCloudClient;
//! use dbtcloud_core::databricks_credential::{
//!     CreateDatabricksCredentialParams, DatabricksCredentialHandler,
//! };
//!
//! # async fn run() -> dbtcloud_core::Result<()> {
//! let client = DbtCloudClient::builder()
//!     .account_id(12345)
//!     .token("dbtc_xxx")
//!     .build()?;
//! let handler = DatabricksCredentialHandler::new(client);
//!
//! let params = CreateDatabricksCredentialParams {
//!     project_id: 678,
//!     credential_type: "adapter".to_string(),
//!     target_name: "default".to_string(),
//!     adapter_id: 910,
//!     token: "dapi-xxx".to_string(),
//!     catalog: "main".to_string(),
//!     schema: "analytics".to_string(),
//!     adapter_type: "databricks".into(),
//! };
//! let created = handler.create(&params).await?;
//! println!("created credential {:?}", created.id);
//! # Ok(())
//! # }
//! ```

use crate::client::DbtCloudClient;
use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Thread count sent on every newly created credential
pub const DEFAULT_CREDENTIAL_THREADS: i64 = 6;

/// Decode an explicit `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Status block of the `{data, status}` response envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub developer_message: String,
}

/// Envelope wrapping every v3 response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ResponseStatus,
}

pub type DatabricksCredentialResponse = ApiResponse<DatabricksCredential>;
pub type DatabricksCredentialListResponse = ApiResponse<Vec<DatabricksCredential>>;

/// Lifecycle state, integer-encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum CredentialState {
    Active,
    Deleted,
    /// A code this client does not know; kept verbatim
    Unknown(i32),
}

impl From<i32> for CredentialState {
    fn from(code: i32) -> Self {
        match code {
            1 => CredentialState::Active,
            2 => CredentialState::Deleted,
            other => CredentialState::Unknown(other),
        }
    }
}

impl From<CredentialState> for i32 {
    fn from(state: CredentialState) -> Self {
        match state {
            CredentialState::Active => 1,
            CredentialState::Deleted => 2,
            CredentialState::Unknown(code) => code,
        }
    }
}

/// Adapter family a credential is created for
///
/// Only `databricks` and `spark` select fields; anything else yields a
/// credential with no adapter fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterType {
    Databricks,
    Spark,
    Other(String),
}

impl AdapterType {
    pub fn as_str(&self) -> &str {
        match self {
            AdapterType::Databricks => "databricks",
            AdapterType::Spark => "spark",
            AdapterType::Other(s) => s,
        }
    }
}

impl From<&str> for AdapterType {
    fn from(value: &str) -> Self {
        match value {
            "databricks" => AdapterType::Databricks,
            "spark" => AdapterType::Spark,
            other => AdapterType::Other(other.to_string()),
        }
    }
}

impl From<String> for AdapterType {
    fn from(value: String) -> Self {
        AdapterType::from(value.as_str())
    }
}

impl fmt::Display for AdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field type tag from the field metadata
///
/// Tags other than `text` and `number` are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Number,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Other(tag) => tag,
        }
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => FieldType::Text,
            "number" => FieldType::Number,
            _ => FieldType::Other(tag),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value slot of a credential field
///
/// Text fields carry strings and the `threads` field carries a number. The
/// variant follows the JSON shape so a decoded field re-encodes identically;
/// arrays and objects land in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialValue {
    Number(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    #[default]
    Null,
    Other(serde_json::Value),
}

impl CredentialValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CredentialValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            CredentialValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for CredentialValue {
    fn from(value: &str) -> Self {
        CredentialValue::Text(value.to_string())
    }
}

impl From<String> for CredentialValue {
    fn from(value: String) -> Self {
        CredentialValue::Text(value)
    }
}

impl From<i64> for CredentialValue {
    fn from(value: i64) -> Self {
        CredentialValue::Number(value)
    }
}

impl fmt::Display for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialValue::Number(n) => write!(f, "{}", n),
            CredentialValue::Float(n) => write!(f, "{}", n),
            CredentialValue::Text(s) => f.write_str(s),
            CredentialValue::Bool(b) => write!(f, "{}", b),
            CredentialValue::Null => Ok(()),
            CredentialValue::Other(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
}

/// Rendering and validation metadata for a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialFieldMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub field_type: FieldType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub encrypt: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overrideable: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub validation: FieldValidation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialField {
    pub metadata: CredentialFieldMetadata,
    #[serde(default)]
    pub value: CredentialValue,
}

impl CredentialField {
    /// Optional field with the given metadata and value
    pub fn new(
        label: &str,
        description: &str,
        field_type: FieldType,
        encrypt: bool,
        value: CredentialValue,
    ) -> Self {
        Self {
            metadata: CredentialFieldMetadata {
                label: label.to_string(),
                description: description.to_string(),
                field_type,
                encrypt,
                overrideable: false,
                validation: FieldValidation { required: false },
            },
            value,
        }
    }

    fn token(token: &str) -> Self {
        Self::new(
            "Token",
            "Personalized user token.",
            FieldType::Text,
            true,
            token.into(),
        )
    }

    fn catalog(catalog: &str) -> Self {
        Self::new(
            "Catalog",
            "Catalog name if Unity Catalog is enabled in your Databricks workspace.  Only available in dbt version 1.1 and later.",
            FieldType::Text,
            false,
            catalog.into(),
        )
    }

    fn schema(schema: &str) -> Self {
        Self::new("Schema", "User schema.", FieldType::Text, false, schema.into())
    }

    fn threads(threads: i64) -> Self {
        Self::new(
            "Threads",
            "The number of threads to use for your jobs.",
            FieldType::Number,
            false,
            threads.into(),
        )
    }
}

/// Adapter fields keyed by name, plus the order the UI displays them in
///
/// Keys in `field_order` are not guaranteed to exist in `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: BTreeMap<String, CredentialField>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub field_order: Vec<String>,
}

impl CredentialDetails {
    /// Fields in display order: `field_order` first, then any remaining keys
    /// alphabetically. Order entries without a field are skipped.
    pub fn ordered_fields(&self) -> Vec<(&str, &CredentialField)> {
        let mut out: Vec<(&str, &CredentialField)> = Vec::with_capacity(self.fields.len());
        for name in &self.field_order {
            if let Some(field) = self.fields.get(name)
                && !out.iter().any(|(n, _)| *n == name.as_str())
            {
                out.push((name.as_str(), field));
            }
        }
        for (name, field) in &self.fields {
            if !self.field_order.contains(name) {
                out.push((name.as_str(), field));
            }
        }
        out
    }

    /// Entries of `field_order` that have no matching field
    pub fn missing_order_keys(&self) -> Vec<&str> {
        self.field_order
            .iter()
            .filter(|name| !self.fields.contains_key(*name))
            .map(String::as_str)
            .collect()
    }
}

/// Plain-text projection of the credential values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnencryptedCredentialDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub catalog: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub schema: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub threads: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// A Databricks credential attached to a dbt Cloud project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabricksCredential {
    /// Server-assigned; `None` until created
    pub id: Option<i64>,
    pub account_id: i64,
    pub project_id: i64,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub state: CredentialState,
    #[serde(default, deserialize_with = "null_as_default")]
    pub threads: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub adapter_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub credential_details: CredentialDetails,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unencrypted_credential_details: UnencryptedCredentialDetails,
}

/// Inputs for [`DatabricksCredentialHandler::create`]
#[derive(Debug, Clone)]
pub struct CreateDatabricksCredentialParams {
    pub project_id: i64,
    /// Credential type tag, e.g. `adapter`
    pub credential_type: String,
    pub target_name: String,
    pub adapter_id: i64,
    pub token: String,
    pub catalog: String,
    pub schema: String,
    pub adapter_type: AdapterType,
}

impl CreateDatabricksCredentialParams {
    /// Build the request body for `account_id`
    ///
    /// Databricks gets catalog, token and schema. Spark has no catalog and
    /// takes threads instead. Any other adapter type gets no fields at all.
    pub fn to_credential(&self, account_id: i64) -> DatabricksCredential {
        let mut fields = BTreeMap::new();

        match &self.adapter_type {
            AdapterType::Databricks => {
                fields.insert("catalog".to_string(), CredentialField::catalog(&self.catalog));
                fields.insert("token".to_string(), CredentialField::token(&self.token));
                fields.insert("schema".to_string(), CredentialField::schema(&self.schema));
            }
            AdapterType::Spark => {
                fields.insert("token".to_string(), CredentialField::token(&self.token));
                fields.insert("schema".to_string(), CredentialField::schema(&self.schema));
                fields.insert(
                    "threads".to_string(),
                    CredentialField::threads(DEFAULT_CREDENTIAL_THREADS),
                );
            }
            AdapterType::Other(name) => {
                debug!("Adapter type '{}' selects no credential fields", name);
            }
        }

        DatabricksCredential {
            id: None,
            account_id,
            project_id: self.project_id,
            credential_type: self.credential_type.clone(),
            state: CredentialState::Active,
            threads: DEFAULT_CREDENTIAL_THREADS,
            target_name: self.target_name.clone(),
            adapter_id: self.adapter_id,
            credential_details: CredentialDetails {
                fields,
                field_order: Vec::new(),
            },
            unencrypted_credential_details: UnencryptedCredentialDetails::default(),
        }
    }
}

/// CRUD operations for Databricks credentials
#[derive(Debug, Clone)]
pub struct DatabricksCredentialHandler {
    client: DbtCloudClient,
}

impl DatabricksCredentialHandler {
    pub fn new(client: DbtCloudClient) -> Self {
        Self { client }
    }

    fn collection_path(&self, project_id: i64) -> String {
        self.client
            .account_path(&format!("projects/{}/credentials/", project_id))
    }

    fn resource_path(&self, project_id: i64, credential_id: i64) -> String {
        self.client.account_path(&format!(
            "projects/{}/credentials/{}/",
            project_id, credential_id
        ))
    }

    /// Fetch a credential together with its related adapter
    pub async fn get(&self, project_id: i64, credential_id: i64) -> Result<DatabricksCredential> {
        debug!(
            "Getting Databricks credential {} in project {}",
            credential_id, project_id
        );
        let body = self
            .client
            .get_bytes(
                &self.resource_path(project_id, credential_id),
                &[("include_related", "[adapter]")],
            )
            .await?;
        let response: DatabricksCredentialResponse = serde_json::from_slice(&body)?;
        Ok(response.data)
    }

    /// Create a credential; the returned value carries the server-assigned ID
    pub async fn create(
        &self,
        params: &CreateDatabricksCredentialParams,
    ) -> Result<DatabricksCredential> {
        debug!(
            "Creating {} credential in project {}",
            params.adapter_type, params.project_id
        );
        let request = params.to_credential(self.client.account_id());
        let body = self
            .client
            .post_json(&self.collection_path(params.project_id), &request)
            .await?;
        let response: DatabricksCredentialResponse = serde_json::from_slice(&body)?;
        Ok(response.data)
    }

    /// Replace a credential with `credential`, sent in full
    pub async fn update(
        &self,
        project_id: i64,
        credential_id: i64,
        credential: &DatabricksCredential,
    ) -> Result<DatabricksCredential> {
        debug!(
            "Updating Databricks credential {} in project {}",
            credential_id, project_id
        );
        let body = self
            .client
            .post_json(&self.resource_path(project_id, credential_id), credential)
            .await?;
        let response: DatabricksCredentialResponse = serde_json::from_slice(&body)?;
        Ok(response.data)
    }

    /// Delete a credential
    ///
    /// The returned string is always empty; the response body is ignored.
    pub async fn delete(&self, credential_id: i64, project_id: i64) -> Result<String> {
        debug!(
            "Deleting Databricks credential {} in project {}",
            credential_id, project_id
        );
        self.client
            .delete(&self.resource_path(project_id, credential_id))
            .await?;
        Ok(String::new())
    }
}
