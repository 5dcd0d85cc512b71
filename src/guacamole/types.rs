//! Guacamole REST payloads
//!
//! Shapes returned by `/api/session/data/{data_source}/...`. Attribute and
//! parameter values may be `null` on the wire; nulls are dropped on
//! deserialization so an absent key and a null value look the same.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Identifier of the root connection group
pub const ROOT_GROUP: &str = "ROOT";

/// A connection as returned by the REST API, with its parameters merged in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_identifier: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub active_connections: u64,
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub attributes: HashMap<String, String>,
    /// Not part of the connection payload; filled from `connections/{id}/parameters`
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub parameters: HashMap<String, String>,
}

/// A connection group, optionally with its children (tree endpoints)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionGroup {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_identifier: String,
    #[serde(default, rename = "type")]
    pub group_type: String,
    #[serde(default)]
    pub active_connections: u64,
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub child_connections: Vec<Connection>,
    #[serde(default)]
    pub child_connection_groups: Vec<ConnectionGroup>,
}

/// Error body returned by Guacamole on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

fn deserialize_string_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect())
}
