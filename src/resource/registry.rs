//! Schema Registry - Load field descriptors from JSON
//!
//! This module loads the entity and protocol field descriptors from embedded
//! JSON files and provides lookup functions for the rest of the crate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded descriptor JSON files (compiled into the binary)
const SCHEMA_FILES: &[&str] = &[
    include_str!("../resources/common.json"),
    include_str!("../resources/kubernetes.json"),
    include_str!("../resources/rdp.json"),
    include_str!("../resources/ssh.json"),
    include_str!("../resources/telnet.json"),
    include_str!("../resources/vnc.json"),
];

/// Entity keys
pub const CONNECTION: &str = "connection";
pub const CONNECTION_GROUP: &str = "connection_group";

/// Value type of a declaration field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Bool,
    Int,
}

/// Who supplies a top-level field on a read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    Optional,
    #[default]
    Computed,
}

/// Whether a field holds one value or a list of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    Single,
    List,
}

/// Field definition from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    /// Key in the remote payload; defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub kind: FieldKind,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub mode: FieldMode,
    pub description: String,
    #[serde(default)]
    pub sensitive: bool,
}

impl FieldDef {
    pub fn remote_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
}

/// Entity definition from JSON (connection, connection group)
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDef {
    pub display_name: String,
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub attributes: Vec<FieldDef>,
}

/// Protocol variant definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolDef {
    pub display_name: String,
    pub parameters: Vec<FieldDef>,
}

impl ProtocolDef {
    pub fn parameter(&self, name: &str) -> Option<&FieldDef> {
        self.parameters.iter().find(|f| f.name == name)
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub entities: HashMap<String, EntityDef>,
    #[serde(default)]
    pub protocols: HashMap<String, ProtocolDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<SchemaConfig> = OnceLock::new();

/// Get the schema registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static SchemaConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = SchemaConfig::default();

        for content in SCHEMA_FILES {
            let partial: SchemaConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded schema JSON: {}", e));
            final_config.entities.extend(partial.entities);
            final_config.protocols.extend(partial.protocols);
        }

        final_config
    })
}

/// Get an entity definition by key
pub fn get_entity(key: &str) -> Option<&'static EntityDef> {
    get_registry().entities.get(key)
}

/// Get a protocol definition by name
pub fn get_protocol(name: &str) -> Option<&'static ProtocolDef> {
    get_registry().protocols.get(name)
}

/// Get all protocol names, sorted
pub fn get_all_protocol_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = get_registry()
        .protocols
        .keys()
        .map(|s| s.as_str())
        .collect();
    names.sort_unstable();
    names
}

/// Whether a parameter of the given protocol holds secret material
pub fn is_sensitive_parameter(protocol: &str, name: &str) -> bool {
    get_protocol(protocol)
        .and_then(|p| p.parameter(name))
        .map(|f| f.sensitive)
        .unwrap_or(false)
}
