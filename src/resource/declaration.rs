//! Declarations
//!
//! The local, declarative view of a remote object. A declaration is built per
//! lookup, filled in by the projector, and only gets an `id` once the whole
//! read succeeded.

use super::registry::{FieldDef, FieldKind, ProtocolDef};
use super::resolver::LookupRequest;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Placeholder written over sensitive values in displayed output
pub const REDACTED: &str = "(sensitive)";

/// A typed field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl FieldValue {
    /// The value a field holds when the remote object does not set it
    pub fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::String => FieldValue::String(String::new()),
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::Int => FieldValue::Int(0),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// A nested block (`attributes`, `parameters`), one entry per recognized
/// field, in descriptor order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldBlock(IndexMap<String, FieldValue>);

impl FieldBlock {
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Replace non-empty values of sensitive string fields
    pub fn redact(&mut self, fields: &[FieldDef]) {
        for field in fields.iter().filter(|f| f.sensitive) {
            if let Some(FieldValue::String(value)) = self.0.get_mut(&field.name) {
                if !value.is_empty() {
                    *value = REDACTED.to_string();
                }
            }
        }
    }
}

/// Behaviour shared by every declaration kind
pub trait Declaration: Default {
    /// Start a declaration from the caller's addressing inputs
    fn from_request(request: &LookupRequest) -> Self;

    /// Identity; `None` until the read is committed
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: &str);
}

/// Declaration of a connection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectionDeclaration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub name: String,
    pub parent_identifier: String,
    pub protocol: String,
    pub active_connections: u64,
    pub attributes: FieldBlock,
    pub parameters: FieldBlock,
}

impl ConnectionDeclaration {
    /// Hide secrets before the declaration is displayed
    pub fn redact_sensitive(&mut self, protocol: &ProtocolDef) {
        self.parameters.redact(&protocol.parameters);
    }
}

impl Declaration for ConnectionDeclaration {
    fn from_request(request: &LookupRequest) -> Self {
        Self {
            identifier: request.identifier.clone(),
            path: request.path.clone(),
            ..Default::default()
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: &str) {
        self.id = Some(id.to_string());
    }
}

/// Declaration of a connection group
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectionGroupDeclaration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub name: String,
    pub parent_identifier: String,
    #[serde(rename = "type")]
    pub group_type: String,
    pub active_connections: u64,
    pub attributes: FieldBlock,
    pub member_connections: Vec<String>,
    pub member_groups: Vec<String>,
}

impl Declaration for ConnectionGroupDeclaration {
    fn from_request(request: &LookupRequest) -> Self {
        Self {
            identifier: request.identifier.clone(),
            path: request.path.clone(),
            ..Default::default()
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: &str) {
        self.id = Some(id.to_string());
    }
}
