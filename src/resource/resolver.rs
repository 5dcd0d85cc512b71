//! Lookup Resolver
//!
//! Decides how a declaration addresses its remote object: by identifier or
//! by path, never both and never neither. No remote call happens here.

use super::diagnostics::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a remote object lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupAddress {
    Identifier(String),
    Path(String),
}

impl LookupAddress {
    pub fn as_str(&self) -> &str {
        match self {
            LookupAddress::Identifier(id) => id,
            LookupAddress::Path(path) => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LookupAddress::Identifier(_) => "identifier",
            LookupAddress::Path(_) => "path",
        }
    }
}

/// Invalid addressing inputs, detected before any fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Either `identifier` or `path` must be specified")]
    MissingAddress,
    #[error("Either `identifier` or `path` must be specified but not both")]
    AmbiguousAddress,
}

impl AddressError {
    pub fn summary(&self) -> &'static str {
        match self {
            AddressError::MissingAddress => "Missing required parameter",
            AddressError::AmbiguousAddress => "Identifier and Path are mutually exclusive",
        }
    }

    pub fn to_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.summary(), self.to_string())
    }
}

/// Pick the single supplied address. Empty strings count as absent.
pub fn resolve(identifier: Option<&str>, path: Option<&str>) -> Result<LookupAddress, AddressError> {
    let identifier = identifier.filter(|s| !s.is_empty());
    let path = path.filter(|s| !s.is_empty());

    match (identifier, path) {
        (None, None) => Err(AddressError::MissingAddress),
        (Some(_), Some(_)) => Err(AddressError::AmbiguousAddress),
        (Some(id), None) => Ok(LookupAddress::Identifier(id.to_string())),
        (None, Some(path)) => Ok(LookupAddress::Path(path.to_string())),
    }
}

/// Addressing inputs of a declaration, as supplied by the schema runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl LookupRequest {
    pub fn new(identifier: Option<String>, path: Option<String>) -> Self {
        Self { identifier, path }
    }

    pub fn by_identifier(identifier: &str) -> Self {
        Self {
            identifier: Some(identifier.to_string()),
            path: None,
        }
    }

    pub fn by_path(path: &str) -> Self {
        Self {
            identifier: None,
            path: Some(path.to_string()),
        }
    }

    pub fn address(&self) -> Result<LookupAddress, AddressError> {
        resolve(self.identifier.as_deref(), self.path.as_deref())
    }
}
