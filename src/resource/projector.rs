//! Attribute Projector
//!
//! Copies a fetched remote object onto a declaration, driven by the field
//! descriptors in the registry. The same block projection serves every entity
//! and every protocol variant.
//!
//! Rules:
//! - a recognized key present remotely is converted to the field's kind;
//! - a recognized key absent (or null) remotely leaves the zero value and is
//!   not reported;
//! - a remote key no descriptor recognizes is ignored.

use super::declaration::{ConnectionDeclaration, ConnectionGroupDeclaration, FieldBlock, FieldValue};
use super::diagnostics::{Diagnostic, Diagnostics};
use super::registry::{get_entity, FieldDef, FieldKind, ProtocolDef, CONNECTION, CONNECTION_GROUP};
use crate::guacamole::types::{Connection, ConnectionGroup};
use std::collections::HashMap;

/// Project one remote key/value mapping onto a block
pub fn project_fields(
    block: &str,
    fields: &[FieldDef],
    remote: &HashMap<String, String>,
    diagnostics: &mut Diagnostics,
) -> FieldBlock {
    let mut projected = FieldBlock::default();

    for field in fields {
        let value = match remote.get(field.remote_key()) {
            Some(raw) => convert(block, field, raw, diagnostics),
            None => FieldValue::zero(field.kind),
        };
        projected.insert(field.name.clone(), value);
    }

    for key in remote.keys() {
        if !fields.iter().any(|f| f.remote_key() == key) {
            tracing::trace!("Ignoring unrecognized {} key '{}'", block, key);
        }
    }

    projected
}

fn convert(block: &str, field: &FieldDef, raw: &str, diagnostics: &mut Diagnostics) -> FieldValue {
    match field.kind {
        FieldKind::String => FieldValue::String(raw.to_string()),
        FieldKind::Bool => {
            if raw.is_empty() || raw == "false" {
                FieldValue::Bool(false)
            } else if raw == "true" {
                FieldValue::Bool(true)
            } else {
                diagnostics.push(
                    Diagnostic::warning(
                        "Invalid boolean value",
                        format!(
                            "Remote key `{}` holds {:?}; expected \"true\" or \"false\"",
                            field.remote_key(),
                            raw
                        ),
                    )
                    .with_attribute(format!("{}.{}", block, field.name)),
                );
                FieldValue::Bool(false)
            }
        }
        FieldKind::Int => {
            if raw.is_empty() {
                return FieldValue::Int(0);
            }
            match raw.trim().parse::<i64>() {
                Ok(n) => FieldValue::Int(n),
                Err(_) => {
                    diagnostics.push(
                        Diagnostic::warning(
                            "Invalid integer value",
                            format!("Remote key `{}` holds {:?}", field.remote_key(), raw),
                        )
                        .with_attribute(format!("{}.{}", block, field.name)),
                    );
                    FieldValue::Int(0)
                }
            }
        }
    }
}

fn missing_schema(entity: &str) -> Diagnostic {
    Diagnostic::error(
        "Schema not registered",
        format!("No field descriptors are registered for `{}`", entity),
    )
}

/// Project a connection using the given protocol's parameter table
pub fn project_connection(
    declaration: &mut ConnectionDeclaration,
    connection: &Connection,
    protocol: &ProtocolDef,
) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    let Some(entity) = get_entity(CONNECTION) else {
        diagnostics.push(missing_schema(CONNECTION));
        return diagnostics;
    };

    declaration.name = connection.name.clone();
    declaration.parent_identifier = connection.parent_identifier.clone();
    declaration.protocol = connection.protocol.clone();
    declaration.active_connections = connection.active_connections;

    declaration.attributes = project_fields(
        "attributes",
        &entity.attributes,
        &connection.attributes,
        &mut diagnostics,
    );
    declaration.parameters = project_fields(
        "parameters",
        &protocol.parameters,
        &connection.parameters,
        &mut diagnostics,
    );

    diagnostics
}

/// Project a connection group, including its direct members
pub fn project_connection_group(
    declaration: &mut ConnectionGroupDeclaration,
    group: &ConnectionGroup,
) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    let Some(entity) = get_entity(CONNECTION_GROUP) else {
        diagnostics.push(missing_schema(CONNECTION_GROUP));
        return diagnostics;
    };

    declaration.name = group.name.clone();
    declaration.parent_identifier = group.parent_identifier.clone();
    declaration.group_type = group.group_type.clone();
    declaration.active_connections = group.active_connections;

    declaration.attributes = project_fields(
        "attributes",
        &entity.attributes,
        &group.attributes,
        &mut diagnostics,
    );

    declaration.member_connections = group
        .child_connections
        .iter()
        .map(|c| c.identifier.clone())
        .collect();
    declaration.member_groups = group
        .child_connection_groups
        .iter()
        .map(|g| g.identifier.clone())
        .collect();

    diagnostics
}
