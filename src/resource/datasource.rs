//! Data Sources
//!
//! One read algorithm for every entity: resolve the address, fetch once,
//! project, then commit the identity only if no error was reported.

use super::declaration::{ConnectionDeclaration, ConnectionGroupDeclaration, Declaration};
use super::diagnostics::{Diagnostic, Diagnostics};
use super::fetcher::{fetch_connection_at, fetch_connection_group_at, RemoteFetcher};
use super::projector::{project_connection, project_connection_group};
use super::registry::{get_all_protocol_names, get_protocol, get_registry, ProtocolDef};
use super::resolver::{LookupAddress, LookupRequest};
use crate::guacamole::types::{Connection, ConnectionGroup};
use anyhow::{bail, Result};
use async_trait::async_trait;

/// Outcome of a read. `declaration` is present iff its identity was committed.
#[derive(Debug, Clone)]
pub struct ReadResult<D> {
    pub declaration: Option<D>,
    pub diagnostics: Diagnostics,
}

impl<D> ReadResult<D> {
    fn failed(diagnostics: Diagnostics) -> Self {
        Self {
            declaration: None,
            diagnostics,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.declaration.is_some()
    }
}

/// An entity that can be read through the generic algorithm
#[async_trait]
pub trait DataSource: Send + Sync {
    type Remote: Send + Sync;
    type Declaration: Declaration + Send;

    /// Entity name used in diagnostics and logs
    const ENTITY: &'static str;

    async fn fetch(&self, address: &LookupAddress) -> Result<Self::Remote>;

    fn project(&self, declaration: &mut Self::Declaration, remote: &Self::Remote) -> Diagnostics;

    fn identity<'r>(&self, remote: &'r Self::Remote) -> &'r str;
}

/// Resolve, fetch, project and commit
pub async fn read_data_source<S: DataSource>(
    source: &S,
    request: &LookupRequest,
) -> ReadResult<S::Declaration> {
    let mut diagnostics = Diagnostics::new();
    let mut declaration = S::Declaration::from_request(request);

    let address = match request.address() {
        Ok(address) => address,
        Err(e) => {
            tracing::warn!("Rejected {} lookup: {}", S::ENTITY, e);
            diagnostics.push(e.to_diagnostic());
            return ReadResult::failed(diagnostics);
        }
    };

    tracing::info!(
        "Reading {} by {} '{}'",
        S::ENTITY,
        address.kind(),
        address.as_str()
    );

    let remote = match source.fetch(&address).await {
        Ok(remote) => remote,
        Err(e) => {
            tracing::warn!("Failed to read {}: {:#}", S::ENTITY, e);
            diagnostics.push(Diagnostic::from_err(format!("Unable to read {}", S::ENTITY), &e));
            return ReadResult::failed(diagnostics);
        }
    };

    diagnostics.extend(source.project(&mut declaration, &remote));

    if diagnostics.has_error() {
        tracing::warn!(
            "Projection of {} '{}' failed with {} error(s)",
            S::ENTITY,
            source.identity(&remote),
            diagnostics.errors().count()
        );
        return ReadResult::failed(diagnostics);
    }

    declaration.set_id(source.identity(&remote));
    tracing::debug!("Committed {} '{}'", S::ENTITY, source.identity(&remote));

    ReadResult {
        declaration: Some(declaration),
        diagnostics,
    }
}

// =============================================================================
// Connections
// =============================================================================

/// Reads connections, optionally bound to one protocol variant
pub struct ConnectionDataSource<'a, F: RemoteFetcher + ?Sized> {
    fetcher: &'a F,
    protocol: Option<(&'static str, &'static ProtocolDef)>,
}

impl<'a, F: RemoteFetcher + ?Sized> ConnectionDataSource<'a, F> {
    /// Use whichever protocol the fetched connection reports
    pub fn new(fetcher: &'a F) -> Self {
        Self {
            fetcher,
            protocol: None,
        }
    }

    /// Bind to a protocol variant, e.g. `kubernetes`
    pub fn for_protocol(fetcher: &'a F, protocol: &str) -> Result<Self> {
        let Some((name, def)) = get_registry().protocols.get_key_value(protocol) else {
            bail!(
                "Unsupported protocol '{}'; expected one of: {}",
                protocol,
                get_all_protocol_names().join(", ")
            );
        };

        Ok(Self {
            fetcher,
            protocol: Some((name.as_str(), def)),
        })
    }

    /// Name of the bound protocol, if any
    pub fn protocol(&self) -> Option<&'static str> {
        self.protocol.map(|(name, _)| name)
    }

    pub async fn read(&self, request: &LookupRequest) -> ReadResult<ConnectionDeclaration> {
        read_data_source(self, request).await
    }
}

#[async_trait]
impl<'a, F: RemoteFetcher + ?Sized> DataSource for ConnectionDataSource<'a, F> {
    type Remote = Connection;
    type Declaration = ConnectionDeclaration;

    const ENTITY: &'static str = "connection";

    async fn fetch(&self, address: &LookupAddress) -> Result<Connection> {
        fetch_connection_at(self.fetcher, address).await
    }

    fn project(&self, declaration: &mut ConnectionDeclaration, remote: &Connection) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        let table = match self.protocol {
            Some((name, def)) => {
                if remote.protocol != name {
                    diagnostics.push(
                        Diagnostic::warning(
                            "Protocol mismatch",
                            format!(
                                "Connection '{}' uses protocol '{}'; projecting it as '{}'",
                                remote.identifier, remote.protocol, name
                            ),
                        )
                        .with_attribute("protocol"),
                    );
                }
                def
            }
            None => match get_protocol(&remote.protocol) {
                Some(def) => def,
                None => {
                    diagnostics.push(
                        Diagnostic::error(
                            "Unsupported protocol",
                            format!(
                                "Connection '{}' uses protocol '{}'; supported: {}",
                                remote.identifier,
                                remote.protocol,
                                get_all_protocol_names().join(", ")
                            ),
                        )
                        .with_attribute("protocol"),
                    );
                    return diagnostics;
                }
            },
        };

        diagnostics.extend(project_connection(declaration, remote, table));
        diagnostics
    }

    fn identity<'r>(&self, remote: &'r Connection) -> &'r str {
        &remote.identifier
    }
}

// =============================================================================
// Connection groups
// =============================================================================

/// Reads connection groups
pub struct ConnectionGroupDataSource<'a, F: RemoteFetcher + ?Sized> {
    fetcher: &'a F,
}

impl<'a, F: RemoteFetcher + ?Sized> ConnectionGroupDataSource<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    pub async fn read(&self, request: &LookupRequest) -> ReadResult<ConnectionGroupDeclaration> {
        read_data_source(self, request).await
    }
}

#[async_trait]
impl<'a, F: RemoteFetcher + ?Sized> DataSource for ConnectionGroupDataSource<'a, F> {
    type Remote = ConnectionGroup;
    type Declaration = ConnectionGroupDeclaration;

    const ENTITY: &'static str = "connection group";

    async fn fetch(&self, address: &LookupAddress) -> Result<ConnectionGroup> {
        fetch_connection_group_at(self.fetcher, address).await
    }

    fn project(&self, declaration: &mut ConnectionGroupDeclaration, remote: &ConnectionGroup) -> Diagnostics {
        project_connection_group(declaration, remote)
    }

    fn identity<'r>(&self, remote: &'r ConnectionGroup) -> &'r str {
        &remote.identifier
    }
}
