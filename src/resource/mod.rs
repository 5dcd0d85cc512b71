//! Resource lookup layer
//!
//! This module turns a declaration's addressing inputs into a fully
//! populated declaration of a remote Guacamole object, or into a list of
//! diagnostics explaining why it could not.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches field descriptors from embedded JSON
//! - [`resolver`] - Picks the identifier or path addressing strategy
//! - [`fetcher`] - The remote read operations, implemented by the Guacamole client
//! - [`projector`] - Copies remote attributes/parameters onto declaration fields
//! - [`diagnostics`] - Ordered error/warning collection
//! - [`datasource`] - The generic resolve/fetch/project/commit read
//!
//! # Field Descriptors
//!
//! Descriptors are defined in JSON files under `src/resources/`:
//! - `common.json` - Connection and connection group fields and attributes
//! - `kubernetes.json`, `rdp.json`, `ssh.json`, `telnet.json`, `vnc.json` -
//!   per-protocol connection parameters
//!
//! # Example
//!
//! ```ignore
//! use guacamole_provider::resource::{ConnectionDataSource, LookupRequest};
//!
//! async fn read(client: &GuacClient) -> anyhow::Result<()> {
//!     let source = ConnectionDataSource::for_protocol(client, "kubernetes")?;
//!     let result = source.read(&LookupRequest::by_path("/ops/bastion")).await;
//!     if result.diagnostics.has_error() { /* report */ }
//!     Ok(())
//! }
//! ```

pub mod datasource;
pub mod declaration;
pub mod diagnostics;
mod fetcher;
pub mod projector;
mod registry;
pub mod resolver;

pub use datasource::{
    read_data_source, ConnectionDataSource, ConnectionGroupDataSource, DataSource, ReadResult,
};
pub use declaration::{
    ConnectionDeclaration, ConnectionGroupDeclaration, Declaration, FieldBlock, FieldValue,
};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use fetcher::{fetch_connection_at, fetch_connection_group_at, RemoteFetcher};
pub use registry::*;
pub use resolver::{resolve, AddressError, LookupAddress, LookupRequest};
