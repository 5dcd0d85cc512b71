//! Remote Fetcher
//!
//! The read operations the lookup layer needs from the gateway. Errors are
//! opaque: not-found, unauthorized and transport failures all arrive as one
//! `anyhow::Error` and end the read.

use super::resolver::LookupAddress;
use crate::guacamole::client::GuacClient;
use crate::guacamole::types::{Connection, ConnectionGroup};
use anyhow::Result;
use async_trait::async_trait;

/// Source of canonical remote objects
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn fetch_connection(&self, identifier: &str) -> Result<Connection>;

    async fn fetch_connection_by_path(&self, path: &str) -> Result<Connection>;

    async fn fetch_connection_group(&self, identifier: &str) -> Result<ConnectionGroup>;

    async fn fetch_connection_group_by_path(&self, path: &str) -> Result<ConnectionGroup>;
}

#[async_trait]
impl RemoteFetcher for GuacClient {
    async fn fetch_connection(&self, identifier: &str) -> Result<Connection> {
        self.read_connection(identifier).await
    }

    async fn fetch_connection_by_path(&self, path: &str) -> Result<Connection> {
        self.read_connection_by_path(path).await
    }

    async fn fetch_connection_group(&self, identifier: &str) -> Result<ConnectionGroup> {
        self.read_connection_group(identifier).await
    }

    async fn fetch_connection_group_by_path(&self, path: &str) -> Result<ConnectionGroup> {
        self.read_connection_group_by_path(path).await
    }
}

/// Fetch a connection with the strategy the address selects
pub async fn fetch_connection_at<F>(fetcher: &F, address: &LookupAddress) -> Result<Connection>
where
    F: RemoteFetcher + ?Sized,
{
    match address {
        LookupAddress::Identifier(id) => fetcher.fetch_connection(id).await,
        LookupAddress::Path(path) => fetcher.fetch_connection_by_path(path).await,
    }
}

/// Fetch a connection group with the strategy the address selects
pub async fn fetch_connection_group_at<F>(fetcher: &F, address: &LookupAddress) -> Result<ConnectionGroup>
where
    F: RemoteFetcher + ?Sized,
{
    match address {
        LookupAddress::Identifier(id) => fetcher.fetch_connection_group(id).await,
        LookupAddress::Path(path) => fetcher.fetch_connection_group_by_path(path).await,
    }
}
