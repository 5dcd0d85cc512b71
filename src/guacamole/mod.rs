//! Guacamole API interaction module
//!
//! This module provides read access to the Apache Guacamole REST API.
//!
//! # Module Structure
//!
//! - [`client`] - Main client for reading connections and connection groups
//! - [`http`] - HTTP utilities for REST API calls
//! - [`path`] - Resolving `/group/.../name` paths against the connection tree
//! - [`types`] - REST payload types
//!
//! # Example
//!
//! ```ignore
//! use guacamole_provider::guacamole::client::{ClientConfig, GuacClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let config = ClientConfig::new("https://gw.example.com/guacamole", "mysql").with_token("...");
//!     let client = GuacClient::new(&config)?;
//!     let connection = client.read_connection_by_path("/ops/bastion").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod path;
pub mod types;
