//! Lookup and attribute projection for Apache Guacamole objects
//!
//! Reads connections and connection groups from a Guacamole gateway and
//! projects them onto flat declarative state, collecting every problem as a
//! diagnostic instead of failing on the first one.

pub mod config;
pub mod guacamole;
pub mod resource;
