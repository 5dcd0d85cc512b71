//! Path resolution over the connection tree
//!
//! A path is the chain of group names from the root, followed by the name of
//! the object itself, joined by `/`. Leading/trailing slashes and empty
//! segments are ignored, so `/ops/bastion`, `ops/bastion` and `ops//bastion/`
//! are the same path.

use super::types::{Connection, ConnectionGroup};
use anyhow::{bail, Result};

/// Split a path into its non-empty segments
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Find the group named by `path`, starting at `root`. An empty path names the root.
pub fn find_group<'a>(root: &'a ConnectionGroup, path: &str) -> Result<&'a ConnectionGroup> {
    walk_groups(root, &split_path(path), path)
}

/// Find the connection named by `path`, starting at `root`
pub fn find_connection<'a>(root: &'a ConnectionGroup, path: &str) -> Result<&'a Connection> {
    let segments = split_path(path);
    let Some((name, groups)) = segments.split_last() else {
        bail!("Path '{}' does not name a connection", path);
    };

    let parent = walk_groups(root, groups, path)?;
    let mut matches = parent.child_connections.iter().filter(|c| c.name == *name);

    match (matches.next(), matches.next()) {
        (Some(connection), None) => Ok(connection),
        (Some(_), Some(_)) => bail!("Path '{}' is ambiguous: more than one connection named '{}'", path, name),
        (None, _) => bail!("No connection named '{}' at path '{}'", name, path),
    }
}

fn walk_groups<'a>(root: &'a ConnectionGroup, segments: &[&str], path: &str) -> Result<&'a ConnectionGroup> {
    let mut current = root;

    for segment in segments {
        let mut matches = current
            .child_connection_groups
            .iter()
            .filter(|g| g.name == *segment);

        current = match (matches.next(), matches.next()) {
            (Some(group), None) => group,
            (Some(_), Some(_)) => bail!(
                "Path '{}' is ambiguous: more than one group named '{}'",
                path,
                segment
            ),
            (None, _) => bail!("No connection group named '{}' in path '{}'", segment, path),
        };
    }

    Ok(current)
}
