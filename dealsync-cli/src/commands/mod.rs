pub mod classify;
pub mod mapping;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};

use dealsync_core::Deal;

/// Read a deal snapshot from a JSON file.
pub(crate) fn read_deal(path: &Path) -> Result<Deal> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read deal snapshot {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("malformed deal snapshot {}", path.display()))
}
