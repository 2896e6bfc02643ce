//! Purge command implementation

use crate::error::Result;
use crate::store::ChunkStore;
use serde::Serialize;
use tracing::info;

/// Outcome of a purge
#[derive(Debug, Clone, Serialize)]
pub struct PurgeResult {
    pub deleted_count: u64,
}

/// Delete every chunk from the store
pub async fn cmd_purge(store: &ChunkStore) -> Result<PurgeResult> {
    let deleted_count = store.purge_all().await?;
    info!("Purge removed {} chunks", deleted_count);
    Ok(PurgeResult { deleted_count })
}

/// Print purge outcome to console
pub fn print_purge_result(result: &PurgeResult) {
    println!("✓ Purged {} chunks", result.deleted_count);
}
