//! Store loading operations.

use std::fs;
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::store::ProjectStore;
use crate::types::{CONTAINER_VERSION, MAGIC_BYTES};

/// Load a store from a .bis file.
pub fn load_store(path: &Path) -> Result<ProjectStore> {
    let bytes = fs::read(path).map_err(|e| StoreError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_store_bytes(&bytes, path)
}

/// Load a store asynchronously.
///
/// Spawns the load operation on a blocking thread pool to avoid
/// blocking the async runtime.
pub async fn load_store_async(path: std::path::PathBuf) -> Result<ProjectStore> {
    tokio::task::spawn_blocking(move || load_store(&path))
        .await
        .map_err(|e| StoreError::Deserialization {
            source: Box::new(e),
        })?
}

/// Parse store bytes and validate the container format.
fn parse_store_bytes(bytes: &[u8], path: &Path) -> Result<ProjectStore> {
    // Minimum size: magic (4) + version (4) + some payload
    if bytes.len() < 12 {
        return Err(StoreError::InvalidFormat {
            path: path.to_path_buf(),
            reason: "File too small".to_string(),
        });
    }

    // Check magic bytes
    if bytes[0..4] != MAGIC_BYTES {
        return Err(StoreError::InvalidFormat {
            path: path.to_path_buf(),
            reason: "Not a BIS project file (invalid magic bytes)".to_string(),
        });
    }

    // Read container version
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

    if version > CONTAINER_VERSION {
        return Err(StoreError::UnsupportedContainerVersion {
            found: version,
            max_supported: CONTAINER_VERSION,
            path: path.to_path_buf(),
        });
    }

    // Extract rkyv payload
    let payload = &bytes[8..];

    let store: ProjectStore = rkyv::from_bytes::<ProjectStore, rkyv::rancor::Error>(payload)
        .map_err(|e| StoreError::Deserialization {
            source: Box::new(std::io::Error::other(format!(
                "rkyv deserialization failed: {e}"
            ))),
        })?;

    tracing::info!("Loaded project from {}", path.display());
    Ok(store)
}
