//! Store saving operations.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::store::ProjectStore;
use crate::types::{CONTAINER_VERSION, MAGIC_BYTES};

/// Save a store to a .bis file.
///
/// Uses atomic write (temp file + rename) to prevent data corruption
/// on crash or power loss.
pub fn save_store(store: &mut ProjectStore, path: &Path) -> Result<()> {
    // Update the last saved timestamp
    store.touch();

    // Serialize the store
    let bytes = serialize_store(store)?;

    // Write to a temp file first, then rename for atomicity
    let temp_path = path.with_extension("bis.tmp");

    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    // Write to temp file
    let mut file = File::create(&temp_path).map_err(|e| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(&bytes).map_err(|e| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;

    file.sync_all().map_err(|e| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    // Atomic rename
    fs::rename(&temp_path, path).map_err(|e| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!("Saved project to {}", path.display());
    Ok(())
}

/// Save a store asynchronously.
///
/// Spawns the save operation on a blocking thread pool to avoid
/// blocking the async runtime.
pub async fn save_store_async(store: ProjectStore, path: std::path::PathBuf) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let mut store = store;
        save_store(&mut store, &path)
    })
    .await
    .map_err(|e| StoreError::Serialization {
        source: Box::new(e),
    })?
}

/// Serialize a store to bytes.
///
/// Format:
/// - 4 bytes: Magic ("BIS\x01")
/// - 4 bytes: Container version (u32 little-endian)
/// - N bytes: rkyv payload
fn serialize_store(store: &ProjectStore) -> Result<Vec<u8>> {
    let rkyv_bytes =
        rkyv::to_bytes::<rkyv::rancor::Error>(store).map_err(|e| StoreError::Serialization {
            source: Box::new(std::io::Error::other(format!(
                "rkyv serialization failed: {e}"
            ))),
        })?;

    let mut output = Vec::with_capacity(8 + rkyv_bytes.len());

    // Magic bytes
    output.extend_from_slice(&MAGIC_BYTES);

    // Container version (little-endian)
    output.extend_from_slice(&CONTAINER_VERSION.to_le_bytes());

    // rkyv payload
    output.extend_from_slice(&rkyv_bytes);

    Ok(output)
}
