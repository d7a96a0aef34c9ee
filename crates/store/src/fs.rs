//! Safe JSON document I/O.
//!
//! Documents are replaced atomically (temp file + rename) so a crashed save
//! never leaves a half-written set behind. A missing document reads as the
//! default (empty set); an unreadable or corrupt document is a storage
//! error, never silently treated as empty — defaulting there would erase the
//! project on the next save.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use planograph_core::error::CoreError;

/// Serialize `value` and atomically replace the document at `path`.
pub async fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| CoreError::Storage(format!("failed to serialize {}: {e}", path.display())))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| storage_error(parent, e))?;
    }

    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, &json)
        .await
        .map_err(|e| storage_error(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| storage_error(path, e))?;
    Ok(())
}

/// Read and deserialize the document at `path`, or its default if missing.
pub async fn read_json_or_default<T>(path: &Path) -> Result<T, CoreError>
where
    T: DeserializeOwned + Default,
{
    match read_json_opt(path).await? {
        Some(value) => Ok(value),
        None => Ok(T::default()),
    }
}

/// Read and deserialize the document at `path`, or `None` if missing.
pub async fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(storage_error(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| CoreError::Storage(format!("corrupt JSON document {}: {e}", path.display())))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn storage_error(path: &Path, err: std::io::Error) -> CoreError {
    CoreError::Storage(format!("{}: {err}", path.display()))
}
