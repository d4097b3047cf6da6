//! Atomic JSON file writes shared by the settings and bookmark stores.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::core::errors::{MeroError, Result};

/// Atomic save: serialize → temp file → fsync → rename.
///
/// Creates parent directories as needed. Readers never observe a partial
/// write.
pub fn write_json_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| MeroError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(value)?;

    // Temp file in the same directory so the rename stays on one filesystem.
    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path).map_err(|e| MeroError::io(&tmp_path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| MeroError::io(&tmp_path, e))?;
        file.sync_all().map_err(|e| MeroError::io(&tmp_path, e))?;
    }

    fs::rename(&tmp_path, path).map_err(|e| MeroError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("settings.json");
        write_json_atomic(&json!({"a": 1}), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn no_tmp_leftover() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write_json_atomic(&json!({"a": 1}), &path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        let back: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["a"], 1);
    }
}
