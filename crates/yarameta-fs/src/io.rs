//! Atomic I/O operations and content-aware file synchronization

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so an interrupted run never leaves a
/// truncated rule file behind. When the target already exists its
/// permissions are carried over to the replacement.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let result = (|| {
        temp_file
            .lock_exclusive()
            .map_err(|_| Error::LockFailed {
                path: path.to_path_buf(),
            })?;

        temp_file
            .write_all(content)
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(&temp_path, metadata.permissions())
                .map_err(|e| Error::io(&temp_path, e))?;
        }

        temp_file.unlock().map_err(|_| Error::LockFailed {
            path: path.to_path_buf(),
        })?;

        fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Bring `path` in line with `content`, writing only when the bytes differ.
///
/// Returns `true` when the file was (re)written and `false` when it already
/// held exactly `content`. Skipping identical writes keeps mtimes stable for
/// tools that watch the rule corpus.
pub fn sync_text(path: &Path, content: &str) -> Result<bool> {
    match fs::read(path) {
        Ok(current) if current == content.as_bytes() => {
            tracing::debug!(path = %path.display(), "Content unchanged, skipping write");
            return Ok(false);
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(path, e)),
    }

    write_atomic(path, content.as_bytes())?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rule.yara");

        write_atomic(&path, b"rule a { condition: true }").unwrap();

        let entries: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["rule.yara".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rule.yara");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, b"new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }
}
