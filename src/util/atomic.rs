use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Writes `contents` to `path` through a temporary sibling file that is
/// synced and then renamed over the destination. Missing parent
/// directories are created.
///
/// On failure the temporary file is removed and `path` keeps its previous
/// contents.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    // SEC-009: Randomized temp filename to prevent TOCTOU race conditions
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", suffix));

    let result = (|| {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);

        // On Windows, rename fails if the destination exists
        #[cfg(windows)]
        if path.is_file() {
            std::fs::remove_file(path)?;
        }

        std::fs::rename(&temp_path, path)
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&temp_path);
        tracing::warn!(path = %path.display(), error = %e, "Atomic write failed");
        return Err(e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_and_replaces() {
        let dir = std::env::temp_dir().join("feedkit_atomic_test_replace");
        let path = dir.join("nested").join("feed.xml");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_directory_destination_fails_cleanly() {
        let dir = std::env::temp_dir().join("feedkit_atomic_test_dir_target");
        std::fs::create_dir_all(dir.join("feed.xml")).unwrap();

        assert!(write_atomic(&dir.join("feed.xml"), b"data").is_err());
        let leftovers = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
