//! Feed registry: the newline-delimited active and quarantine lists.
//!
//! The registry is read once at run start and rewritten once at run end.
//! Persisting always works from a single computed partition of the original
//! active list, so every feed the run started with ends up in exactly one of
//! the two output files — no duplicates, no omissions, order preserved.
//!
//! Each file is written atomically (write-to-temp-then-rename). There is no
//! cross-file transactionality: a crash between the two writes leaves one
//! list stale, which the next run tolerates.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading or persisting feed lists.
///
/// `Read` and `Empty` are fatal to the run — with no feed sources there is
/// nothing to process.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The active-feeds file is missing or unreadable.
    #[error("Failed to read feeds file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The active-feeds file contains no URLs after blank-line filtering.
    #[error("No feed URLs found in '{}'", .0.display())]
    Empty(PathBuf),
    /// Writing one of the output lists failed.
    #[error("Failed to write feeds file '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loads the active feed list.
///
/// Lines are trimmed and blank lines dropped; order is preserved. A missing
/// or unreadable file, or a file with zero remaining URLs, is an error —
/// callers treat both as fatal.
pub fn load_active(path: &Path) -> Result<Vec<String>, RegistryError> {
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let feeds: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if feeds.is_empty() {
        return Err(RegistryError::Empty(path.to_path_buf()));
    }

    tracing::debug!(path = %path.display(), feeds = feeds.len(), "Loaded feed list");
    Ok(feeds)
}

/// Splits the original feed list into (active, quarantined), preserving the
/// original order within each half. Feeds named in `quarantined` but absent
/// from `feeds` are ignored — the partition is always of the original list.
pub fn partition(feeds: &[String], quarantined: &HashSet<String>) -> (Vec<String>, Vec<String>) {
    feeds
        .iter()
        .cloned()
        .partition(|url| !quarantined.contains(url))
}

/// Overwrites the active and quarantine files with a computed partition.
///
/// Both writes are individually atomic; see the module docs for the (lack
/// of) cross-file guarantee.
pub fn persist(
    feeds_path: &Path,
    removed_path: &Path,
    active: &[String],
    quarantined: &[String],
) -> Result<(), RegistryError> {
    write_list(feeds_path, active)?;
    write_list(removed_path, quarantined)?;
    tracing::info!(
        active = active.len(),
        quarantined = quarantined.len(),
        "Persisted feed registry"
    );
    Ok(())
}

fn write_list(path: &Path, urls: &[String]) -> Result<(), RegistryError> {
    let mut content = String::new();
    for url in urls {
        content.push_str(url);
        content.push('\n');
    }
    atomic_write(path, content.as_bytes()).map_err(|source| RegistryError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically write a file using the write-to-temp-then-rename pattern.
/// This ensures the destination is never left in a partial state.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Randomized temp filename so a concurrent writer cannot predict the
    // path and race our create.
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true) // Fails atomically if file exists (prevents symlink race)
        .open(&temp_path)?;

    if let Err(e) = temp_file
        .write_all(content)
        .and_then(|_| temp_file.sync_all())
    {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    // Drop the file handle before rename
    drop(temp_file);

    // Atomic rename (POSIX guarantees atomicity for rename on same filesystem)
    // On Windows, rename fails if destination exists, so remove it first
    #[cfg(windows)]
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(())
}
