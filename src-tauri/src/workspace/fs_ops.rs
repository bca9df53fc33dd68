use crate::error::{Result, WorkbenchError};
use crate::import::batch::{self, display_name, FailedFile, ImportResult};
use crate::import::naming;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A hung rename (stale network share) must not wedge the caller.
pub const RENAME_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInfo {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<String>,
    pub created: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<FailedFile>,
}

fn rfc3339(t: std::io::Result<SystemTime>) -> Option<String> {
    t.ok().map(|t| DateTime::<Utc>::from(t).to_rfc3339())
}

/// Reject empty names, `.`/`..`, and anything containing a path separator.
pub fn validate_name(name: &str) -> Result<()> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if bad {
        return Err(WorkbenchError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// List one directory level with per-entry stat. Hidden entries are
/// skipped; directories sort first, then names case-insensitively.
pub fn list_directory(path: &Path) -> Result<Vec<EntryInfo>> {
    if !path.is_dir() {
        return Err(WorkbenchError::FolderMissing(path.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("list_directory {:?}: {}", path, e);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let meta = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("list_directory: stat {:?}: {}", entry.path(), e);
                continue;
            }
        };
        entries.push(EntryInfo {
            name,
            path: entry.path().to_string_lossy().into_owned(),
            is_dir: meta.is_dir(),
            size: if meta.is_dir() { 0 } else { meta.len() },
            modified: rfc3339(meta.modified()),
            created: rfc3339(meta.created()),
        });
    }

    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    Ok(entries)
}

pub fn create_folder(parent: &Path, name: &str) -> Result<PathBuf> {
    validate_name(name)?;
    if !parent.is_dir() {
        return Err(WorkbenchError::FolderMissing(parent.to_path_buf()));
    }
    let dir = parent.join(name);
    if dir.exists() {
        return Err(WorkbenchError::AlreadyExists(name.to_string()));
    }
    fs::create_dir(&dir)?;
    Ok(dir)
}

fn rename_in_place(path: &Path, new_name: &str) -> Result<PathBuf> {
    validate_name(new_name)?;
    if !path.exists() {
        return Err(WorkbenchError::PathMissing(path.to_path_buf()));
    }
    let parent = path
        .parent()
        .ok_or_else(|| WorkbenchError::InvalidName(path.display().to_string()))?;
    let dest = parent.join(new_name);
    if dest == path {
        return Ok(dest);
    }
    if dest.exists() {
        return Err(WorkbenchError::AlreadyExists(new_name.to_string()));
    }
    batch::rename_no_clobber(path, &dest).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => WorkbenchError::AlreadyExists(new_name.to_string()),
        _ => WorkbenchError::Io(e),
    })?;
    Ok(dest)
}

/// Rename `path` to `new_name` inside its parent, giving up after `timeout`.
///
/// On timeout the blocking rename is abandoned, not cancelled: it may still
/// complete later.
pub async fn rename_path_with_timeout(
    path: PathBuf,
    new_name: String,
    timeout: Duration,
) -> Result<PathBuf> {
    let task = tokio::task::spawn_blocking(move || rename_in_place(&path, &new_name));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(WorkbenchError::TaskFailed(join_err.to_string())),
        Err(_) => {
            tracing::warn!("rename_path: timed out after {:?}", timeout);
            Err(WorkbenchError::Timeout(timeout))
        }
    }
}

pub async fn rename_path(path: PathBuf, new_name: String) -> Result<PathBuf> {
    rename_path_with_timeout(path, new_name, RENAME_TIMEOUT).await
}

pub fn delete_paths(paths: &[PathBuf]) -> DeleteReport {
    let mut report = DeleteReport::default();
    for path in paths {
        let outcome = match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
            Ok(_) => fs::remove_file(path),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => report.deleted.push(path.to_string_lossy().into_owned()),
            Err(e) => {
                tracing::warn!("delete_paths: {:?}: {}", path, e);
                report.failed.push(FailedFile::new(path, e.to_string()));
            }
        }
    }
    report
}

/// True when `path` sits directly in `folder`. Resolves symlinks when both
/// exist, otherwise compares lexically.
fn is_in_folder(path: &Path, folder: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    match (fs::canonicalize(parent), fs::canonicalize(folder)) {
        (Ok(a), Ok(b)) => a == b,
        _ => parent.components().eq(folder.components()),
    }
}

/// Move sources into `dest_folder`, keeping their names unless taken (then
/// `1_name`, `2_name`, ...). Sources already in `dest_folder` are left alone
/// and reported under their current name. Never replaces an existing file;
/// falls back to copy + remove when a plain rename fails, e.g. across devices.
pub fn move_files(sources: &[PathBuf], dest_folder: &Path) -> Result<ImportResult> {
    if !dest_folder.is_dir() {
        return Err(WorkbenchError::FolderMissing(dest_folder.to_path_buf()));
    }

    let mut result = ImportResult::default();
    for source in sources {
        if !source.exists() {
            result
                .failed
                .push(FailedFile::new(source, batch::SOURCE_MISSING));
            continue;
        }
        if is_in_folder(source, dest_folder) {
            tracing::debug!("move_files: {:?} already in destination", source);
            result.success.push(display_name(source));
            continue;
        }
        let name = naming::dedupe_with_counter(dest_folder, &display_name(source));
        let dest = dest_folder.join(&name);

        let moved = batch::rename_no_clobber(source, &dest).or_else(|rename_err| {
            if rename_err.kind() == std::io::ErrorKind::AlreadyExists || !source.is_file() {
                return Err(rename_err);
            }
            tracing::debug!("move_files: rename failed ({}), copying", rename_err);
            batch::copy_no_clobber(source, &dest)?;
            fs::remove_file(source)
        });

        match moved {
            Ok(()) => result.success.push(name),
            Err(e) => {
                tracing::warn!("move_files: {:?}: {}", source, e);
                result.failed.push(FailedFile::new(source, e.to_string()));
            }
        }
    }
    Ok(result)
}
