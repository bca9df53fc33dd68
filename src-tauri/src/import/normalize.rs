use crate::error::{Result, WorkbenchError};
use crate::import::batch::{self, FailedFile};
use crate::import::naming::{self, Clock, LocalClock, ProductNamer};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamedFile {
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub success: bool,
    pub renamed: Vec<RenamedFile>,
    pub skipped: Vec<String>,
    pub failed: Vec<FailedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizeReport {
    fn started() -> Self {
        Self {
            success: true,
            renamed: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            error: None,
        }
    }

    /// Report for a call that could not start at all.
    pub fn from_error(err: &WorkbenchError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            ..Self::started()
        }
    }
}

pub fn normalize_existing_folder(folder: &Path, product_id: &str) -> Result<NormalizeReport> {
    normalize_existing_folder_with(folder, product_id, &LocalClock, &mut rand::thread_rng())
}

/// Rename the regular files in `folder` to canonical names for `product_id`.
///
/// Files that already carry a canonical name are skipped, which makes a
/// second run a no-op. Each renamed file reads the clock on its own; only
/// renamed files consume a sequence index. Dot-files (`.DS_Store` and the
/// like) are neither renamed nor reported.
///
/// A rename never replaces an existing file: if the resolved name is still
/// taken, the file lands in `failed` and stays where it was.
pub fn normalize_existing_folder_with<C: Clock, R: Rng>(
    folder: &Path,
    product_id: &str,
    clock: &C,
    rng: &mut R,
) -> Result<NormalizeReport> {
    if product_id.is_empty() {
        return Err(WorkbenchError::InvalidName(product_id.to_string()));
    }
    if !folder.is_dir() {
        return Err(WorkbenchError::FolderMissing(folder.to_path_buf()));
    }

    let pattern = naming::canonical_pattern(product_id)?;

    let mut names: Vec<String> = fs::read_dir(folder)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();

    let mut namer = ProductNamer::new(product_id, clock, false);
    let mut report = NormalizeReport::started();
    let mut batch_index = 0;

    for name in names {
        if naming::is_canonical(&name, &pattern) {
            report.skipped.push(name);
            continue;
        }

        batch_index += 1;
        let old_path = folder.join(&name);
        let ext = naming::extension_of(&old_path);
        let new_name = namer.next_name(folder, batch_index, &ext, rng);

        match batch::rename_no_clobber(&old_path, &folder.join(&new_name)) {
            Ok(()) => {
                tracing::debug!("normalize: {} -> {}", name, new_name);
                report.renamed.push(RenamedFile {
                    old_name: name,
                    new_name,
                });
            }
            Err(e) => {
                tracing::warn!("normalize: rename {} failed: {}", name, e);
                report.failed.push(FailedFile {
                    file: name,
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "normalize: folder={:?} renamed={} skipped={} failed={}",
        folder,
        report.renamed.len(),
        report.skipped.len(),
        report.failed.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::naming::FixedClock;
    use tempfile::TempDir;

    #[test]
    fn test_missing_folder_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = normalize_existing_folder(&tmp.path().join("gone"), "AD006").unwrap_err();
        assert!(matches!(err, WorkbenchError::FolderMissing(_)));
    }

    #[test]
    fn test_empty_product_id_rejected() {
        let tmp = TempDir::new().unwrap();
        let err = normalize_existing_folder(tmp.path(), "").unwrap_err();
        assert!(matches!(err, WorkbenchError::InvalidName(_)));
    }

    #[test]
    fn test_directories_and_hidden_files_untouched() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join(".DS_Store"), b"").unwrap();

        let clock = FixedClock::new_year_noon();
        let report =
            normalize_existing_folder_with(tmp.path(), "AD006", &clock, &mut rand::thread_rng())
                .unwrap();
        assert!(report.renamed.is_empty());
        assert!(report.skipped.is_empty());
        assert!(tmp.path().join("nested").is_dir());
        assert!(tmp.path().join(".DS_Store").exists());
    }

    #[test]
    fn test_report_from_error_serializes_error_field() {
        let report = NormalizeReport::from_error(&WorkbenchError::FolderMissing("/x".into()));
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "Folder does not exist: /x");
        assert_eq!(v["renamed"], serde_json::json!([]));
    }

    #[test]
    fn test_renamed_serializes_camel_case() {
        let r = RenamedFile {
            old_name: "a.png".into(),
            new_name: "b.png".into(),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["oldName"], "a.png");
        assert_eq!(v["newName"], "b.png");
    }
}
