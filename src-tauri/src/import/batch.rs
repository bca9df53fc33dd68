use crate::error::{Result, WorkbenchError};
use crate::import::naming::{self, Clock, LocalClock, ProductNamer};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

pub const SOURCE_MISSING: &str = "Source file does not exist";
pub const SOURCE_NOT_A_FILE: &str = "Source is not a file";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchImportRequest {
    pub files: Vec<PathBuf>,
    pub target_folder: PathBuf,
    #[serde(default)]
    pub product_id: Option<String>,
}

impl BatchImportRequest {
    /// Product id used for canonical naming. Empty ids fall back to the
    /// plain de-duplication policy.
    pub fn effective_product_id(&self) -> Option<&str> {
        self.product_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub file: String,
    pub error: String,
}

impl FailedFile {
    pub fn new(path: &Path, error: impl Into<String>) -> Self {
        Self {
            file: display_name(path),
            error: error.into(),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: Vec<String>,
    pub failed: Vec<FailedFile>,
}

/// Basename for reports; falls back to the full path when there is none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn import_batch(request: &BatchImportRequest) -> Result<ImportResult> {
    import_batch_with(request, &LocalClock, &mut rand::thread_rng())
}

/// Copy every source into `target_folder` under a collision-free name.
///
/// Only failure to create the target folder aborts the call. Every other
/// problem is recorded against the file in `failed` and the loop moves on;
/// files already copied stay where they are.
pub fn import_batch_with<C: Clock, R: Rng>(
    request: &BatchImportRequest,
    clock: &C,
    rng: &mut R,
) -> Result<ImportResult> {
    let target = &request.target_folder;
    fs::create_dir_all(target).map_err(|source| WorkbenchError::CreateTarget {
        path: target.clone(),
        source,
    })?;

    let mut namer = request
        .effective_product_id()
        .map(|id| ProductNamer::new(id, clock, request.files.len() > 1));

    let mut result = ImportResult::default();

    for (i, source) in request.files.iter().enumerate() {
        let index = i + 1;

        if !source.exists() {
            tracing::warn!("import_batch: missing source {:?}", source);
            result.failed.push(FailedFile::new(source, SOURCE_MISSING));
            continue;
        }
        if !source.is_file() {
            result.failed.push(FailedFile::new(source, SOURCE_NOT_A_FILE));
            continue;
        }

        let dest_name = match namer.as_mut() {
            Some(namer) => namer.next_name(target, index, &naming::extension_of(source), rng),
            None => naming::dedupe_with_counter(target, &display_name(source)),
        };

        match copy_no_clobber(source, &target.join(&dest_name)) {
            Ok(()) => {
                tracing::debug!("import_batch: #{} {:?} -> {}", index, source, dest_name);
                result.success.push(dest_name);
            }
            Err(e) => {
                tracing::warn!("import_batch: copy {:?} failed: {}", source, e);
                result.failed.push(FailedFile::new(source, e.to_string()));
            }
        }
    }

    tracing::info!(
        "import_batch: target={:?} ok={} failed={}",
        target,
        result.success.len(),
        result.failed.len()
    );
    Ok(result)
}

/// Copy `src` to `dest`, failing with `AlreadyExists` instead of replacing
/// an existing file. A partially written destination is removed.
pub fn copy_no_clobber(src: &Path, dest: &Path) -> io::Result<()> {
    let mut reader = File::open(src)?;
    let mut writer = OpenOptions::new().write(true).create_new(true).open(dest)?;
    if let Err(e) = io::copy(&mut reader, &mut writer) {
        drop(writer);
        let _ = fs::remove_file(dest);
        return Err(e);
    }
    Ok(())
}

/// Rename `from` to `to`, failing with `AlreadyExists` instead of replacing
/// an existing file.
///
/// Uses a hard link so the check and the rename are one step. Where links are
/// unsupported (directories, FAT, some network shares) it falls back to an
/// existence check followed by a plain rename.
pub fn rename_no_clobber(from: &Path, to: &Path) -> io::Result<()> {
    match fs::hard_link(from, to) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(from) {
                let _ = fs::remove_file(to);
                return Err(e);
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
        Err(_) => {
            if to.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists", display_name(to)),
                ));
            }
            fs::rename(from, to)
        }
    }
}
