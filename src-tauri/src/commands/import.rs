use crate::import::batch::{self, BatchImportRequest, ImportResult};
use crate::import::normalize::{self, NormalizeReport};
use crate::state::AppState;
use crate::workspace::{layout, settings};
use std::path::PathBuf;
use tauri::State;

#[tauri::command]
pub async fn import_files(
    files: Vec<String>,
    target_folder: String,
    product_id: Option<String>,
    state: State<'_, AppState>,
) -> Result<ImportResult, String> {
    tracing::info!(
        "IPC import_files: files={} target={} product_id={:?}",
        files.len(),
        target_folder,
        product_id
    );
    let request = BatchImportRequest {
        files: files.into_iter().map(PathBuf::from).collect(),
        target_folder: PathBuf::from(&target_folder),
        product_id,
    };

    // Serialize with any other import/normalize into the same folder.
    let _lease = state.dir_locks.acquire(&request.target_folder).await;

    let result = tokio::task::spawn_blocking(move || batch::import_batch(&request))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    settings::append_operation_log(
        &state.home,
        &format!(
            "IMPORT target={} ok={} failed={}",
            target_folder,
            result.success.len(),
            result.failed.len()
        ),
    );
    Ok(result)
}

#[tauri::command]
pub async fn normalize_file_names(
    folder_path: String,
    product_id: String,
    state: State<'_, AppState>,
) -> Result<NormalizeReport, String> {
    tracing::info!(
        "IPC normalize_file_names: folder={} product_id={}",
        folder_path,
        product_id
    );
    let folder = PathBuf::from(&folder_path);
    let _lease = state.dir_locks.acquire(&folder).await;

    let outcome = tokio::task::spawn_blocking(move || {
        normalize::normalize_existing_folder(&folder, &product_id)
    })
    .await
    .map_err(|e| e.to_string())?;

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!("normalize_file_names failed: {}", e);
            NormalizeReport::from_error(&e)
        }
    };

    if report.success {
        settings::append_operation_log(
            &state.home,
            &format!(
                "NORMALIZE folder={} renamed={} skipped={} failed={}",
                folder_path,
                report.renamed.len(),
                report.skipped.len(),
                report.failed.len()
            ),
        );
    }
    Ok(report)
}

/// Product id to pre-fill for an import into `path`, if the folder sits in
/// the standard layout.
#[tauri::command]
pub fn detect_product_id(path: String) -> Option<String> {
    layout::product_id_for_folder(std::path::Path::new(&path))
}
