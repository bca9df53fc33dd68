use crate::import::batch::ImportResult;
use crate::state::AppState;
use crate::workspace::fs_ops::{self, DeleteReport, EntryInfo};
use crate::workspace::layout::{self, ProductFolder, WorkspaceTree};
use crate::workspace::settings::{self, Settings};
use std::path::{Path, PathBuf};
use tauri::State;
use tauri_plugin_dialog::DialogExt;
use tauri_plugin_opener::OpenerExt;

// ── Settings ──────────────────────────────────────────────────────────────────

#[tauri::command]
pub fn get_settings(state: State<'_, AppState>) -> Result<Settings, String> {
    settings::read_settings(&state.home).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn save_settings(settings: Settings, state: State<'_, AppState>) -> Result<(), String> {
    settings::write_settings(&state.home, &settings).map_err(|e| e.to_string())?;
    settings::append_operation_log(
        &state.home,
        &format!("SETTINGS_SAVED root={:?}", settings.root_path),
    );
    Ok(())
}

/// Native folder picker. `None` when the user cancels.
#[tauri::command]
pub async fn select_folder(app_handle: tauri::AppHandle) -> Result<Option<String>, String> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    app_handle.dialog().file().pick_folder(move |picked| {
        let _ = tx.send(picked);
    });
    let picked = rx.await.map_err(|e| e.to_string())?;
    match picked {
        Some(path) => {
            let path = path.into_path().map_err(|e| e.to_string())?;
            Ok(Some(path.to_string_lossy().into_owned()))
        }
        None => Ok(None),
    }
}

// ── Workspace layout ──────────────────────────────────────────────────────────

#[tauri::command]
pub fn scan_workspace(root: String) -> Result<WorkspaceTree, String> {
    layout::scan_workspace(Path::new(&root)).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn create_category(
    root: String,
    name: String,
    state: State<'_, AppState>,
) -> Result<String, String> {
    let dir = layout::create_category(Path::new(&root), &name).map_err(|e| e.to_string())?;
    settings::append_operation_log(&state.home, &format!("CATEGORY_CREATED path={}", dir.display()));
    Ok(dir.to_string_lossy().into_owned())
}

#[tauri::command]
pub fn create_product(
    category_path: String,
    product_id: String,
    state: State<'_, AppState>,
) -> Result<ProductFolder, String> {
    let product =
        layout::create_product(Path::new(&category_path), &product_id).map_err(|e| e.to_string())?;
    settings::append_operation_log(&state.home, &format!("PRODUCT_CREATED path={}", product.path));
    Ok(product)
}

#[tauri::command]
pub fn read_notes(product_path: String) -> Result<String, String> {
    layout::read_notes(Path::new(&product_path)).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn write_notes(product_path: String, text: String) -> Result<(), String> {
    layout::write_notes(Path::new(&product_path), &text).map_err(|e| e.to_string())
}

// ── File operations ───────────────────────────────────────────────────────────

#[tauri::command]
pub fn list_directory(path: String) -> Result<Vec<EntryInfo>, String> {
    fs_ops::list_directory(Path::new(&path)).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn create_folder(parent: String, name: String) -> Result<String, String> {
    fs_ops::create_folder(Path::new(&parent), &name)
        .map(|p| p.to_string_lossy().into_owned())
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn rename_path(
    path: String,
    new_name: String,
    state: State<'_, AppState>,
) -> Result<String, String> {
    let dest = fs_ops::rename_path(PathBuf::from(&path), new_name)
        .await
        .map_err(|e| e.to_string())?;
    settings::append_operation_log(
        &state.home,
        &format!("RENAMED from={} to={}", path, dest.display()),
    );
    Ok(dest.to_string_lossy().into_owned())
}

#[tauri::command]
pub async fn delete_paths(
    paths: Vec<String>,
    state: State<'_, AppState>,
) -> Result<DeleteReport, String> {
    tracing::info!("IPC delete_paths: count={}", paths.len());
    let paths: Vec<PathBuf> = paths.into_iter().map(PathBuf::from).collect();
    let report = tokio::task::spawn_blocking(move || fs_ops::delete_paths(&paths))
        .await
        .map_err(|e| e.to_string())?;
    settings::append_operation_log(
        &state.home,
        &format!(
            "DELETED ok={} failed={}",
            report.deleted.len(),
            report.failed.len()
        ),
    );
    Ok(report)
}

#[tauri::command]
pub async fn move_files(
    sources: Vec<String>,
    dest_folder: String,
    state: State<'_, AppState>,
) -> Result<ImportResult, String> {
    tracing::info!(
        "IPC move_files: count={} dest={}",
        sources.len(),
        dest_folder
    );
    let sources: Vec<PathBuf> = sources.into_iter().map(PathBuf::from).collect();
    let dest = PathBuf::from(&dest_folder);

    // Counter de-dupe must not race an import or another move into the folder.
    let _lease = state.dir_locks.acquire(&dest).await;
    let result = tokio::task::spawn_blocking(move || fs_ops::move_files(&sources, &dest))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    settings::append_operation_log(
        &state.home,
        &format!(
            "MOVED dest={} ok={} failed={}",
            dest_folder,
            result.success.len(),
            result.failed.len()
        ),
    );
    Ok(result)
}

/// Preview: hand the file to the OS default application.
#[tauri::command]
pub fn open_path(path: String, app_handle: tauri::AppHandle) -> Result<(), String> {
    if !Path::new(&path).exists() {
        return Err(format!("Path does not exist: {}", path));
    }
    app_handle
        .opener()
        .open_path(path, None::<&str>)
        .map_err(|e| e.to_string())
}
