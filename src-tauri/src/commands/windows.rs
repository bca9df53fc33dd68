use crate::state::AppState;
use tauri::{State, WebviewUrl, WebviewWindowBuilder};

/// Open another workbench window. Async so window creation does not block
/// the main thread.
#[tauri::command]
pub async fn open_window(
    app_handle: tauri::AppHandle,
    state: State<'_, AppState>,
) -> Result<String, String> {
    let label = state.windows.next_label();
    WebviewWindowBuilder::new(&app_handle, &label, WebviewUrl::App("index.html".into()))
        .title("Temu Workbench")
        .inner_size(1280.0, 800.0)
        .build()
        .map_err(|e| e.to_string())?;
    state.windows.register_window(&label);
    Ok(label)
}

#[tauri::command]
pub fn list_windows(state: State<'_, AppState>) -> Vec<String> {
    state.windows.list_windows()
}
