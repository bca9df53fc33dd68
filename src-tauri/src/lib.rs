pub mod commands;
pub mod error;
pub mod import;
pub mod session;
pub mod state;
pub mod workspace;

use state::AppState;
use tauri::Manager;
use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let home = workspace::settings::workbench_home().expect("home dir must exist");

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(AppState::new(home))
        .setup(|app| {
            let state = app.state::<AppState>();
            for label in app.webview_windows().keys() {
                state.windows.register_window(label);
            }
            Ok(())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::Destroyed = event {
                window
                    .state::<AppState>()
                    .windows
                    .unregister_window(window.label());
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::import::import_files,
            commands::import::normalize_file_names,
            commands::import::detect_product_id,
            commands::workspace::get_settings,
            commands::workspace::save_settings,
            commands::workspace::select_folder,
            commands::workspace::scan_workspace,
            commands::workspace::create_category,
            commands::workspace::create_product,
            commands::workspace::read_notes,
            commands::workspace::write_notes,
            commands::workspace::list_directory,
            commands::workspace::create_folder,
            commands::workspace::rename_path,
            commands::workspace::delete_paths,
            commands::workspace::move_files,
            commands::workspace::open_path,
            commands::windows::open_window,
            commands::windows::list_windows,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| {
        if let tauri::RunEvent::ExitRequested { .. } = event {
            let state = app_handle.state::<AppState>();
            let windows = &state.windows;
            if !windows.is_quitting() {
                windows.begin_quit();
                tracing::info!("exit requested, open windows: {:?}", windows.list_windows());
            }
        }
    });
}
