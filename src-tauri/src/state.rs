use crate::import::locks::DirLocks;
use crate::session::WindowRegistry;
use std::path::PathBuf;

pub struct AppState {
    /// ~/.temu-workbench, or a temp dir in tests
    pub home: PathBuf,
    pub windows: WindowRegistry,
    pub dir_locks: DirLocks,
}

impl AppState {
    pub fn new(home: PathBuf) -> Self {
        Self {
            home,
            windows: WindowRegistry::default(),
            dir_locks: DirLocks::default(),
        }
    }
}
