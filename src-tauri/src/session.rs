use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Open windows and the app-level quitting flag.
///
/// Lives in `AppState` for the whole process: windows are registered when
/// created, unregistered on `Destroyed`, and `begin_quit` is set once on exit.
#[derive(Default)]
pub struct WindowRegistry {
    labels: Mutex<BTreeSet<String>>,
    quitting: AtomicBool,
    opened: AtomicUsize,
}

impl WindowRegistry {
    fn labels(&self) -> MutexGuard<'_, BTreeSet<String>> {
        match self.labels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Returns false if the label was already registered.
    pub fn register_window(&self, label: &str) -> bool {
        let inserted = self.labels().insert(label.to_string());
        if inserted {
            tracing::info!("window registered: {}", label);
        }
        inserted
    }

    /// Returns false if the label was not registered.
    pub fn unregister_window(&self, label: &str) -> bool {
        let removed = self.labels().remove(label);
        if removed {
            tracing::info!("window unregistered: {}", label);
        }
        removed
    }

    pub fn list_windows(&self) -> Vec<String> {
        self.labels().iter().cloned().collect()
    }

    /// Fresh label for a secondary window: `workbench-1`, `workbench-2`, ...
    pub fn next_label(&self) -> String {
        loop {
            let n = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
            let label = format!("workbench-{}", n);
            if !self.labels().contains(&label) {
                return label;
            }
        }
    }

    pub fn begin_quit(&self) {
        self.quitting.store(true, Ordering::SeqCst);
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::SeqCst)
    }
}
