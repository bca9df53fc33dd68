use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

/// Open tabs and split-pane state, restored on the next launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabLayout {
    pub open_tabs: Vec<String>,
    pub active_tab: Option<String>,
    pub split_view: bool,
}

/// Persisted UI settings stored in ~/.temu-workbench/config.json
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub root_path: Option<String>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub tabs: TabLayout,
}

pub fn workbench_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("home dir must exist")?;
    Ok(home.join(".temu-workbench"))
}

pub fn read_settings(home: &Path) -> Result<Settings> {
    let path = home.join("config.json");
    if !path.exists() {
        return Ok(Settings::default());
    }
    let text = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
        tracing::warn!("read_settings: malformed {:?}: {}", path, e);
        Settings::default()
    }))
}

pub fn write_settings(home: &Path, settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(home)?;
    let tmp = home.join("config.json.tmp");
    std::fs::write(&tmp, serde_json::to_string_pretty(settings)?)?;
    std::fs::rename(&tmp, home.join("config.json"))?;
    Ok(())
}

/// Append `[timestamp] EVENT` to logs/operation.log. Best effort: a log that
/// cannot be written never fails the operation being logged.
pub fn append_operation_log(home: &Path, event: &str) {
    let logs = home.join("logs");
    if std::fs::create_dir_all(&logs).is_err() {
        return;
    }
    if let Ok(mut f) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(logs.join("operation.log"))
    {
        let now = chrono::Utc::now().to_rfc3339();
        let _ = writeln!(f, "[{}] {}", now, event);
    }
}
