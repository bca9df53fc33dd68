use crate::error::{Result, WorkbenchError};
use crate::workspace::fs_ops::validate_name;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const NOTES_FILE: &str = "notes.txt";

/// The standardized image subfolders every product folder carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageFolder {
    Reference,
    AiRaw,
    Processed,
    Final,
}

impl ImageFolder {
    pub const ALL: [ImageFolder; 4] = [
        ImageFolder::Reference,
        ImageFolder::AiRaw,
        ImageFolder::Processed,
        ImageFolder::Final,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            ImageFolder::Reference => "reference",
            ImageFolder::AiRaw => "ai-raw",
            ImageFolder::Processed => "processed",
            ImageFolder::Final => "final",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.dir_name() == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFolderSummary {
    pub kind: ImageFolder,
    pub path: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFolder {
    pub id: String,
    pub path: String,
    pub folders: Vec<ImageFolderSummary>,
    pub has_notes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFolder {
    pub name: String,
    pub path: String,
    pub products: Vec<ProductFolder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceTree {
    pub root: String,
    pub categories: Vec<CategoryFolder>,
}

fn visible_subdirs(dir: &Path) -> Vec<(String, PathBuf)> {
    let mut dirs: Vec<(String, PathBuf)> = fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
        .filter(|(name, _)| !name.starts_with('.'))
        .collect();
    dirs.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));
    dirs
}

/// Regular files under `dir`, recursively. Symlinks are not followed.
fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!("count_files {:?}: {}", dir, err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .count()
}

fn is_product_dir(dir: &Path) -> bool {
    ImageFolder::ALL
        .iter()
        .any(|f| dir.join(f.dir_name()).is_dir())
}

fn summarize_product(id: String, dir: &Path) -> ProductFolder {
    let folders = ImageFolder::ALL
        .iter()
        .map(|f| dir.join(f.dir_name()))
        .zip(ImageFolder::ALL)
        .filter(|(path, _)| path.is_dir())
        .map(|(path, kind)| ImageFolderSummary {
            kind,
            file_count: count_files(&path),
            path: path.to_string_lossy().into_owned(),
        })
        .collect();
    ProductFolder {
        id,
        path: dir.to_string_lossy().into_owned(),
        folders,
        has_notes: dir.join(NOTES_FILE).is_file(),
    }
}

/// Recognize `<root>/<category>/<product>/<image folder>` under `root`.
/// Directories under a category that hold no standardized subfolder are not
/// products and are left out.
pub fn scan_workspace(root: &Path) -> Result<WorkspaceTree> {
    if !root.is_dir() {
        return Err(WorkbenchError::FolderMissing(root.to_path_buf()));
    }

    let categories: Vec<CategoryFolder> = visible_subdirs(root)
        .into_iter()
        .map(|(name, path)| {
            let products = visible_subdirs(&path)
                .into_iter()
                .filter(|(_, p)| is_product_dir(p))
                .map(|(id, p)| summarize_product(id, &p))
                .collect();
            CategoryFolder {
                name,
                path: path.to_string_lossy().into_owned(),
                products,
            }
        })
        .collect();

    tracing::info!(
        "scan_workspace: root={:?} categories={} products={}",
        root,
        categories.len(),
        categories.iter().map(|c| c.products.len()).sum::<usize>()
    );

    Ok(WorkspaceTree {
        root: root.to_string_lossy().into_owned(),
        categories,
    })
}

pub fn create_category(root: &Path, name: &str) -> Result<PathBuf> {
    crate::workspace::fs_ops::create_folder(root, name)
}

/// Create a product folder with every standardized subfolder and an empty
/// notes file.
pub fn create_product(category_dir: &Path, product_id: &str) -> Result<ProductFolder> {
    validate_name(product_id)?;
    if !category_dir.is_dir() {
        return Err(WorkbenchError::FolderMissing(category_dir.to_path_buf()));
    }
    let dir = category_dir.join(product_id);
    if dir.exists() {
        return Err(WorkbenchError::AlreadyExists(product_id.to_string()));
    }
    for folder in ImageFolder::ALL {
        fs::create_dir_all(dir.join(folder.dir_name()))?;
    }
    fs::write(dir.join(NOTES_FILE), b"")?;
    Ok(summarize_product(product_id.to_string(), &dir))
}

pub fn read_notes(product_dir: &Path) -> Result<String> {
    let path = product_dir.join(NOTES_FILE);
    if !path.exists() {
        return Ok(String::new());
    }
    Ok(fs::read_to_string(path)?)
}

pub fn write_notes(product_dir: &Path, text: &str) -> Result<()> {
    if !product_dir.is_dir() {
        return Err(WorkbenchError::FolderMissing(product_dir.to_path_buf()));
    }
    let tmp = product_dir.join(format!("{}.tmp", NOTES_FILE));
    fs::write(&tmp, text)?;
    fs::rename(&tmp, product_dir.join(NOTES_FILE))?;
    Ok(())
}

/// Product id implied by a folder: the parent's name for a standardized
/// image folder, the folder's own name for a product folder.
pub fn product_id_for_folder(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy().into_owned();
    if ImageFolder::from_dir_name(&name).is_some() {
        return path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned());
    }
    if path.is_dir() && is_product_dir(path) {
        return Some(name);
    }
    None
}
