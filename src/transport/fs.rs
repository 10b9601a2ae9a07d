use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::constants::catalog::DATASET_EXTENSIONS;
use crate::errors::ReaderError;
use crate::transport::Transport;

/// Filesystem transport resolving locations under a library root.
pub struct FsTransport {
    root: PathBuf,
}

impl FsTransport {
    /// Create a transport rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Library root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative location, rejecting absolute paths and `..` components.
    pub fn resolve(&self, location: &str) -> Result<PathBuf, ReaderError> {
        let relative = Path::new(location);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes || location.is_empty() {
            return Err(ReaderError::FetchFailure {
                display_name: location.to_string(),
                reason: "location must be relative to the library root".into(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl Transport for FsTransport {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn exists(&self, location: &str) -> Result<bool, ReaderError> {
        let path = self.resolve(location)?;
        match fs::metadata(&path) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ReaderError::FetchFailure {
                display_name: location.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    fn fetch_text(&self, location: &str) -> Result<String, ReaderError> {
        let path = self.resolve(location)?;
        fs::read_to_string(&path).map_err(|err| ReaderError::FetchFailure {
            display_name: location.to_string(),
            reason: if err.kind() == ErrorKind::NotFound {
                "file not found".to_string()
            } else {
                err.to_string()
            },
        })
    }
}

/// True if the path has a dataset extension (`.yaml`, `.yml`, `.json`; case-insensitive).
pub fn is_dataset_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| DATASET_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Dataset files directly inside `dir`, sorted by path. Missing directories yield nothing.
pub fn list_dataset_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_dataset_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Best-effort file size in bytes.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|metadata| metadata.len()).unwrap_or(0)
}
