use std::{
    io,
    path::{Path, PathBuf},
    result,
};

use meld_shared::{itertools::Itertools, thiserror};

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No source directory found. Expected one of: {}", format_paths(.0))]
    SourceDirectoryNotFound(Vec<PathBuf>),
    #[error("No GLB/GLTF files found in {}", .0.display())]
    EmptyInput(PathBuf),
    #[error("Failed to import '{}': {message}", path.display())]
    Import { path: PathBuf, message: String },
    #[error(transparent)]
    Serialization(Box<dyn std::error::Error + Send + Sync>),
    #[error("IoError: {0}")]
    Io(#[from] io::Error),
    #[error("Verification of '{}' failed: {reason}", path.display())]
    Verification { path: PathBuf, reason: String },
    #[error("Invalid configuration '{}': {message}", path.display())]
    InvalidConfiguration { path: PathBuf, message: String },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|path| path.display()).join(", ")
}

/// Returns the lowercase extension of the path if there is one.
pub(crate) fn extract_extension_from_path(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_lowercase())
}

/// Returns the file name without extension. Falls back to the lossy file name.
pub(crate) fn extract_file_stem_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
