use std::{
    io,
    path::{Path, PathBuf},
};

use meld_shared::{
    log::{info, trace},
    walkdir::WalkDir,
};

use crate::{common::extract_extension_from_path, Error, Result};

/// Directories, relative to the project root, that are searched for source assets in this order.
pub const DEFAULT_SOURCE_CANDIDATES: [&str; 3] = ["assets/parts", "assets/glb_parts", "public/parts"];

/// Lowercase file extensions of the accepted asset formats.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["glb", "gltf"];

/// Returns the first candidate that exists and is a directory.
pub fn find_source_dir(candidates: &[PathBuf]) -> Result<PathBuf> {
    for candidate in candidates {
        trace!("Checking source directory candidate '{}'", candidate.display());
        if candidate.is_dir() {
            info!("Using source directory '{}'", candidate.display());
            return Ok(candidate.clone());
        }
    }
    Err(Error::SourceDirectoryNotFound(candidates.to_vec()))
}

/// Returns the asset files directly inside `directory`, sorted by file name.
pub fn enumerate_source_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(directory).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();
        let accepted = extract_extension_from_path(path)
            .map_or(false, |extension| ACCEPTED_EXTENSIONS.contains(&extension.as_str()));
        if accepted && path.is_file() {
            trace!("Found source file '{}'", path.display());
            files.push(path.to_owned());
        }
    }
    if files.is_empty() {
        return Err(Error::EmptyInput(directory.to_owned()));
    }
    info!("Found {} source file(s) in '{}'", files.len(), directory.display());
    Ok(files)
}

/// Resolves the source directory and lists its asset files.
pub fn enumerate_sources(candidates: &[PathBuf]) -> Result<(PathBuf, Vec<PathBuf>)> {
    let directory = find_source_dir(candidates)?;
    let files = enumerate_source_files(&directory)?;
    Ok((directory, files))
}
