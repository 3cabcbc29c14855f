use std::{
    fs,
    path::{Path, PathBuf},
};

use meld_shared::{log::info, serde_yaml};
use serde::{Deserialize, Serialize};

use crate::{
    backend::ExportOptions,
    placeholder::{placeholders_enabled, placeholders_enabled_from_env},
    source::DEFAULT_SOURCE_CANDIDATES,
    Error, Result,
};

/// Output file relative to the project root.
pub const DEFAULT_OUTPUT: &str = "public/main.glb";

/// Everything a [`Pipeline`](crate::pipeline::Pipeline) run needs to know.
///
/// Relative paths are resolved against `project_root`. A config file may leave
/// out any field:
///
/// ```yaml
/// source_candidates: [assets/parts, public/parts]
/// output: public/ward.glb
/// placeholders: true
/// export:
///   y_up: false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub project_root: PathBuf,
    /// Searched in order, the first existing directory wins.
    pub source_candidates: Vec<PathBuf>,
    pub output: PathBuf,
    pub placeholders: bool,
    pub export: ExportOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl PipelineConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            source_candidates: DEFAULT_SOURCE_CANDIDATES.iter().map(PathBuf::from).collect(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            placeholders: false,
            export: ExportOptions::default(),
        }
    }

    /// Reads a YAML config file. A relative `project_root` is resolved against the directory of the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config: PipelineConfig = serde_yaml::from_str(&content).map_err(|err| Error::InvalidConfiguration {
            path: path.to_owned(),
            message: err.to_string(),
        })?;
        if config.project_root.is_relative() {
            let directory = path.parent().unwrap_or_else(|| Path::new(""));
            config.project_root = directory.join(&config.project_root);
        }
        info!("Loaded configuration from '{}'", path.display());
        Ok(config)
    }

    /// Enables the placeholders when the `PLACEHOLDERS` environment variable is `1`.
    pub fn with_env_overrides(mut self) -> Self {
        self.placeholders |= placeholders_enabled_from_env();
        self
    }

    /// The flag can only switch placeholders on, never off.
    pub fn with_placeholder_flag(mut self, value: Option<&str>) -> Self {
        self.placeholders |= placeholders_enabled(value);
        self
    }

    pub fn candidate_dirs(&self) -> Vec<PathBuf> {
        self.source_candidates
            .iter()
            .map(|candidate| self.project_root.join(candidate))
            .collect()
    }

    pub fn output_path(&self) -> PathBuf {
        self.project_root.join(&self.output)
    }
}
