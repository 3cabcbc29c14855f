use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    scene_graph::{NodeHandle, SceneGraph},
    Result,
};

/// Properties the exported container must have.
///
/// There is no selection filter: the whole graph is always exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Write node metadata as custom properties (glTF `extras`).
    pub embed_extras: bool,
    /// Write the scene with Y pointing up. Otherwise Z points up.
    pub y_up: bool,
    /// Write meshes as static vertex data with all procedural effects applied.
    /// [`MeshData`](crate::mesh::MeshData) has no procedural state, so this always holds.
    pub apply_modifiers: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            embed_extras: true,
            y_up: true,
            apply_modifiers: true,
        }
    }
}

/// Loads one asset file into a [`SceneGraph`].
pub trait AssetImporter {
    /// Imports the file at `path` as a disjoint subtree and returns the handles of the created nodes.
    ///
    /// Top-level nodes of the file are inserted without parent.
    fn import(&mut self, path: &Path, scene_graph: &mut SceneGraph) -> Result<Vec<NodeHandle>>;
}

/// Writes a whole [`SceneGraph`] into one container file.
pub trait AssetExporter {
    fn export(&mut self, scene_graph: &SceneGraph, path: &Path, options: &ExportOptions) -> Result<()>;
}
