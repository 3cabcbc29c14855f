use std::env;

use meld_shared::{
    log::{debug, info},
    nalgebra::Vector3,
    Transform,
};

use crate::{
    mesh::MeshData,
    scene_graph::{NodeDescription, NodeKind, SceneGraph},
};

/// Environment variable that enables the placeholder devices when set to `1`.
pub const PLACEHOLDERS_ENV_VAR: &str = "PLACEHOLDERS";

pub const PLACEHOLDER_PREFIX: &str = "PLACEHOLDER__";
pub const PLACEHOLDER_DEVICES: [&str; 3] = ["Monitor", "Ventilator", "Bed"];
pub const PLACEHOLDER_SIZE: f32 = 0.2;
pub const PLACEHOLDER_SPACING: f32 = 0.4;

/// Only the exact value `1` enables the placeholders.
pub fn placeholders_enabled(value: Option<&str>) -> bool {
    value == Some("1")
}

/// Reads [`PLACEHOLDERS_ENV_VAR`] from the environment.
pub fn placeholders_enabled_from_env() -> bool {
    placeholders_enabled(env::var(PLACEHOLDERS_ENV_VAR).ok().as_deref())
}

/// Adds one cube per placeholder device below the root, lined up along X.
///
/// Returns the number of inserted nodes, which is zero when `enabled` is false.
pub fn inject_placeholders(scene_graph: &mut SceneGraph, enabled: bool) -> usize {
    if !enabled {
        debug!("Placeholders are disabled");
        return 0;
    }
    let root = scene_graph.root();
    for (index, device) in PLACEHOLDER_DEVICES.iter().enumerate() {
        let translation = Vector3::new(index as f32 * PLACEHOLDER_SPACING, 0.0, 0.0);
        let description = NodeDescription::new(
            format!("{PLACEHOLDER_PREFIX}{device}"),
            NodeKind::Mesh(MeshData::cube(PLACEHOLDER_SIZE)),
        )
        .with_transform(Transform::from_translation(translation));
        let handle = scene_graph.insert_child(root, description);
        debug!("Inserted placeholder '{}'", scene_graph.node(handle).name());
    }
    info!("Inserted {} placeholder device(s)", PLACEHOLDER_DEVICES.len());
    PLACEHOLDER_DEVICES.len()
}
