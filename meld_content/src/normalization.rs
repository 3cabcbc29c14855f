use std::path::Path;

use meld_shared::log::{debug, info, trace, warn};

use crate::{
    backend::AssetImporter,
    bake::bake_transforms,
    common::extract_file_stem_from_path,
    scene_graph::{NodeHandle, SceneGraph},
    Result,
};

/// Replaces runs of non-alphanumeric characters in the file stem.
pub const PREFIX_REPLACEMENT: char = '_';

/// Joins the file prefix and the original node name.
pub const NAME_SEPARATOR: &str = "__";

/// Derives the node name prefix from the file stem.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use meld_content::normalization::name_prefix;
/// assert_eq!(name_prefix(Path::new("parts/ICU bed (v2).glb")), "ICU_bed_v2_");
/// ```
pub fn name_prefix(path: &Path) -> String {
    let stem = extract_file_stem_from_path(path);
    let mut prefix = String::with_capacity(stem.len());
    let mut in_run = false;
    for character in stem.chars() {
        if character.is_alphanumeric() {
            prefix.push(character);
            in_run = false;
        } else if !in_run {
            prefix.push(PREFIX_REPLACEMENT);
            in_run = true;
        }
    }
    prefix
}

/// Imports one asset file and normalizes the nodes it created.
///
/// Only nodes created by this import are touched: they are renamed to
/// `prefix + "__" + name`, parentless ones are attached to the root and
/// finally their transforms are baked. Returns the handles of the new nodes.
pub fn import_and_normalize(
    scene_graph: &mut SceneGraph,
    importer: &mut dyn AssetImporter,
    path: &Path,
) -> Result<Vec<NodeHandle>> {
    info!("Importing '{}'", path.display());
    let snapshot = scene_graph.snapshot();
    let reported = importer.import(path, scene_graph)?;
    let created = scene_graph.created_since(&snapshot);
    if reported.len() != created.len() {
        warn!(
            "Importer reported {} node(s) for '{}' but {} were created",
            reported.len(),
            path.display(),
            created.len()
        );
    }

    let prefix = name_prefix(path);
    let root = scene_graph.root();
    for handle in &created {
        let node = scene_graph.node(*handle);
        let (inserted_name, source_name) = (node.name().to_owned(), node.source_name().to_owned());
        let name = scene_graph.rename(*handle, &format!("{prefix}{NAME_SEPARATOR}{source_name}"));
        trace!("Renamed '{inserted_name}' to '{name}'");
        if scene_graph.node(*handle).parent().is_none() {
            debug!("Attaching '{}' to the root", scene_graph.node(*handle).name());
            scene_graph.set_parent(*handle, root);
        }
    }

    bake_transforms(scene_graph, &created);
    info!("Imported {} node(s) from '{}'", created.len(), path.display());
    Ok(created)
}
