use meld_shared::log::{debug, info};

use crate::scene_graph::SceneGraph;

/// Name prefixes that mark a node as hotspot. Compared case-insensitively.
pub const HOTSPOT_PREFIXES: [&str; 3] = ["HS__", "HOTSPOT__", "hs__"];

/// Separator between the segments of a hotspot name.
pub const HOTSPOT_SEPARATOR: &str = "__";

pub const METADATA_TYPE_KEY: &str = "type";
pub const METADATA_HOTSPOT_ID_KEY: &str = "hotspotId";
pub const METADATA_LABEL_KEY: &str = "label";
pub const HOTSPOT_TYPE: &str = "hotspot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotspotMetadata {
    pub id: String,
    pub label: String,
}

/// Returns `true` when the name follows the hotspot naming convention.
pub fn is_hotspot_name(name: &str) -> bool {
    HOTSPOT_PREFIXES.iter().any(|prefix| {
        name.get(..prefix.len())
            .map_or(false, |start| start.eq_ignore_ascii_case(prefix))
    })
}

/// Parses a name like `HS__<id>__<label>`.
///
/// An empty id falls back to the full name and an empty or missing label
/// falls back to the id. Names that don't follow the convention yield `None`.
///
/// # Example
///
/// ```
/// use meld_content::hotspot::{parse_hotspot_name, HotspotMetadata};
/// let metadata = parse_hotspot_name("HS__BED01__Bed Light").unwrap();
/// assert_eq!(metadata, HotspotMetadata { id: "BED01".to_owned(), label: "Bed Light".to_owned() });
/// assert_eq!(parse_hotspot_name("PLAIN_NODE"), None);
/// ```
pub fn parse_hotspot_name(name: &str) -> Option<HotspotMetadata> {
    if !is_hotspot_name(name) {
        return None;
    }
    let parts = name.split(HOTSPOT_SEPARATOR).collect::<Vec<_>>();
    if parts.len() < 2 {
        return Some(HotspotMetadata {
            id: name.to_owned(),
            label: name.to_owned(),
        });
    }
    let id = match parts[1] {
        "" => name,
        id => id,
    };
    let label = match parts.get(2) {
        Some(label) if !label.is_empty() => *label,
        _ => id,
    };
    Some(HotspotMetadata {
        id: id.to_owned(),
        label: label.to_owned(),
    })
}

/// Tags every node whose name follows the hotspot convention and returns the number of tagged nodes.
pub fn extract_hotspots(scene_graph: &mut SceneGraph) -> usize {
    let mut count = 0;
    for handle in scene_graph.handles().collect::<Vec<_>>() {
        let node = scene_graph.node_mut(handle);
        let Some(hotspot) = parse_hotspot_name(node.name()) else {
            continue;
        };
        debug!("Hotspot '{}': id '{}', label '{}'", node.name(), hotspot.id, hotspot.label);
        node.metadata.insert(METADATA_TYPE_KEY.to_owned(), HOTSPOT_TYPE.to_owned());
        node.metadata.insert(METADATA_HOTSPOT_ID_KEY.to_owned(), hotspot.id);
        node.metadata.insert(METADATA_LABEL_KEY.to_owned(), hotspot.label);
        count += 1;
    }
    info!("Tagged {count} hotspot(s)");
    count
}
