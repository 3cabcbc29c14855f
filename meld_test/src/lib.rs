use std::{
    fs,
    path::{Path, PathBuf},
    sync::Once,
};

use meld_shared::{
    log::LevelFilter,
    serde_json::{self, json, Value},
};

pub use spectral;

/// Installs a logger that prints everything. Can be called from every test.
pub fn setup_logger() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        simple_logger::SimpleLogger::new()
            .with_level(LevelFilter::Trace)
            .init()
            .expect("failed to initialize the logger");
    });
}

/// Node of a geometry-less glTF document written by [`write_gltf_nodes`].
#[derive(Debug, Clone, Default)]
pub struct FixtureNode {
    pub name: Option<String>,
    pub children: Vec<usize>,
    pub translation: Option<[f32; 3]>,
    /// Quaternion in glTF order (x, y, z, w)
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub extras: Option<Value>,
}

impl FixtureNode {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: &[usize]) -> Self {
        self.children = children.to_vec();
        self
    }

    pub fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = Some(translation);
        self
    }

    pub fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_extras(mut self, extras: Value) -> Self {
        self.extras = Some(extras);
        self
    }

    fn to_json(&self) -> Value {
        let mut node = serde_json::Map::new();
        if let Some(name) = &self.name {
            node.insert("name".to_owned(), json!(name));
        }
        if !self.children.is_empty() {
            node.insert("children".to_owned(), json!(self.children));
        }
        if let Some(translation) = self.translation {
            node.insert("translation".to_owned(), json!(translation));
        }
        if let Some(rotation) = self.rotation {
            node.insert("rotation".to_owned(), json!(rotation));
        }
        if let Some(scale) = self.scale {
            node.insert("scale".to_owned(), json!(scale));
        }
        if let Some(extras) = &self.extras {
            node.insert("extras".to_owned(), extras.clone());
        }
        Value::Object(node)
    }
}

/// Writes a `.gltf` document without buffers that contains only the given nodes.
///
/// Every node that is not referenced as a child is a root node of the default scene.
pub fn write_gltf_nodes(path: impl AsRef<Path>, nodes: &[FixtureNode]) -> PathBuf {
    let referenced = nodes.iter().flat_map(|node| node.children.iter().copied()).collect::<Vec<_>>();
    let roots = (0..nodes.len()).filter(|index| !referenced.contains(index)).collect::<Vec<_>>();
    let document = json!({
        "asset": { "version": "2.0", "generator": "meld_test" },
        "scene": 0,
        "scenes": [ { "nodes": roots } ],
        "nodes": nodes.iter().map(FixtureNode::to_json).collect::<Vec<_>>(),
    });
    let path = path.as_ref().to_owned();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create the fixture directory");
    }
    let content = serde_json::to_string_pretty(&document).expect("failed to serialize the fixture");
    fs::write(&path, content).unwrap_or_else(|_| panic!("failed to write fixture \"{}\"", path.display()));
    path
}
