use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    f32::consts::FRAC_PI_2,
    fs::{self, File},
    io::BufWriter,
    mem,
    path::Path,
};

use gltf::{
    binary::{Glb, Header},
    json::{
        self,
        accessor::{ComponentType, GenericComponentType, Type},
        buffer::Target,
        mesh::{Mode, Semantic},
        validation::{Checked::Valid, USize64},
        Index,
    },
};
use meld_shared::{
    log::{info, trace, warn},
    nalgebra::{UnitQuaternion, Vector3},
    serde_json, Transform, AABB,
};

use crate::{
    backend::{AssetExporter, ExportOptions},
    mesh::{Material, MeshData},
    scene_graph::{Node, NodeHandle, NodeKind, SceneGraph},
    Error, Result,
};

const GENERATOR: &str = concat!("meld ", env!("CARGO_PKG_VERSION"));

/// Writes the whole [`SceneGraph`] into one binary glTF (`.glb`) file.
#[derive(Debug, Default)]
pub struct GltfExporter;

impl AssetExporter for GltfExporter {
    fn export(&mut self, scene_graph: &SceneGraph, path: &Path, options: &ExportOptions) -> Result<()> {
        info!("Serializing {} node(s) to '{}'", scene_graph.len(), path.display());
        let glb = to_glb(scene_graph, options)?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        glb.to_writer(writer).map_err(|err| Error::Serialization(Box::new(err)))?;
        info!("Wrote '{}'", path.display());
        Ok(())
    }
}

/// Builds the binary glTF container for the graph.
pub fn to_glb(scene_graph: &SceneGraph, options: &ExportOptions) -> Result<Glb<'static>> {
    let (root, buffer) = DocumentBuilder::new(options).build(scene_graph)?;
    let mut json = serde_json::to_vec(&root).map_err(|err| Error::Serialization(Box::new(err)))?;
    pad_to_four(&mut json, b' ');
    let bin = if buffer.is_empty() { None } else { Some(buffer) };

    const CHUNK_HEADER_SIZE: usize = 8;
    let length = mem::size_of::<Header>()
        + CHUNK_HEADER_SIZE
        + json.len()
        + bin.as_ref().map_or(0, |bin| CHUNK_HEADER_SIZE + bin.len());
    let length =
        u32::try_from(length).map_err(|_| Error::Serialization("file size exceeds the binary glTF limit".into()))?;

    Ok(Glb {
        header: Header {
            magic: *b"glTF",
            version: 2,
            length,
        },
        json: Cow::Owned(json),
        bin: bin.map(Cow::Owned),
    })
}

fn pad_to_four(bytes: &mut Vec<u8>, padding: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(padding);
    }
}

struct DocumentBuilder<'o> {
    options: &'o ExportOptions,
    root: json::Root,
    buffer: Vec<u8>,
}

impl<'o> DocumentBuilder<'o> {
    fn new(options: &'o ExportOptions) -> Self {
        Self {
            options,
            root: json::Root {
                asset: json::Asset {
                    generator: Some(GENERATOR.to_owned()),
                    ..Default::default()
                },
                ..Default::default()
            },
            buffer: Vec::new(),
        }
    }

    fn build(mut self, scene_graph: &SceneGraph) -> Result<(json::Root, Vec<u8>)> {
        // Every parentless node becomes a scene root. After normalization that is only the root node,
        // which ends up at index 0 because the subtrees are written depth-first in handle order.
        let scene_roots = scene_graph.parentless();
        if scene_roots.len() > 1 {
            warn!("Writing {} node(s) without parent as additional scene roots", scene_roots.len() - 1);
        }
        let order = scene_roots
            .iter()
            .flat_map(|scene_root| scene_graph.depth_first(*scene_root))
            .collect::<Vec<_>>();
        let indices = order
            .iter()
            .enumerate()
            .map(|(index, handle)| (*handle, Index::new(index as u32)))
            .collect::<HashMap<NodeHandle, Index<json::Node>>>();

        for handle in &order {
            let node = scene_graph.node(*handle);
            let children = node.children().iter().map(|child| indices[child]).collect::<Vec<_>>();
            let mut transform = node.transform;
            if node.parent().is_none() && !self.options.y_up {
                let z_up = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2);
                transform.rotation = z_up * transform.rotation;
            }
            let json_node = self.node(node, &transform, children)?;
            self.root.nodes.push(json_node);
        }

        self.root.scenes.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some("Scene".to_owned()),
            nodes: scene_roots.iter().map(|scene_root| indices[scene_root]).collect(),
        });
        self.root.scene = Some(Index::new(0));

        if !self.buffer.is_empty() {
            pad_to_four(&mut self.buffer, 0);
            self.root.buffers.push(json::Buffer {
                byte_length: USize64::from(self.buffer.len()),
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                uri: None,
            });
        }

        trace!(
            "Document has {} node(s), {} mesh(es), {} accessor(s) and a {} byte buffer",
            self.root.nodes.len(),
            self.root.meshes.len(),
            self.root.accessors.len(),
            self.buffer.len()
        );
        Ok((self.root, self.buffer))
    }

    fn node(&mut self, node: &Node, transform: &Transform, children: Vec<Index<json::Node>>) -> Result<json::Node> {
        let mesh = match &node.kind {
            NodeKind::Mesh(mesh) if !mesh.primitives.is_empty() => Some(self.mesh(mesh)),
            _ => None,
        };
        let extras = if self.options.embed_extras && !node.metadata.is_empty() {
            Some(serde_json::value::to_raw_value(&node.metadata).map_err(|err| Error::Serialization(Box::new(err)))?)
        } else {
            None
        };

        let rotation = transform.rotation.coords;
        Ok(json::Node {
            camera: None,
            children: if children.is_empty() { None } else { Some(children) },
            extensions: Default::default(),
            extras,
            matrix: None,
            mesh,
            name: Some(node.name().to_owned()),
            rotation: (transform.rotation != UnitQuaternion::identity())
                .then(|| json::scene::UnitQuaternion([rotation.x, rotation.y, rotation.z, rotation.w])),
            scale: (transform.scale != Vector3::new(1.0, 1.0, 1.0)).then(|| transform.scale.into()),
            translation: (transform.translation != Vector3::zeros()).then(|| transform.translation.into()),
            skin: None,
            weights: None,
        })
    }

    fn mesh(&mut self, mesh: &MeshData) -> Index<json::Mesh> {
        let primitives = mesh
            .primitives
            .iter()
            .map(|primitive| {
                let mut attributes = BTreeMap::new();
                let bounding_box = primitive.bounding_box();
                let positions = self.accessor(
                    &f32_bytes(primitive.positions.iter().flatten()),
                    primitive.positions.len(),
                    ComponentType::F32,
                    Type::Vec3,
                    Target::ArrayBuffer,
                    Some(bounding_box),
                );
                attributes.insert(Valid(Semantic::Positions), positions);
                if !primitive.normals.is_empty() {
                    let normals = self.accessor(
                        &f32_bytes(primitive.normals.iter().flatten()),
                        primitive.normals.len(),
                        ComponentType::F32,
                        Type::Vec3,
                        Target::ArrayBuffer,
                        None,
                    );
                    attributes.insert(Valid(Semantic::Normals), normals);
                }
                let indices = self.accessor(
                    &u32_bytes(primitive.indices.iter()),
                    primitive.indices.len(),
                    ComponentType::U32,
                    Type::Scalar,
                    Target::ElementArrayBuffer,
                    None,
                );
                json::mesh::Primitive {
                    attributes,
                    extensions: Default::default(),
                    extras: Default::default(),
                    indices: Some(indices),
                    material: primitive.material.as_ref().map(|material| self.material(material)),
                    mode: Valid(Mode::Triangles),
                    targets: None,
                }
            })
            .collect::<Vec<_>>();

        self.root.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: mesh.name.clone(),
            primitives,
            weights: None,
        });
        Index::new(self.root.meshes.len() as u32 - 1)
    }

    fn material(&mut self, material: &Material) -> Index<json::Material> {
        self.root.materials.push(json::Material {
            name: material.name.clone(),
            double_sided: material.double_sided,
            pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                base_color_factor: json::material::PbrBaseColorFactor(material.base_color_factor),
                metallic_factor: json::material::StrengthFactor(material.metallic_factor),
                roughness_factor: json::material::StrengthFactor(material.roughness_factor),
                ..Default::default()
            },
            ..Default::default()
        });
        Index::new(self.root.materials.len() as u32 - 1)
    }

    /// Appends the bytes as a new buffer view and returns an accessor over all of them.
    fn accessor(
        &mut self,
        bytes: &[u8],
        count: usize,
        component_type: ComponentType,
        type_: Type,
        target: Target,
        bounds: Option<AABB>,
    ) -> Index<json::Accessor> {
        let byte_offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);
        pad_to_four(&mut self.buffer, 0);

        self.root.buffer_views.push(json::buffer::View {
            buffer: Index::new(0),
            byte_length: USize64::from(bytes.len()),
            byte_offset: Some(USize64::from(byte_offset)),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(target)),
        });
        let view = Index::new(self.root.buffer_views.len() as u32 - 1);

        let (min, max) = match bounds.filter(|bounds| !bounds.is_empty()) {
            Some(bounds) => (
                Some(serde_json::json!([bounds.min.x, bounds.min.y, bounds.min.z])),
                Some(serde_json::json!([bounds.max.x, bounds.max.y, bounds.max.z])),
            ),
            None => (None, None),
        };

        self.root.accessors.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: Some(USize64(0)),
            count: USize64::from(count),
            component_type: Valid(GenericComponentType(component_type)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });
        Index::new(self.root.accessors.len() as u32 - 1)
    }
}

fn f32_bytes<'v>(values: impl Iterator<Item = &'v f32>) -> Vec<u8> {
    values.flat_map(|value| value.to_le_bytes()).collect()
}

fn u32_bytes<'v>(values: impl Iterator<Item = &'v u32>) -> Vec<u8> {
    values.flat_map(|value| value.to_le_bytes()).collect()
}
