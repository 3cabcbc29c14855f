use std::{
    collections::{BTreeMap, HashSet},
    path::Path,
};

use gltf::{buffer::Data, mesh::Mode};
use meld_shared::{
    log::{info, trace, warn},
    nalgebra::{Quaternion, UnitQuaternion, Vector3},
    serde_json::{self, value::RawValue, Value},
    Transform,
};

use crate::{
    backend::AssetImporter,
    mesh::{Material, MeshData, Primitive},
    scene_graph::{NodeDescription, NodeHandle, NodeKind, SceneGraph},
    Error, Result,
};

/// Imports `.glb` and `.gltf` files with the `gltf` crate.
///
/// Nodes of the default scene (or the first scene) are imported with their
/// hierarchy, transforms, triangle meshes, material factors and extras.
/// Textures, animations, skins and morph targets are not carried over.
#[derive(Debug, Default)]
pub struct GltfImporter;

impl AssetImporter for GltfImporter {
    fn import(&mut self, path: &Path, scene_graph: &mut SceneGraph) -> Result<Vec<NodeHandle>> {
        let (document, buffers, _images) = gltf::import(path).map_err(|err| Error::Import {
            path: path.to_owned(),
            message: err.to_string(),
        })?;

        let top_nodes = match document.default_scene().or_else(|| document.scenes().next()) {
            Some(scene) => scene.nodes().collect::<Vec<_>>(),
            None => {
                let children = document
                    .nodes()
                    .flat_map(|node| node.children().map(|child| child.index()).collect::<Vec<_>>())
                    .collect::<Vec<_>>();
                document.nodes().filter(|node| !children.contains(&node.index())).collect()
            }
        };
        trace!("'{}' has {} top-level node(s)", path.display(), top_nodes.len());

        let mut created = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = top_nodes.into_iter().rev().map(|node| (node, None)).collect::<Vec<_>>();
        while let Some((node, parent)) = stack.pop() {
            // A node reached twice is shared between subtrees or part of a cycle.
            if !visited.insert(node.index()) {
                return Err(Error::Import {
                    path: path.to_owned(),
                    message: format!("node {} is referenced more than once", node.index()),
                });
            }
            let description = describe_node(path, &node, &buffers)?;
            let handle = match parent {
                Some(parent) => scene_graph.insert_child(parent, description),
                None => scene_graph.insert(description),
            };
            created.push(handle);
            let children = node.children().collect::<Vec<_>>();
            stack.extend(children.into_iter().rev().map(|child| (child, Some(handle))));
        }

        info!("Read {} node(s) from '{}'", created.len(), path.display());
        Ok(created)
    }
}

fn describe_node(path: &Path, node: &gltf::Node, buffers: &[Data]) -> Result<NodeDescription> {
    let name = node
        .name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("Node_{}", node.index()));

    let kind = if let Some(mesh) = node.mesh() {
        NodeKind::Mesh(read_mesh(path, &mesh, buffers)?)
    } else if node.camera().is_some() || node.skin().is_some() {
        NodeKind::Other
    } else {
        NodeKind::Group
    };

    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform::new(
        Vector3::from(translation),
        UnitQuaternion::from_quaternion(Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2])),
        Vector3::from(scale),
    );

    Ok(NodeDescription::new(name, kind)
        .with_transform(transform)
        .with_metadata(read_extras(node.extras().as_deref())))
}

/// Converts the extras object of a node into string metadata. Non-string values are kept as JSON text.
pub(crate) fn read_extras(extras: Option<&RawValue>) -> BTreeMap<String, String> {
    let Some(extras) = extras else {
        return BTreeMap::new();
    };
    match serde_json::from_str::<serde_json::Map<String, Value>>(extras.get()) {
        Ok(map) => map
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(value) => (key, value),
                value => (key, value.to_string()),
            })
            .collect(),
        Err(err) => {
            warn!("Ignoring extras that are not an object: {err}");
            BTreeMap::new()
        }
    }
}

fn read_mesh(path: &Path, mesh: &gltf::Mesh, buffers: &[Data]) -> Result<MeshData> {
    let mesh_name = mesh.name().unwrap_or("unknown");
    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            warn!(
                "Skipping primitive {} of mesh '{mesh_name}' in '{}' with mode {:?}",
                primitive.index(),
                path.display(),
                primitive.mode()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let positions = reader
            .read_positions()
            .ok_or_else(|| Error::Import {
                path: path.to_owned(),
                message: format!("Mesh '{mesh_name}' has no vertex positions"),
            })?
            .collect::<Vec<_>>();
        let normals = reader
            .read_normals()
            .map(|normals| normals.collect::<Vec<_>>())
            .unwrap_or_default();
        let indices = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect::<Vec<_>>(),
            None => (0..positions.len() as u32).collect(),
        };

        let material = primitive.material();
        let material = material.index().map(|_| {
            let pbr = material.pbr_metallic_roughness();
            Material {
                name: material.name().map(str::to_owned),
                base_color_factor: pbr.base_color_factor(),
                metallic_factor: pbr.metallic_factor(),
                roughness_factor: pbr.roughness_factor(),
                double_sided: material.double_sided(),
            }
        });

        primitives.push(Primitive {
            normals: if normals.len() == positions.len() { normals } else { Vec::new() },
            positions,
            indices,
            material,
        });
    }

    Ok(MeshData {
        name: mesh.name().map(str::to_owned),
        primitives,
    })
}
