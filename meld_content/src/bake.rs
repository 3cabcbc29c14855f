use std::collections::HashSet;

use meld_shared::{
    log::trace,
    nalgebra::{Matrix3, UnitQuaternion, Vector3},
    Transform,
};

use crate::scene_graph::{NodeHandle, NodeKind, SceneGraph};

/// Folds rotation and scale of the given nodes into their geometry and children.
///
/// Mesh and group nodes end up with identity rotation and unit scale. Their
/// translation is only re-expressed in the baked frame of the parent. The
/// world placement of every vertex and every child is preserved. Other nodes
/// keep their rotation and scale but absorb the frame of a baked parent.
///
/// The nodes are processed top-down, starting at every node whose parent is
/// not part of `handles`. Applying the function twice has the same effect as
/// applying it once.
pub fn bake_transforms(scene_graph: &mut SceneGraph, handles: &[NodeHandle]) {
    let selected = handles.iter().copied().collect::<HashSet<_>>();
    let tops = handles
        .iter()
        .copied()
        .filter(|handle| {
            scene_graph
                .node(*handle)
                .parent()
                .map_or(true, |parent| !selected.contains(&parent))
        })
        .collect::<Vec<_>>();

    let mut stack = tops.into_iter().rev().map(|top| (top, Matrix3::identity())).collect::<Vec<_>>();
    while let Some((handle, inherited)) = stack.pop() {
        let passed_on = bake_node(scene_graph, handle, &inherited);
        let node = scene_graph.node(handle);
        for child in node.children().iter().rev() {
            if selected.contains(child) {
                stack.push((*child, passed_on));
            }
        }
    }
}

/// Bakes a single node that sits in a parent frame distorted by `inherited`.
/// Returns the linear map the children have to absorb.
fn bake_node(scene_graph: &mut SceneGraph, handle: NodeHandle, inherited: &Matrix3<f32>) -> Matrix3<f32> {
    let node = scene_graph.node_mut(handle);
    let translation = inherited * node.transform.translation;
    let linear = inherited * node.transform.linear();

    if node.kind.is_bakeable() {
        trace!("Baking transform of '{}'", node.name());
        if let NodeKind::Mesh(mesh) = &mut node.kind {
            if linear != Matrix3::identity() {
                mesh.apply_linear(&linear);
            }
        }
        node.transform = Transform::new(translation, UnitQuaternion::identity(), Vector3::new(1.0, 1.0, 1.0));
        linear
    } else {
        if *inherited != Matrix3::identity() {
            node.transform = Transform::from_linear_and_translation(&linear, translation);
        }
        Matrix3::identity()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use meld_shared::{
        float_cmp::assert_approx_eq,
        nalgebra::{Matrix4, Point3},
    };

    use crate::{mesh::MeshData, scene_graph::NodeDescription};

    use super::*;

    fn world_matrix(scene_graph: &SceneGraph, handle: NodeHandle) -> Matrix4<f32> {
        let mut matrix = scene_graph.node(handle).transform.to_matrix();
        for ancestor in scene_graph.ancestors(handle) {
            matrix = scene_graph.node(ancestor).transform.to_matrix() * matrix;
        }
        matrix
    }

    fn world_vertices(scene_graph: &SceneGraph, handle: NodeHandle) -> Vec<Point3<f32>> {
        let NodeKind::Mesh(mesh) = &scene_graph.node(handle).kind else {
            panic!("node is not a mesh");
        };
        let matrix = world_matrix(scene_graph, handle);
        mesh.primitives[0]
            .positions
            .iter()
            .map(|position| matrix.transform_point(&Point3::from(*position)))
            .collect()
    }

    fn assert_points_eq(a: &[Point3<f32>], b: &[Point3<f32>]) {
        assert_eq!(a.len(), b.len());
        for (a, b) in a.iter().zip(b) {
            assert_approx_eq!(f32, a.x, b.x, epsilon = 1e-5);
            assert_approx_eq!(f32, a.y, b.y, epsilon = 1e-5);
            assert_approx_eq!(f32, a.z, b.z, epsilon = 1e-5);
        }
    }

    fn rotated_scaled(translation: [f32; 3]) -> Transform {
        Transform::new(
            Vector3::from(translation),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
            Vector3::new(2.0, 2.0, 2.0),
        )
    }

    /// Group (rotated, scaled) -> Mesh (rotated, scaled) -> Mesh
    fn sample_graph() -> (SceneGraph, Vec<NodeHandle>) {
        let mut scene_graph = SceneGraph::new();
        let root = scene_graph.root();
        let group = scene_graph.insert_child(
            root,
            NodeDescription::new("Group", NodeKind::Group).with_transform(rotated_scaled([1.0, 2.0, 3.0])),
        );
        let mesh = scene_graph.insert_child(
            group,
            NodeDescription::new("Mesh", NodeKind::Mesh(MeshData::cube(1.0)))
                .with_transform(rotated_scaled([0.5, 0.0, 0.0])),
        );
        let leaf = scene_graph.insert_child(
            mesh,
            NodeDescription::new("Leaf", NodeKind::Mesh(MeshData::cube(0.5)))
                .with_transform(Transform::from_translation(Vector3::new(0.0, 1.0, 0.0))),
        );
        (scene_graph, vec![group, mesh, leaf])
    }

    #[test]
    fn rotation_and_scale_become_identity() {
        let (mut scene_graph, handles) = sample_graph();
        bake_transforms(&mut scene_graph, &handles);
        for handle in &handles {
            assert!(scene_graph.node(*handle).transform.has_identity_linear());
        }
    }

    #[test]
    fn translation_of_top_node_is_untouched() {
        let (mut scene_graph, handles) = sample_graph();
        bake_transforms(&mut scene_graph, &handles);
        assert_eq!(scene_graph.node(handles[0]).transform.translation, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn world_placement_is_preserved() {
        let (mut scene_graph, handles) = sample_graph();
        let mesh_before = world_vertices(&scene_graph, handles[1]);
        let leaf_before = world_vertices(&scene_graph, handles[2]);
        let leaf_origin_before = world_matrix(&scene_graph, handles[2]).transform_point(&Point3::origin());

        bake_transforms(&mut scene_graph, &handles);

        assert_points_eq(&world_vertices(&scene_graph, handles[1]), &mesh_before);
        assert_points_eq(&world_vertices(&scene_graph, handles[2]), &leaf_before);
        let leaf_origin_after = world_matrix(&scene_graph, handles[2]).transform_point(&Point3::origin());
        assert_points_eq(&[leaf_origin_after], &[leaf_origin_before]);
    }

    #[test]
    fn baking_twice_equals_baking_once() {
        let (mut scene_graph, handles) = sample_graph();
        bake_transforms(&mut scene_graph, &handles);
        let once = scene_graph.clone();
        bake_transforms(&mut scene_graph, &handles);
        for handle in &handles {
            assert_eq!(scene_graph.node(*handle), once.node(*handle));
        }
    }

    #[test]
    fn other_nodes_keep_their_transform() {
        let mut scene_graph = SceneGraph::new();
        let root = scene_graph.root();
        let transform = rotated_scaled([0.0, 0.0, 1.0]);
        let camera =
            scene_graph.insert_child(root, NodeDescription::new("Camera", NodeKind::Other).with_transform(transform));
        bake_transforms(&mut scene_graph, &[camera]);
        assert_eq!(scene_graph.node(camera).transform, transform);
    }

    #[test]
    fn other_nodes_absorb_a_baked_parent() {
        let mut scene_graph = SceneGraph::new();
        let root = scene_graph.root();
        let group = scene_graph.insert_child(
            root,
            NodeDescription::new("Group", NodeKind::Group).with_transform(rotated_scaled([0.0, 0.0, 0.0])),
        );
        let camera = scene_graph.insert_child(
            group,
            NodeDescription::new("Camera", NodeKind::Other)
                .with_transform(Transform::from_translation(Vector3::new(1.0, 0.0, 0.0))),
        );
        let before = world_matrix(&scene_graph, camera);
        bake_transforms(&mut scene_graph, &[group, camera]);
        let after = world_matrix(&scene_graph, camera);
        for (a, b) in before.iter().zip(after.iter()) {
            assert_approx_eq!(f32, *a, *b, epsilon = 1e-5);
        }
        assert!(scene_graph.node(group).transform.has_identity_linear());
    }

    #[test]
    fn nodes_outside_the_selection_are_untouched() {
        let (mut scene_graph, handles) = sample_graph();
        let untouched = scene_graph.node(handles[2]).clone();
        bake_transforms(&mut scene_graph, &handles[..2]);
        assert_eq!(scene_graph.node(handles[2]), &untouched);
    }
}
