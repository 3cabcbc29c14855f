use meld_shared::{
    nalgebra::{Matrix3, Vector3},
    AABB,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: Option<String>,
    pub base_color_factor: [f32; 4],
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            double_sided: false,
        }
    }
}

/// Triangle list with its own vertex data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub positions: Vec<[f32; 3]>,
    /// Either empty or one normal per position.
    pub normals: Vec<[f32; 3]>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
    pub material: Option<Material>,
}

impl Primitive {
    pub fn bounding_box(&self) -> AABB {
        AABB::from_points(&self.positions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

impl MeshData {
    /// Axis-aligned cube with the given edge length centered at the origin.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        // (normal, tangent u, tangent v) per face; corners are n*h ± u*h ± v*h
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
        ];

        let mut primitive = Primitive {
            material: Some(Material {
                name: Some("placeholder".to_owned()),
                base_color_factor: [0.8, 0.8, 0.8, 1.0],
                metallic_factor: 0.0,
                roughness_factor: 0.5,
                double_sided: false,
            }),
            ..Primitive::default()
        };
        for (normal, u, v) in faces {
            let normal = Vector3::from(normal);
            let u = Vector3::from(u);
            let v = Vector3::from(v);
            let base = primitive.positions.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner = (normal + u * su + v * sv) * h;
                primitive.positions.push(corner.into());
                primitive.normals.push(normal.into());
            }
            primitive
                .indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            name: Some("cube".to_owned()),
            primitives: vec![primitive],
        }
    }

    pub fn bounding_box(&self) -> AABB {
        let mut bounding_box = AABB::empty();
        for primitive in &self.primitives {
            bounding_box.merge(&primitive.bounding_box());
        }
        bounding_box
    }

    /// Transforms the vertex data by the given linear map.
    ///
    /// Normals use the inverse transpose and are renormalized. A mirroring map
    /// flips the winding order so that the front faces stay the front faces.
    pub fn apply_linear(&mut self, linear: &Matrix3<f32>) {
        let normal_matrix = linear.try_inverse().map(|inverse| inverse.transpose()).unwrap_or(*linear);
        let mirrors = linear.determinant() < 0.0;
        for primitive in &mut self.primitives {
            for position in &mut primitive.positions {
                *position = (linear * Vector3::from(*position)).into();
            }
            for normal in &mut primitive.normals {
                let transformed = normal_matrix * Vector3::from(*normal);
                *normal = transformed.try_normalize(f32::EPSILON).unwrap_or(transformed).into();
            }
            if mirrors {
                for triangle in primitive.indices.chunks_exact_mut(3) {
                    triangle.swap(1, 2);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use meld_shared::{
        float_cmp::assert_approx_eq,
        nalgebra::{Rotation3, Vector3},
    };

    use super::*;

    #[test]
    fn cube() {
        let cube = MeshData::cube(0.2);
        assert_eq!(cube.primitives.len(), 1);
        let primitive = &cube.primitives[0];
        assert_eq!(primitive.positions.len(), 24);
        assert_eq!(primitive.normals.len(), 24);
        assert_eq!(primitive.indices.len(), 36);
        assert!(primitive.indices.iter().all(|index| (*index as usize) < primitive.positions.len()));

        let bounding_box = cube.bounding_box();
        assert_approx_eq!(f32, bounding_box.min.x, -0.1, epsilon = 1e-6);
        assert_approx_eq!(f32, bounding_box.max.y, 0.1, epsilon = 1e-6);
        assert_approx_eq!(f32, bounding_box.size().z, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn cube_faces_point_outwards() {
        let cube = MeshData::cube(1.0);
        let primitive = &cube.primitives[0];
        for triangle in primitive.indices.chunks_exact(3) {
            let a = Vector3::from(primitive.positions[triangle[0] as usize]);
            let b = Vector3::from(primitive.positions[triangle[1] as usize]);
            let c = Vector3::from(primitive.positions[triangle[2] as usize]);
            let face_normal = (b - a).cross(&(c - a));
            let normal = Vector3::from(primitive.normals[triangle[0] as usize]);
            assert!(face_normal.dot(&normal) > 0.0);
        }
    }

    #[test]
    fn apply_rotation() {
        let mut mesh = MeshData {
            name: None,
            primitives: vec![Primitive {
                positions: vec![[1.0, 0.0, 0.0]],
                normals: vec![[1.0, 0.0, 0.0]],
                indices: vec![],
                material: None,
            }],
        };
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2);
        mesh.apply_linear(rotation.matrix());
        let position = mesh.primitives[0].positions[0];
        let normal = mesh.primitives[0].normals[0];
        assert_approx_eq!(f32, position[0], 0.0, epsilon = 1e-6);
        assert_approx_eq!(f32, position[1], 1.0, epsilon = 1e-6);
        assert_approx_eq!(f32, normal[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn apply_non_uniform_scale_keeps_normals_unit_length() {
        let mut mesh = MeshData::cube(1.0);
        mesh.apply_linear(&Matrix3::from_diagonal(&Vector3::new(2.0, 1.0, 0.5)));
        for normal in &mesh.primitives[0].normals {
            assert_approx_eq!(f32, Vector3::from(*normal).norm(), 1.0, epsilon = 1e-5);
        }
        assert_approx_eq!(f32, mesh.bounding_box().size().x, 2.0, epsilon = 1e-6);
        assert_approx_eq!(f32, mesh.bounding_box().size().z, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn mirroring_flips_winding() {
        let mut mesh = MeshData::cube(1.0);
        let before = mesh.primitives[0].indices.clone();
        mesh.apply_linear(&Matrix3::from_diagonal(&Vector3::new(-1.0, 1.0, 1.0)));
        let after = &mesh.primitives[0].indices;
        assert_eq!(before[0], after[0]);
        assert_eq!(before[1], after[2]);
        assert_eq!(before[2], after[1]);
    }
}
