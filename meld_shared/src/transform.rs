use nalgebra::{Matrix3, Matrix4, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Local transform of a node, split into translation, rotation and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn new(translation: Vector3<f32>, rotation: UnitQuaternion<f32>, scale: Vector3<f32>) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity(), Vector3::new(1.0, 1.0, 1.0))
    }

    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Builds a [`Transform`] from a linear part and a translation.
    ///
    /// Shear cannot be represented and is dropped. A negative determinant is
    /// expressed as a negative scale on the x axis.
    pub fn from_linear_and_translation(linear: &Matrix3<f32>, translation: Vector3<f32>) -> Self {
        let mut scale = Vector3::new(linear.column(0).norm(), linear.column(1).norm(), linear.column(2).norm());
        if linear.determinant() < 0.0 {
            scale.x = -scale.x;
        }
        let divisor = |s: f32| if s.abs() > f32::EPSILON { s } else { 1.0 };
        let rotation_matrix = Matrix3::from_columns(&[
            linear.column(0) / divisor(scale.x),
            linear.column(1) / divisor(scale.y),
            linear.column(2) / divisor(scale.z),
        ]);
        let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix(&rotation_matrix));
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Rotation and scale combined into one matrix (`R * S`).
    pub fn linear(&self) -> Matrix3<f32> {
        self.rotation.to_rotation_matrix().into_inner() * Matrix3::from_diagonal(&self.scale)
    }

    /// Homogeneous matrix `T * R * S`.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.translation) * self.linear().to_homogeneous()
    }

    /// Returns `true` when rotation and scale are (numerically) the identity.
    pub fn has_identity_linear(&self) -> bool {
        const EPSILON: f32 = 1e-6;
        self.rotation.angle() < EPSILON && (self.scale - Vector3::new(1.0, 1.0, 1.0)).amax() < EPSILON
    }
}
