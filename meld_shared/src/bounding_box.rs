use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box spanned by `min` and `max`.
///
/// A box whose `min` lies above its `max` on any axis contains nothing. Such
/// a box is the neutral element for [`AABB::grow`] and [`AABB::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Default for AABB {
    fn default() -> Self {
        Self::empty()
    }
}

impl AABB {
    pub fn empty() -> Self {
        Self {
            min: Vector3::repeat(f32::INFINITY),
            max: Vector3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Smallest box around the vertex positions.
    ///
    /// ```
    /// # use meld_shared::AABB;
    /// let positions = [[0.0, 4.0, 0.0], [-1.0, 0.0, 2.0]];
    /// let bounding_box = AABB::from_points(&positions);
    /// assert_eq!(bounding_box.min.x, -1.0);
    /// assert_eq!(bounding_box.max.y, 4.0);
    /// ```
    pub fn from_points<'p>(points: impl IntoIterator<Item = &'p [f32; 3]>) -> Self {
        let mut bounding_box = Self::empty();
        for point in points {
            bounding_box.grow(Vector3::from(*point));
        }
        bounding_box
    }

    pub fn grow(&mut self, point: Vector3<f32>) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    pub fn merge(&mut self, other: &AABB) {
        if !other.is_empty() {
            self.grow(other.min);
            self.grow(other.max);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.iter().zip(self.max.iter()).any(|(min, max)| min > max)
    }

    /// Edge lengths. Zero for an empty box.
    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.max - self.min
        }
    }
}
