use glam::{Mat4, Vec3};

// Axis-Aligned Bounding Box (AABB) structure
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all points; `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut aabb = Self::new(first, first);
        for point in points {
            aabb.min = aabb.min.min(point);
            aabb.max = aabb.max.max(point);
        }
        Some(aabb)
    }

    /// Union of all boxes; `None` for an empty iterator.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a Aabb>) -> Option<Self> {
        let mut boxes = boxes.into_iter();
        let mut combined = *boxes.next()?;
        for aabb in boxes {
            combined.extend(aabb);
        }
        Some(combined)
    }

    pub fn extend(&mut self, other: &Self) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Axis-aligned box containing all eight transformed corners.
    pub fn transformed(&self, mat: &Mat4) -> Self {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let pick = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            *corner = mat.transform_point3(pick);
        }

        let mut min = corners[0];
        let mut max = corners[0];
        for corner in &corners[1..] {
            min = min.min(*corner);
            max = max.max(*corner);
        }
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn transformed_covers_rotated_corners() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(2.0, 1.0, 0.0));
        let rotated = aabb.transformed(&Mat4::from_rotation_z(FRAC_PI_2));

        // The long x edge now spans y.
        assert!((rotated.max.y - 2.0).abs() < 1e-5);
        assert!((rotated.min.x + 1.0).abs() < 1e-5);
    }

    #[test]
    fn union_all_matches_pairwise_extend() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(-2.0), Vec3::splat(-1.0));
        let combined = Aabb::union_all([&a, &b]).unwrap();
        assert_eq!(combined.min, Vec3::splat(-2.0));
        assert_eq!(combined.max, Vec3::ONE);
    }
}
