use bos_tables::TransformTable;
use glam::{Mat4, Quat, Vec3};

pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Expands the transform columns into one `T * R * S` matrix per row.
///
/// Matrices are immutable after this point; merged primitives bake them
/// into vertex data, everything else references them by index.
pub fn compose_matrices(table: &TransformTable) -> Vec<Mat4> {
    (0..table.len())
        .map(|row| {
            Transform {
                translation: Vec3::new(table.tx[row], table.ty[row], table.tz[row]),
                rotation: Quat::from_xyzw(
                    table.qx[row],
                    table.qy[row],
                    table.qz[row],
                    table.qw[row],
                ),
                scale: Vec3::new(table.sx[row], table.sy[row], table.sz[row]),
            }
            .to_matrix()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn composes_trs_in_order() {
        let quat = Quat::from_rotation_z(FRAC_PI_2);
        let table = TransformTable {
            tx: vec![1.0],
            ty: vec![2.0],
            tz: vec![3.0],
            qx: vec![quat.x],
            qy: vec![quat.y],
            qz: vec![quat.z],
            qw: vec![quat.w],
            sx: vec![2.0],
            sy: vec![2.0],
            sz: vec![2.0],
        };

        let matrices = compose_matrices(&table);
        assert_eq!(matrices.len(), 1);

        // Scale then rotate then translate: (1,0,0) -> (2,0,0) -> (0,2,0) -> (1,4,3)
        let point = matrices[0].transform_point3(Vec3::X);
        assert!((point - Vec3::new(1.0, 4.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn identity_transform_is_identity_matrix() {
        assert_eq!(Transform::IDENTITY.to_matrix(), Mat4::IDENTITY);
    }
}
