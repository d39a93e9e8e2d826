//! World transform of the object that carries the source mesh.
use glam::{Mat4, Quat, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Local-to-world transform of the mesh owner.
///
/// `world_scale` is the owner's accumulated (lossy) scale. It scales triangle edges when
/// density is measured in world space and is divided back out of instance scales when
/// decoding, so instances keep their authored size under a scaled owner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OwnerTransform {
    pub local_to_world: Mat4,
    pub world_scale: Vec3,
}

impl Default for OwnerTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl OwnerTransform {
    pub const IDENTITY: Self = Self {
        local_to_world: Mat4::IDENTITY,
        world_scale: Vec3::ONE,
    };

    /// Creates an owner transform, deriving the world scale from the matrix.
    pub fn from_matrix(local_to_world: Mat4) -> Self {
        let (scale, _, _) = local_to_world.to_scale_rotation_translation();
        Self {
            local_to_world,
            world_scale: scale,
        }
    }

    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self {
            local_to_world: Mat4::from_scale_rotation_translation(scale, rotation, translation),
            world_scale: scale,
        }
    }

    /// Overrides the world scale, e.g. with a host-reported lossy scale.
    pub fn with_world_scale(mut self, world_scale: Vec3) -> Self {
        self.world_scale = world_scale;
        self
    }

    pub fn inverse_world_scale(&self) -> Vec3 {
        self.world_scale.recip()
    }

    /// Maps a mesh-local point into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.local_to_world.transform_point3(local)
    }

    /// Checks that the world scale can be divided out of instance scales.
    pub fn validate_world_scale(&self) -> Result<()> {
        let s = self.world_scale;
        if !s.is_finite() || s.x == 0.0 || s.y == 0.0 || s.z == 0.0 {
            return Err(Error::InvalidConfig(format!(
                "owner world scale {s} must be finite and non-zero on every axis"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_matrix_recovers_scale() {
        let owner = OwnerTransform::from_matrix(Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 3.0, 4.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(1.0, 2.0, 3.0),
        ));
        assert!((owner.world_scale - Vec3::new(2.0, 3.0, 4.0)).length() < 1e-5);
        let inv = owner.inverse_world_scale();
        assert!((inv - Vec3::new(0.5, 1.0 / 3.0, 0.25)).length() < 1e-5);
    }

    #[test]
    fn transform_point_applies_translation() {
        let owner = OwnerTransform::from_scale_rotation_translation(
            Vec3::ONE,
            Quat::IDENTITY,
            Vec3::new(10.0, 0.0, 0.0),
        );
        assert_eq!(owner.transform_point(Vec3::ONE), Vec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn zero_world_scale_is_rejected() {
        let owner = OwnerTransform::IDENTITY.with_world_scale(Vec3::new(1.0, 0.0, 1.0));
        assert!(matches!(
            owner.validate_world_scale(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(OwnerTransform::default().validate_world_scale().is_ok());
    }
}
