//! Decoding of record buffers into render arrays.
//!
//! [`decode_records`] validates every record, undoes world-space scaling, composes each
//! instance transform under the owner's local-to-world matrix, and fills the shader
//! property arrays. Any invalid record aborts the whole decode; partial output is never
//! returned.
use glam::{Mat4, Vec3, Vec4};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::scatter::owner::OwnerTransform;
use crate::scatter::record::{Instance, RecordBuffer};
use crate::scatter::render::RenderArrays;

/// Which record fields feed the [`crate::scatter::render::SOURCE_COLORS`] array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColorSource {
    /// The encoded RGBA color.
    #[default]
    EncodedColor,
    /// The normal fields with `w = 0`, matching shaders authored against the legacy
    /// packing where both arrays carried the normal.
    NormalAlias,
}

/// Options for [`decode_records`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodeOptions {
    /// Divide the owner's world scale back out of instance scales.
    pub world_space_scale: bool,
    pub color_source: ColorSource,
}

impl DecodeOptions {
    pub fn with_world_space_scale(mut self, world_space_scale: bool) -> Self {
        self.world_space_scale = world_space_scale;
        self
    }

    pub fn with_color_source(mut self, color_source: ColorSource) -> Self {
        self.color_source = color_source;
        self
    }

    /// Instance scale as it enters matrix composition.
    ///
    /// Assumes the owner's world scale is unchanged since the records were encoded.
    pub fn instance_scale(&self, scale: Vec3, owner: &OwnerTransform) -> Vec3 {
        if self.world_space_scale {
            scale * owner.inverse_world_scale()
        } else {
            scale
        }
    }

    fn shader_color(&self, instance: &Instance) -> Vec4 {
        match self.color_source {
            ColorSource::EncodedColor => instance.color,
            ColorSource::NormalAlias => instance.normal.extend(0.0),
        }
    }
}

/// Final local-to-world matrix of one instance.
pub fn instance_matrix(
    instance: &Instance,
    owner: &OwnerTransform,
    options: &DecodeOptions,
) -> Mat4 {
    let scale = options.instance_scale(instance.scale, owner);
    owner.local_to_world
        * Mat4::from_scale_rotation_translation(scale, instance.orientation, instance.position)
}

/// Decodes every record of `buffer` into [`RenderArrays`].
///
/// Fails with [`Error::EmptyBuffer`] if there are no records and with
/// [`Error::MalformedRecord`] at the first slot that is not a finite float.
pub fn decode_records(
    buffer: &RecordBuffer,
    owner: &OwnerTransform,
    options: &DecodeOptions,
) -> Result<RenderArrays> {
    if buffer.is_empty() {
        return Err(Error::EmptyBuffer);
    }
    if options.world_space_scale {
        owner.validate_world_scale()?;
    }

    let count = buffer.len();
    debug!("Decoding {} instance records.", count);

    let mut matrices = Vec::with_capacity(count);
    let mut normals = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);

    for (index, slots) in buffer.records().enumerate() {
        let instance = Instance::try_from_slots(index, slots)?;
        matrices.push(instance_matrix(&instance, owner, options));
        normals.push(instance.normal.extend(0.0));
        colors.push(options.shader_color(&instance));
    }

    Ok(RenderArrays::new(matrices, normals, colors))
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;
    use crate::scatter::record::RECORD_LEN;

    fn instance(position: Vec3, scale: Vec3) -> Instance {
        Instance {
            position,
            orientation: Quat::from_axis_angle(Vec3::Y, 0.8),
            scale,
            normal: Vec3::Y,
            color: Vec4::new(0.2, 0.4, 0.6, 0.8),
        }
    }

    fn buffer_of(instances: &[Instance]) -> RecordBuffer {
        let mut buffer = RecordBuffer::with_capacity(instances.len());
        for i in instances {
            buffer.push(i);
        }
        buffer
    }

    #[test]
    fn empty_buffer_is_reported() {
        let err = decode_records(
            &RecordBuffer::new(),
            &OwnerTransform::IDENTITY,
            &DecodeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::EmptyBuffer));
    }

    #[test]
    fn round_trip_restores_transform() {
        let original = instance(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 0.75, 1.25));
        let arrays = decode_records(
            &buffer_of(&[original]),
            &OwnerTransform::IDENTITY,
            &DecodeOptions::default(),
        )
        .expect("decodes");

        let (scale, rotation, translation) = arrays.matrices[0].to_scale_rotation_translation();
        assert!((translation - original.position).length() < 1e-5);
        assert!((scale - original.scale).length() < 1e-5);
        assert!(rotation.angle_between(original.orientation) < 1e-3);
    }

    #[test]
    fn owner_transform_is_applied() {
        let owner = OwnerTransform::from_scale_rotation_translation(
            Vec3::ONE,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(0.0, 10.0, 0.0),
        );
        let arrays = decode_records(
            &buffer_of(&[instance(Vec3::X, Vec3::ONE)]),
            &owner,
            &DecodeOptions::default(),
        )
        .expect("decodes");

        let world = arrays.matrices[0].transform_point3(Vec3::ZERO);
        assert!((world - Vec3::new(0.0, 10.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn world_space_scale_is_divided_out() {
        let owner = OwnerTransform::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::IDENTITY,
            Vec3::ZERO,
        );
        let options = DecodeOptions::default().with_world_space_scale(true);
        assert_eq!(options.instance_scale(Vec3::ONE, &owner), Vec3::splat(0.5));

        // Composed with the owner, the instance ends up at its authored size.
        let buffer = buffer_of(&[instance(Vec3::ZERO, Vec3::ONE)]);
        let arrays = decode_records(&buffer, &owner, &options).expect("decodes");
        let (scale, _, _) = arrays.matrices[0].to_scale_rotation_translation();
        assert!((scale - Vec3::ONE).length() < 1e-5);

        let unscaled = DecodeOptions::default();
        assert_eq!(unscaled.instance_scale(Vec3::ONE, &owner), Vec3::ONE);
    }

    #[test]
    fn zero_owner_scale_is_rejected_in_world_space() {
        let owner = OwnerTransform::IDENTITY.with_world_scale(Vec3::new(0.0, 1.0, 1.0));
        let options = DecodeOptions::default().with_world_space_scale(true);
        let buffer = buffer_of(&[instance(Vec3::ZERO, Vec3::ONE)]);
        let err = decode_records(&buffer, &owner, &options).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn corrupted_slot_aborts_without_output() {
        let mut raw = buffer_of(&[
            instance(Vec3::ZERO, Vec3::ONE),
            instance(Vec3::X, Vec3::ONE),
            instance(Vec3::Y, Vec3::ONE),
        ])
        .into_inner();
        raw[RECORD_LEN + 8] = f32::NAN;
        let buffer = RecordBuffer::from_raw(raw).expect("whole records");

        let result = decode_records(&buffer, &OwnerTransform::IDENTITY, &DecodeOptions::default());
        match result {
            Err(Error::MalformedRecord {
                record,
                slot,
                field,
            }) => {
                assert_eq!(record, 1);
                assert_eq!(slot, 8);
                assert_eq!(field, "scale.y");
            }
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn shader_vectors_follow_color_source() {
        let inst = instance(Vec3::ZERO, Vec3::ONE);
        let buffer = buffer_of(&[inst]);

        let fixed = decode_records(&buffer, &OwnerTransform::IDENTITY, &DecodeOptions::default())
            .expect("decodes");
        assert_eq!(fixed.normals()[0], Vec4::new(0.0, 1.0, 0.0, 0.0));
        assert_eq!(fixed.colors()[0], inst.color);

        let aliased = decode_records(
            &buffer,
            &OwnerTransform::IDENTITY,
            &DecodeOptions::default().with_color_source(ColorSource::NormalAlias),
        )
        .expect("decodes");
        assert_eq!(aliased.colors()[0], aliased.normals()[0]);
    }
}
