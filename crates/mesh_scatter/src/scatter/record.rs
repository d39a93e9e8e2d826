//! Flat per-instance records.
//!
//! Every scattered [`Instance`] is flattened into [`RECORD_LEN`] consecutive `f32` slots of
//! a [`RecordBuffer`], in the order given by [`FIELD_NAMES`]:
//!
//! ```text
//! pos.x pos.y pos.z | quat.w quat.x quat.y quat.z | scale.x scale.y scale.z
//! normal.x normal.y normal.z | color.r color.g color.b color.a
//! ```
//!
//! The layout is defined once, by [`Instance::to_record`] and [`Instance::from_record`].
use glam::{Quat, Vec3, Vec4};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::scatter::chunk::{
    chunk_key_for_position, try_chunk_key_for_position, ChunkIndex, ChunkKey,
};
use crate::scatter::owner::OwnerTransform;

/// Number of scalars in one instance record.
pub const RECORD_LEN: usize = 17;

/// Field name of every record slot, by slot index.
pub const FIELD_NAMES: [&str; RECORD_LEN] = [
    "position.x",
    "position.y",
    "position.z",
    "orientation.w",
    "orientation.x",
    "orientation.y",
    "orientation.z",
    "scale.x",
    "scale.y",
    "scale.z",
    "normal.x",
    "normal.y",
    "normal.z",
    "color.r",
    "color.g",
    "color.b",
    "color.a",
];

/// Slot offsets of the record fields.
pub mod slot {
    pub const POSITION: usize = 0;
    pub const ORIENTATION: usize = 3;
    pub const SCALE: usize = 7;
    pub const NORMAL: usize = 10;
    pub const COLOR: usize = 13;
}

/// One scattered instance in mesh-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Instance {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
    /// Interpolated surface normal, passed to shading as-is.
    pub normal: Vec3,
    pub color: Vec4,
}

impl Instance {
    pub fn to_record(&self) -> [f32; RECORD_LEN] {
        let p = self.position;
        let q = self.orientation;
        let s = self.scale;
        let n = self.normal;
        let c = self.color;
        [
            p.x, p.y, p.z, q.w, q.x, q.y, q.z, s.x, s.y, s.z, n.x, n.y, n.z, c.x, c.y, c.z, c.w,
        ]
    }

    pub fn from_record(r: &[f32; RECORD_LEN]) -> Self {
        Self {
            position: Vec3::new(r[0], r[1], r[2]),
            orientation: Quat::from_xyzw(r[4], r[5], r[6], r[3]),
            scale: Vec3::new(r[7], r[8], r[9]),
            normal: Vec3::new(r[10], r[11], r[12]),
            color: Vec4::new(r[13], r[14], r[15], r[16]),
        }
    }

    /// Decodes record number `record` after checking every slot holds a finite float.
    pub fn try_from_slots(record: usize, slots: &[f32]) -> Result<Self> {
        let slots: &[f32; RECORD_LEN] = slots
            .try_into()
            .map_err(|_| Error::TruncatedBuffer { len: slots.len() })?;
        if let Some(slot) = slots.iter().position(|v| !v.is_finite()) {
            return Err(Error::MalformedRecord {
                record,
                slot,
                field: FIELD_NAMES[slot],
            });
        }
        Ok(Self::from_record(slots))
    }
}

/// Append-only buffer of flattened instance records.
///
/// The scalar length is always a multiple of [`RECORD_LEN`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBuffer {
    data: Vec<f32>,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates a buffer with room for `instances` records.
    ///
    /// The capacity is a hint; sizes that cannot be allocated leave the buffer unreserved.
    pub fn with_capacity(instances: usize) -> Self {
        let mut buffer = Self::new();
        buffer.reserve(instances);
        buffer
    }

    /// Wraps raw scalars, e.g. records received from elsewhere.
    pub fn from_raw(data: Vec<f32>) -> Result<Self> {
        if data.len() % RECORD_LEN != 0 {
            return Err(Error::TruncatedBuffer { len: data.len() });
        }
        Ok(Self { data })
    }

    /// Appends one instance record.
    pub fn push(&mut self, instance: &Instance) {
        self.data.extend_from_slice(&instance.to_record());
    }

    /// Reserves room for `instances` more records, if that much can be allocated.
    pub fn reserve(&mut self, instances: usize) {
        let _ = self.data.try_reserve(instances.saturating_mul(RECORD_LEN));
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.data.len() / RECORD_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// All scalars, record after record.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// Slots of record `index`.
    pub fn record(&self, index: usize) -> Option<&[f32]> {
        self.data.get(index * RECORD_LEN..(index + 1) * RECORD_LEN)
    }

    /// Iterates record slot slices in order.
    pub fn records(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(RECORD_LEN)
    }

    /// Decodes record `index` with slot validation.
    pub fn instance(&self, index: usize) -> Option<Result<Instance>> {
        self.record(index)
            .map(|slots| Instance::try_from_slots(index, slots))
    }

    /// Reorders whole records so that instances sharing a chunk are contiguous.
    ///
    /// Chunk keys come from the world-space position (owner transform applied). The sort is
    /// stable, so records keep their scatter order inside a chunk. Positions whose cell does
    /// not fit an `i32` key saturate into the boundary chunks and are reported once.
    pub fn sort_by_chunk(&mut self, chunk_size: f32, owner: &OwnerTransform) -> ChunkIndex {
        let mut unrepresentable = 0usize;
        let mut keyed: Vec<(ChunkKey, usize)> = self
            .records()
            .enumerate()
            .map(|(i, r)| {
                let local = Vec3::new(
                    r[slot::POSITION],
                    r[slot::POSITION + 1],
                    r[slot::POSITION + 2],
                );
                let world = owner.transform_point(local);
                let key = try_chunk_key_for_position(world, chunk_size).unwrap_or_else(|| {
                    unrepresentable += 1;
                    chunk_key_for_position(world, chunk_size)
                });
                (key, i)
            })
            .collect();
        if unrepresentable > 0 {
            warn!(
                "{} instances lie outside the chunk key range and share boundary chunks.",
                unrepresentable
            );
        }
        keyed.sort_by_key(|&(key, _)| key);

        let mut sorted = Vec::with_capacity(self.data.len());
        for &(_, i) in &keyed {
            sorted.extend_from_slice(&self.data[i * RECORD_LEN..(i + 1) * RECORD_LEN]);
        }
        self.data = sorted;

        ChunkIndex::from_sorted_keys(chunk_size, keyed.into_iter().map(|(key, _)| key))
    }
}
