//! Chunk utilities for the scatter pipeline.
//!
//! Positions are bucketed on an axis-aligned grid of cubic chunks. A chunk is identified
//! either by its integer [`ChunkKey`] or by its origin, the position floored to the nearest
//! lower multiple of the chunk size on every axis.
//!
//! After a scatter pass the records are sorted by chunk key, so every chunk owns one
//! contiguous range of the render arrays. [`ChunkIndex`] maps keys to those ranges.
use std::collections::BTreeMap;
use std::ops::Range;

use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Chunk edge length used when none is configured.
pub const DEFAULT_CHUNK_SIZE: f32 = 8.0;

/// Integer chunk coordinate, `floor(position / chunk_size)` per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkKey(
    /// Chunk index along the X axis.
    pub i32,
    /// Chunk index along the Y axis.
    pub i32,
    /// Chunk index along the Z axis.
    pub i32,
);

/// Computes the chunk key for a position.
///
/// Cells beyond the `i32` range saturate to `i32::MIN`/`i32::MAX` and non-finite axes map
/// to 0. Use [`try_chunk_key_for_position`] to detect these positions.
pub fn chunk_key_for_position(position: Vec3, chunk_size: f32) -> ChunkKey {
    debug_assert!(chunk_size > 0.0, "chunk_size must be > 0");
    let cell = (position / chunk_size).floor();
    ChunkKey(cell.x as i32, cell.y as i32, cell.z as i32)
}

/// Computes the chunk key for a position, or `None` if a cell index is non-finite or
/// outside the `i32` range.
pub fn try_chunk_key_for_position(position: Vec3, chunk_size: f32) -> Option<ChunkKey> {
    let cell = (position / chunk_size).floor();
    let representable = |c: f32| c.is_finite() && c >= i32::MIN as f32 && c < i32::MAX as f32;
    if cell.to_array().into_iter().all(representable) {
        Some(ChunkKey(cell.x as i32, cell.y as i32, cell.z as i32))
    } else {
        None
    }
}

/// Floors each axis of `position` to the nearest lower multiple of `chunk_size`.
pub fn chunk_origin_for_position(position: Vec3, chunk_size: f32) -> Vec3 {
    debug_assert!(chunk_size > 0.0, "chunk_size must be > 0");
    (position / chunk_size).floor() * chunk_size
}

/// Computes the origin (minimum corner) of the chunk identified by `key`.
pub fn chunk_origin_for_key(key: ChunkKey, chunk_size: f32) -> Vec3 {
    Vec3::new(key.0 as f32, key.1 as f32, key.2 as f32) * chunk_size
}

/// Creates a deterministic seed for a triangle from a base seed.
pub fn seed_for_triangle(base_seed: u64, triangle_index: usize) -> u64 {
    let t = triangle_index as u64;
    mix_u64(base_seed ^ t.wrapping_mul(0x9E3779B97F4A7C15))
}

#[inline]
fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Maps chunk keys to the contiguous instance ranges they own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkIndex {
    chunk_size: f32,
    ranges: BTreeMap<ChunkKey, Range<usize>>,
}

impl ChunkIndex {
    /// Creates an index with no chunks.
    pub fn empty(chunk_size: f32) -> Self {
        Self {
            chunk_size,
            ranges: BTreeMap::new(),
        }
    }

    /// Builds the index from per-instance keys that are already sorted.
    pub fn from_sorted_keys(chunk_size: f32, keys: impl IntoIterator<Item = ChunkKey>) -> Self {
        let mut ranges: BTreeMap<ChunkKey, Range<usize>> = BTreeMap::new();
        let mut current: Option<(ChunkKey, usize)> = None;
        let mut end = 0;

        for (i, key) in keys.into_iter().enumerate() {
            end = i + 1;
            match current {
                Some((open, _)) if open == key => {}
                Some((open, start)) => {
                    debug_assert!(open < key, "chunk keys must be sorted");
                    ranges.insert(open, start..i);
                    current = Some((key, i));
                }
                None => current = Some((key, i)),
            }
        }
        if let Some((open, start)) = current {
            ranges.insert(open, start..end);
        }

        Self { chunk_size, ranges }
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Number of non-empty chunks.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Instance range of the chunk identified by `key`.
    pub fn get(&self, key: ChunkKey) -> Option<Range<usize>> {
        self.ranges.get(&key).cloned()
    }

    /// Instance range of the chunk containing a world position; empty if the chunk holds
    /// no instances.
    pub fn range_at(&self, world_position: Vec3) -> Range<usize> {
        if self.chunk_size <= 0.0 {
            return 0..0;
        }
        self.get(chunk_key_for_position(world_position, self.chunk_size))
            .unwrap_or(0..0)
    }

    /// Iterates chunks in key order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkKey, Range<usize>)> + '_ {
        self.ranges.iter().map(|(k, r)| (*k, r.clone()))
    }

    /// Total number of instances covered by all chunks.
    pub fn instance_count(&self) -> usize {
        self.ranges.values().map(|r| r.len()).sum()
    }
}
