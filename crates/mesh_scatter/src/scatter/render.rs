//! Render-ready output of a scatter pass.
use std::collections::BTreeMap;

use glam::{Mat4, Vec4};

use crate::scatter::chunk::{ChunkIndex, ChunkKey};

/// Shader property holding one normal vector per instance.
pub const SOURCE_NORMALS: &str = "sourceNormals";
/// Shader property holding one color vector per instance.
pub const SOURCE_COLORS: &str = "sourceColors";

/// Named per-instance vector arrays bound next to an instanced draw call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBlock {
    vector_arrays: BTreeMap<String, Vec<Vec4>>,
}

impl PropertyBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or replaces) the vector array stored under `name`.
    pub fn set_vector_array(&mut self, name: impl Into<String>, values: Vec<Vec4>) {
        self.vector_arrays.insert(name.into(), values);
    }

    pub fn vector_array(&self, name: &str) -> Option<&[Vec4]> {
        self.vector_arrays.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.vector_arrays.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vector_arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector_arrays.is_empty()
    }
}

/// Index-aligned instance matrices and shader properties for one scatter pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderArrays {
    /// Local-to-world matrix per instance.
    pub matrices: Vec<Mat4>,
    /// [`SOURCE_NORMALS`] and [`SOURCE_COLORS`], one entry per matrix.
    pub properties: PropertyBlock,
    /// Contiguous instance range per chunk.
    pub chunks: ChunkIndex,
}

impl RenderArrays {
    /// Bundles matrices with their normal and color arrays.
    pub fn new(matrices: Vec<Mat4>, normals: Vec<Vec4>, colors: Vec<Vec4>) -> Self {
        debug_assert_eq!(matrices.len(), normals.len());
        debug_assert_eq!(matrices.len(), colors.len());
        let mut properties = PropertyBlock::new();
        properties.set_vector_array(SOURCE_NORMALS, normals);
        properties.set_vector_array(SOURCE_COLORS, colors);
        Self {
            matrices,
            properties,
            chunks: ChunkIndex::default(),
        }
    }

    pub fn with_chunks(mut self, chunks: ChunkIndex) -> Self {
        self.chunks = chunks;
        self
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn normals(&self) -> &[Vec4] {
        self.properties.vector_array(SOURCE_NORMALS).unwrap_or(&[])
    }

    pub fn colors(&self) -> &[Vec4] {
        self.properties.vector_array(SOURCE_COLORS).unwrap_or(&[])
    }

    /// Matrices of the instances in chunk `key`.
    pub fn chunk_matrices(&self, key: ChunkKey) -> &[Mat4] {
        self.chunks
            .get(key)
            .and_then(|range| self.matrices.get(range))
            .unwrap_or(&[])
    }
}
