//! Source geometry for scattering.
//!
//! A [`Mesh`] holds the host-supplied vertex attributes as parallel arrays (positions,
//! normals, RGBA colors) plus a flat triangle index list. Vertex colors drive scattering:
//! the red channel is the density signal and the green channel the instance scale.
//!
//! Triangles are exposed as [`Triangle`] views that copy the three vertices out of the
//! parallel arrays.
use glam::{Vec3, Vec4};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod triangle;

pub use triangle::Triangle;

/// Indexed triangle mesh with per-vertex normals and colors.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    colors: Vec<Vec4>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Creates a mesh from parallel vertex arrays and a triangle index list.
    ///
    /// Fails with [`Error::InvalidMesh`] when the vertex arrays differ in length, the index
    /// list is not a multiple of three, or an index is out of range.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        colors: Vec<Vec4>,
        indices: Vec<u32>,
    ) -> Result<Self> {
        let mesh = Self {
            positions,
            normals,
            colors,
            indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Creates a mesh from anything convertible into glam vectors, e.g. `[f32; 3]` arrays
    /// or `mint` vectors handed over by a host engine.
    pub fn from_arrays<P, N, C>(
        positions: impl IntoIterator<Item = P>,
        normals: impl IntoIterator<Item = N>,
        colors: impl IntoIterator<Item = C>,
        indices: impl IntoIterator<Item = u32>,
    ) -> Result<Self>
    where
        P: Into<Vec3>,
        N: Into<Vec3>,
        C: Into<Vec4>,
    {
        Self::new(
            positions.into_iter().map(Into::into).collect(),
            normals.into_iter().map(Into::into).collect(),
            colors.into_iter().map(Into::into).collect(),
            indices.into_iter().collect(),
        )
    }

    /// Checks the parallel-array and index invariants.
    pub fn validate(&self) -> Result<()> {
        let n = self.positions.len();
        if self.normals.len() != n || self.colors.len() != n {
            return Err(Error::InvalidMesh(format!(
                "vertex arrays differ in length (positions {}, normals {}, colors {})",
                n,
                self.normals.len(),
                self.colors.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(Error::InvalidMesh(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some((at, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= n)
        {
            return Err(Error::InvalidMesh(format!(
                "index {index} at position {at} is out of range for {n} vertices"
            )));
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Returns the triangle at `index`, or `None` if it is out of range.
    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        let tri = self.indices.get(index * 3..index * 3 + 3)?;
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        Some(Triangle {
            positions: [
                *self.positions.get(a)?,
                *self.positions.get(b)?,
                *self.positions.get(c)?,
            ],
            normals: [
                *self.normals.get(a)?,
                *self.normals.get(b)?,
                *self.normals.get(c)?,
            ],
            colors: [
                *self.colors.get(a)?,
                *self.colors.get(b)?,
                *self.colors.get(c)?,
            ],
        })
    }

    /// Iterates all triangles in index order.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).filter_map(move |i| self.triangle(i))
    }
}
