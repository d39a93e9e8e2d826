//! Procedural meshes with painted vertex colors.
use glam::{Vec2, Vec3, Vec4};
use mesh_scatter::prelude::*;

/// Flat XZ plane of `cells x cells` quads centered on the origin.
///
/// `paint` receives the vertex position in the XZ plane and returns its RGBA color.
pub fn painted_plane(cells: u32, extent: f32, paint: impl Fn(Vec2) -> Vec4) -> Result<Mesh> {
    heightfield_mesh(cells, extent, |_| 0.0, paint)
}

/// XZ grid displaced along Y by `height`, with normals from central differences.
pub fn heightfield_mesh(
    cells: u32,
    extent: f32,
    height: impl Fn(Vec2) -> f32,
    paint: impl Fn(Vec2) -> Vec4,
) -> Result<Mesh> {
    if cells == 0 {
        return Err(Error::InvalidMesh("grid needs at least one cell".into()));
    }
    let verts = cells + 1;
    let step = extent / cells as f32;
    let half = extent * 0.5;
    let eps = step * 0.5;

    let count = (verts * verts) as usize;
    let mut positions = Vec::with_capacity(count);
    let mut normals = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);

    for z in 0..verts {
        for x in 0..verts {
            let p = Vec2::new(x as f32 * step - half, z as f32 * step - half);
            positions.push(Vec3::new(p.x, height(p), p.y));

            let dx = height(p + Vec2::X * eps) - height(p - Vec2::X * eps);
            let dz = height(p + Vec2::Y * eps) - height(p - Vec2::Y * eps);
            normals.push(Vec3::new(-dx, 2.0 * eps, -dz).normalize_or(Vec3::Y));

            colors.push(paint(p));
        }
    }

    let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
    for z in 0..cells {
        for x in 0..cells {
            let i = z * verts + x;
            indices.extend_from_slice(&[i, i + verts, i + 1, i + 1, i + verts, i + verts + 1]);
        }
    }

    Mesh::new(positions, normals, colors, indices)
}
