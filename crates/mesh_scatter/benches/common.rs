#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::{Vec3, Vec4};
use mesh_scatter::mesh::Mesh;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Flat XZ grid of `cells x cells` quads spanning `extent`, red ramping along X.
pub fn grid_mesh(cells: u32, extent: f32) -> Mesh {
    let verts = cells + 1;
    let step = extent / cells as f32;

    let mut positions = Vec::with_capacity((verts * verts) as usize);
    let mut colors = Vec::with_capacity((verts * verts) as usize);
    for z in 0..verts {
        for x in 0..verts {
            positions.push(Vec3::new(x as f32 * step, 0.0, z as f32 * step));
            let red = x as f32 / cells as f32;
            colors.push(Vec4::new(red, 1.0, 0.0, 1.0));
        }
    }
    let normals = vec![Vec3::Y; positions.len()];

    let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
    for z in 0..cells {
        for x in 0..cells {
            let i = z * verts + x;
            indices.extend_from_slice(&[i, i + verts, i + 1, i + 1, i + verts, i + verts + 1]);
        }
    }

    Mesh::new(positions, normals, colors, indices).expect("grid mesh is valid")
}
