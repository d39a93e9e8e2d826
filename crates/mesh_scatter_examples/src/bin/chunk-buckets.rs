use glam::{Vec2, Vec4};
use mesh_scatter::prelude::*;
use mesh_scatter_examples::{
    init_tracing, painted_plane, render_arrays_to_png, DotColor, RenderConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let extent = 40.0;
    let chunk_size = 8.0;
    let mesh = painted_plane(20, extent, |_| Vec4::new(1.0, 1.0, 1.0, 1.0))?;

    let config = ScatterConfig::new(1.5).with_chunk_size(chunk_size);
    let mut runner = ScatterRunner::try_new(config, &mesh)?;
    let arrays = runner.regenerate(&mut StdRng::seed_from_u64(3))?;

    // Each chunk owns one contiguous run of the arrays.
    for (key, range) in arrays.chunks.iter() {
        println!("chunk {key:?}: instances {range:?}");
    }
    let center = arrays.chunks.range_at(glam::Vec3::ZERO);
    println!("chunk at the origin holds {} instances", center.len());

    let half = Vec2::splat(extent * 0.5);
    let rc = RenderConfig::new((800, 800), -half, half)
        .with_dot_color(DotColor::Chunk)
        .with_chunk_grid(chunk_size);
    render_arrays_to_png(arrays, &rc, "chunk-buckets.png")?;
    Ok(())
}
