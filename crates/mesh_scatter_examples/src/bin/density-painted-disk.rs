use glam::{Vec2, Vec4};
use mesh_scatter::prelude::*;
use mesh_scatter_examples::{init_tracing, painted_plane, render_arrays_to_png, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Only vertices inside the ring carry density; the rest of the plane stays bare.
    let extent = 48.0;
    let mesh = painted_plane(64, extent, |p| {
        let r = p.length();
        let red = if (8.0..16.0).contains(&r) { 1.0 } else { 0.0 };
        Vec4::new(red, 1.0, 0.0, 1.0)
    })?;

    let config = ScatterConfig::new(6.0);
    let mut runner = ScatterRunner::try_new(config, &mesh)?;
    let arrays = runner.regenerate(&mut StdRng::seed_from_u64(7))?;

    let half = Vec2::splat(extent * 0.5);
    let rc = RenderConfig::new((800, 800), -half, half).with_background([10, 10, 30]);
    render_arrays_to_png(arrays, &rc, "density-painted-disk.png")?;
    Ok(())
}
