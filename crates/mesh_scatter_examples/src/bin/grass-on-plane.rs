use glam::{Vec2, Vec4};
use mesh_scatter::prelude::*;
use mesh_scatter_examples::{init_tracing, painted_plane, render_arrays_to_png, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // 64 x 64 plane, red fades out toward +X so grass thins along the axis.
    let extent = 64.0;
    let mesh = painted_plane(32, extent, |p| {
        let red = 1.0 - (p.x / extent + 0.5);
        Vec4::new(red, 0.6 + 0.4 * red, 0.2, 1.0)
    })?;

    let config = ScatterConfig::new(4.0).with_seed(2025);
    let mut runner = ScatterRunner::try_new(config, &mesh)?;
    let mut rng = StdRng::seed_from_u64(2025);
    let arrays = runner.regenerate(&mut rng)?;

    let half = Vec2::splat(extent * 0.5);
    let rc = RenderConfig::new((1000, 1000), -half, half).with_dot_radius(2.5);
    render_arrays_to_png(arrays, &rc, "grass-on-plane.png")?;

    if let Some(stats) = runner.last_stats() {
        println!(
            "placed {} of {} requested instances over {} triangles",
            stats.placed, stats.target, stats.triangles_sampled
        );
    }
    Ok(())
}
