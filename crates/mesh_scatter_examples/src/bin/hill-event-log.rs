use glam::{Vec2, Vec4};
use mesh_scatter::prelude::*;
use mesh_scatter_examples::{heightfield_mesh, init_tracing, render_arrays_to_png, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // A hill whose slopes are painted redder than the density allows, to show saturation.
    let extent = 32.0;
    let mesh = heightfield_mesh(
        24,
        extent,
        |p| 6.0 * (-p.length_squared() / 80.0).exp(),
        |p| {
            let red = 0.5 + 2.0 * (-p.length_squared() / 40.0).exp();
            Vec4::new(red, 0.8, 0.3, 1.0)
        },
    )?;

    let config = ScatterConfig::new(2.0).with_max_rejections(64);
    let mut runner = ScatterRunner::try_new(config, &mesh)?;

    let mut sampled = 0usize;
    let mut sink = FnSink::new(|event: ScatterEvent| match event {
        ScatterEvent::TriangleSampled { .. } => sampled += 1,
        ScatterEvent::Warning { context, message } => println!("warning [{context}]: {message}"),
        ScatterEvent::RunFinished { stats } => println!("finished: {stats:?}"),
        other => println!("{other:?}"),
    });
    let arrays = runner.regenerate_with_events(&mut StdRng::seed_from_u64(5), &mut sink)?;
    let count = arrays.len();
    println!("{sampled} triangles produced {count} instances");

    let half = Vec2::splat(extent * 0.5);
    let rc = RenderConfig::new((800, 800), -half, half);
    if let Some(arrays) = runner.current() {
        render_arrays_to_png(arrays, &rc, "hill-event-log.png")?;
    }
    Ok(())
}
