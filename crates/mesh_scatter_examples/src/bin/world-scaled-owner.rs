use glam::{Quat, Vec2, Vec3, Vec4};
use mesh_scatter::prelude::*;
use mesh_scatter_examples::{init_tracing, painted_plane, render_arrays_to_png, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mesh = painted_plane(8, 8.0, |_| Vec4::new(1.0, 0.5, 0.5, 1.0))?;
    let owner = OwnerTransform::from_scale_rotation_translation(
        Vec3::splat(4.0),
        Quat::from_rotation_y(0.3),
        Vec3::ZERO,
    );

    // Local-space counts ignore the owner's scale; world-space counts and sizes follow it.
    for world_space_scale in [false, true] {
        let config = ScatterConfig::new(2.0)
            .with_world_space_scale(world_space_scale)
            .with_seed(11);
        let mut runner = ScatterRunner::try_new(config, &mesh)?.with_owner(owner);
        let arrays = runner.regenerate(&mut StdRng::seed_from_u64(11))?;

        let (scale, _, _) = arrays.matrices[0].to_scale_rotation_translation();
        println!(
            "world_space_scale={world_space_scale}: {} instances, first instance world scale {:.2}",
            arrays.len(),
            scale.x
        );

        let rc = RenderConfig::new((800, 800), Vec2::splat(-20.0), Vec2::splat(20.0))
            .with_dot_radius(3.0);
        let out = format!("world-scaled-owner-{world_space_scale}.png");
        render_arrays_to_png(arrays, &rc, out)?;
    }
    Ok(())
}
