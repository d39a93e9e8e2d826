//! Top-down PNG previews of render arrays.
use std::path::Path;

use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use mesh_scatter::prelude::*;
use tracing::info;

/// Installs a compact `tracing` subscriber for the example binaries.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

/// How instance dots are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotColor {
    /// RGB of the shader color array.
    Encoded,
    /// A stable tint per chunk.
    Chunk,
}

/// Rendering configuration for [`render_arrays_to_png`].
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// World-space XZ rectangle mapped onto the image.
    pub world_min: Vec2,
    pub world_max: Vec2,
    pub background: [u8; 3],
    /// Dot radius in pixels at instance scale 1.
    pub dot_radius: f32,
    pub dot_color: DotColor,
    /// Draw chunk borders of this size, if set.
    pub chunk_grid: Option<f32>,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32), world_min: Vec2, world_max: Vec2) -> Self {
        Self {
            image_size,
            world_min,
            world_max,
            background: [26, 26, 26],
            dot_radius: 2.0,
            dot_color: DotColor::Encoded,
            chunk_grid: None,
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_dot_radius(mut self, dot_radius: f32) -> Self {
        self.dot_radius = dot_radius;
        self
    }

    pub fn with_dot_color(mut self, dot_color: DotColor) -> Self {
        self.dot_color = dot_color;
        self
    }

    pub fn with_chunk_grid(mut self, chunk_size: f32) -> Self {
        self.chunk_grid = Some(chunk_size);
        self
    }

    fn to_pixel(&self, world: Vec3) -> Vec2 {
        let extent = self.world_max - self.world_min;
        let uv = (Vec2::new(world.x, world.z) - self.world_min) / extent;
        Vec2::new(uv.x * self.image_size.0 as f32, uv.y * self.image_size.1 as f32)
    }
}

fn chunk_tint(key: ChunkKey) -> [u8; 3] {
    let seed = seed_for_triangle(
        ((key.0 as u32 as u64) << 32) | key.2 as u32 as u64,
        key.1 as u32 as usize,
    );
    let [r, g, b, ..] = seed.to_le_bytes();
    [r | 0x40, g | 0x40, b | 0x40]
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn draw_disc(img: &mut RgbImage, center: Vec2, radius: f32, color: [u8; 3]) {
    let r = radius.max(0.5);
    let (w, h) = img.dimensions();
    let x0 = (center.x - r).floor().max(0.0) as u32;
    let y0 = (center.y - r).floor().max(0.0) as u32;
    let x1 = ((center.x + r).ceil().max(0.0) as u32).min(w);
    let y1 = ((center.y + r).ceil().max(0.0) as u32).min(h);
    for y in y0..y1 {
        for x in x0..x1 {
            let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
            if d.length_squared() <= r * r {
                img.put_pixel(x, y, Rgb(color));
            }
        }
    }
}

fn draw_chunk_grid(img: &mut RgbImage, rc: &RenderConfig, chunk_size: f32) {
    let line = Rgb([60, 60, 60]);
    let (w, h) = img.dimensions();
    let first = (rc.world_min / chunk_size).floor() * chunk_size;

    let mut x = first.x;
    while x <= rc.world_max.x {
        let px = rc.to_pixel(Vec3::new(x, 0.0, rc.world_min.y)).x;
        if px >= 0.0 && (px as u32) < w {
            for y in 0..h {
                img.put_pixel(px as u32, y, line);
            }
        }
        x += chunk_size;
    }

    let mut z = first.y;
    while z <= rc.world_max.y {
        let py = rc.to_pixel(Vec3::new(rc.world_min.x, 0.0, z)).y;
        if py >= 0.0 && (py as u32) < h {
            for x in 0..w {
                img.put_pixel(x, py as u32, line);
            }
        }
        z += chunk_size;
    }
}

/// Renders instance positions (projected onto XZ) as dots and writes a PNG to `path`.
pub fn render_arrays_to_png(
    arrays: &RenderArrays,
    rc: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (w, h) = rc.image_size;
    anyhow::ensure!(w > 0 && h > 0, "image size must be non-zero");

    let mut img = RgbImage::from_pixel(w, h, Rgb(rc.background));
    if let Some(chunk_size) = rc.chunk_grid {
        draw_chunk_grid(&mut img, rc, chunk_size);
    }

    let colors = arrays.colors();
    let mut chunk_of = vec![ChunkKey(0, 0, 0); arrays.len()];
    for (key, range) in arrays.chunks.iter() {
        for slot in &mut chunk_of[range] {
            *slot = key;
        }
    }

    for (i, m) in arrays.matrices.iter().enumerate() {
        let (scale, _, translation) = m.to_scale_rotation_translation();
        let color = match rc.dot_color {
            DotColor::Encoded => colors
                .get(i)
                .map(|c| [to_u8(c.x), to_u8(c.y), to_u8(c.z)])
                .unwrap_or([235, 235, 235]),
            DotColor::Chunk => chunk_tint(chunk_of[i]),
        };
        let radius = rc.dot_radius * scale.max_element();
        draw_disc(&mut img, rc.to_pixel(translation), radius, color);
    }

    let path = path.as_ref();
    img.save(path)?;
    info!("Wrote {} instances to {}.", arrays.len(), path.display());
    Ok(())
}
