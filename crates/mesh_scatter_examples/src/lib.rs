#![forbid(unsafe_code)]

mod meshes;
mod rendering;

pub use meshes::{heightfield_mesh, painted_plane};
pub use rendering::{init_tracing, render_arrays_to_png, DotColor, RenderConfig};
