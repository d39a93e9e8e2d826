#![forbid(unsafe_code)]
//! mesh_scatter: Density-weighted instance scattering over vertex-painted triangle meshes.
//!
//! Modules:
//! - mesh: source geometry (positions, normals, vertex colors, triangle indices)
//! - sampling: uniform barycentric sampling and per-triangle rejection sampling
//! - scatter: instance records, chunk grouping, decoding to render arrays, runner, events
//!
//! The red vertex channel drives density and the green channel drives instance scale.
//! For examples and docs, see README and docs.rs.
pub mod error;
pub mod mesh;
pub mod sampling;
pub mod scatter;

/// Convenient re-exports for common types. Import with `use mesh_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::mesh::{Mesh, Triangle};
    pub use crate::sampling::{Barycentric, TriangleSample, TriangleSampler};
    pub use crate::scatter::chunk::{
        chunk_key_for_position, seed_for_triangle, try_chunk_key_for_position, ChunkIndex,
        ChunkKey,
    };
    pub use crate::scatter::decode::{decode_records, ColorSource, DecodeOptions};
    pub use crate::scatter::events::{
        EventSink, FnSink, MultiSink, ScatterEvent, ScatterEventKind, VecSink,
    };
    pub use crate::scatter::owner::OwnerTransform;
    pub use crate::scatter::record::{Instance, RecordBuffer, RECORD_LEN};
    pub use crate::scatter::render::{
        PropertyBlock, RenderArrays, SOURCE_COLORS, SOURCE_NORMALS,
    };
    pub use crate::scatter::runner::{
        pack_records, regenerate_with_events, scatter_mesh, scatter_mesh_with_events,
        ScatterConfig, ScatterOutput, ScatterRunner, ScatterStats,
    };
}
