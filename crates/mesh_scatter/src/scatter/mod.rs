//! Scattering pipeline: encode instances into records, group them by chunk, and decode
//! them into render arrays.
pub mod chunk;
pub mod decode;
pub mod events;
pub mod owner;
pub mod record;
pub mod render;
pub mod runner;

pub use chunk::{
    chunk_key_for_position, try_chunk_key_for_position, ChunkIndex, ChunkKey, DEFAULT_CHUNK_SIZE,
};
pub use decode::{decode_records, ColorSource, DecodeOptions};
pub use owner::OwnerTransform;
pub use record::{Instance, RecordBuffer, RECORD_LEN};
pub use render::{PropertyBlock, RenderArrays, SOURCE_COLORS, SOURCE_NORMALS};
