mod types;
mod chunk_manager;

pub use types::{Chunk, LoadShape, UpdateStats};
pub use chunk_manager::ChunkManager;
