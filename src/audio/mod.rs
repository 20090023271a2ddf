pub mod chunk;
pub mod file;
pub mod source;

pub use chunk::{AudioChunk, Chunker, ChunkerConfig};
pub use file::{AudioFile, FileChunkSource};
pub use source::{AudioFrame, ChunkSource, StreamChunkSource};
