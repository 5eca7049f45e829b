//! Shared types for chunkwise: source languages, size windows and the
//! records emitted for each chunk.

mod types;

pub use types::{Backend, ChunkRecord, InvalidWindow, Language, SizeWindow, UnknownLanguage};
