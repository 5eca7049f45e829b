//! Syntax-aware chunking: cut source files into size-bounded byte ranges
//! along top-level syntax nodes.
//!
//! Uses tree-sitter when a grammar is available, with plain-text boundary
//! search as the fallback for unsupported languages and unparseable input.

mod cursor;
mod error;
mod grammar;

pub use cursor::{ChunkCursor, Chunks, SiblingCursor, TopLevelNodes};
pub use error::ChunkError;
pub use grammar::{grammar_for, parse, supported_languages};

use chunkwise_core::{Backend, ChunkRecord, Language, SizeWindow};
use chunkwise_plaintext::PlainTextChunks;
use tracing::debug;

/// Trait for whole-document chunking.
pub trait Chunker {
    /// Split `source` into consecutive chunk records.
    fn chunk(&self, source: &[u8], language: Language, window: SizeWindow) -> Vec<ChunkRecord>;
}

/// Chunks along the syntax tree. Produces nothing if the document cannot be parsed.
pub struct TreeSitterChunker;

impl TreeSitterChunker {
    pub fn try_chunk(
        &self,
        source: &[u8],
        language: Language,
        window: SizeWindow,
    ) -> Result<Vec<ChunkRecord>, ChunkError> {
        let cursor = ChunkCursor::for_language(language, source, window)?;
        Ok(ChunkRecord::from_spans(
            source,
            cursor.into_chunks(),
            Backend::TreeSitter,
        ))
    }
}

impl Chunker for TreeSitterChunker {
    fn chunk(&self, source: &[u8], language: Language, window: SizeWindow) -> Vec<ChunkRecord> {
        self.try_chunk(source, language, window).unwrap_or_default()
    }
}

/// Chunks on line and whitespace boundaries, ignoring syntax.
pub struct PlainTextChunker;

impl Chunker for PlainTextChunker {
    fn chunk(&self, source: &[u8], _language: Language, window: SizeWindow) -> Vec<ChunkRecord> {
        ChunkRecord::from_spans(
            source,
            PlainTextChunks::new(source, window),
            Backend::PlainText,
        )
    }
}

/// Composite chunker: tries tree-sitter first, falls back to plain text.
pub struct CompositeChunker;

impl Chunker for CompositeChunker {
    fn chunk(&self, source: &[u8], language: Language, window: SizeWindow) -> Vec<ChunkRecord> {
        match TreeSitterChunker.try_chunk(source, language, window) {
            Ok(records) => records,
            Err(err) => {
                debug!(%language, error = %err, "falling back to plain-text chunking");
                PlainTextChunker.chunk(source, language, window)
            }
        }
    }
}

/// Create the default chunker.
pub fn default_chunker() -> CompositeChunker {
    CompositeChunker
}
