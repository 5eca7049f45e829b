use chunkwise_core::Language;

/// Reasons a document cannot be chunked along its syntax tree.
///
/// All of these are fatal for the document at hand; callers are expected to
/// fall back to plain-text chunking.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("no tree-sitter grammar for {0}")]
    UnsupportedLanguage(Language),

    #[error("grammar rejected by parser: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("parser produced no syntax tree")]
    Parse,

    #[error("syntax tree has no top-level nodes")]
    EmptyTree,
}
