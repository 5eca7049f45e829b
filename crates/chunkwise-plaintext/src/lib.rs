//! Plain-text boundary search.
//!
//! Locates a "good" place to cut a run of bytes (after a newline, failing
//! that after whitespace) inside a size window. Used by the syntax-aware
//! cursor for nodes too large to emit whole, and on its own as the fallback
//! chunker when no grammar is available.

mod chunks;
mod split;

pub use chunks::PlainTextChunks;
pub use split::find_split_bounds;

use chunkwise_core::SizeWindow;

/// Chooses where to cut the front of a byte slice.
pub trait BoundaryFinder {
    /// Return the length of the prefix of `text` to emit next.
    ///
    /// For non-empty `text` the result must lie in `1..=text.len()`.
    fn find_split(&self, text: &[u8], window: SizeWindow) -> usize;
}

impl<F> BoundaryFinder for F
where
    F: Fn(&[u8], SizeWindow) -> usize,
{
    fn find_split(&self, text: &[u8], window: SizeWindow) -> usize {
        self(text, window)
    }
}

/// Line-then-whitespace boundary finder. See [`find_split_bounds`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextFinder;

impl BoundaryFinder for PlainTextFinder {
    fn find_split(&self, text: &[u8], window: SizeWindow) -> usize {
        find_split_bounds(text, window.min(), window.max())
    }
}
