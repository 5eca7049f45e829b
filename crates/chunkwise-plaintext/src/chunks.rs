use std::ops::Range;

use chunkwise_core::SizeWindow;

use crate::{BoundaryFinder, PlainTextFinder};

/// Splits a whole buffer into consecutive spans using a [`BoundaryFinder`].
///
/// Spans cover the buffer exactly, in order. An empty buffer yields nothing.
pub struct PlainTextChunks<'a, F = PlainTextFinder> {
    text: &'a [u8],
    window: SizeWindow,
    finder: F,
    pos: usize,
}

impl<'a> PlainTextChunks<'a> {
    pub fn new(text: &'a [u8], window: SizeWindow) -> Self {
        Self::with_finder(text, window, PlainTextFinder)
    }
}

impl<'a, F: BoundaryFinder> PlainTextChunks<'a, F> {
    pub fn with_finder(text: &'a [u8], window: SizeWindow, finder: F) -> Self {
        Self {
            text,
            window,
            finder,
            pos: 0,
        }
    }
}

impl<F: BoundaryFinder> Iterator for PlainTextChunks<'_, F> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return None;
        }

        let split = self.finder.find_split(rest, self.window);
        assert!(
            split > 0 && split <= rest.len(),
            "boundary finder returned {split} for {} remaining bytes",
            rest.len()
        );

        let start = self.pos;
        self.pos += split;
        Some(start..self.pos)
    }
}
