//! Syntax-aware chunk cursor.
//!
//! Walks the top-level nodes of a syntax tree and greedily packs consecutive
//! siblings into chunks no larger than the window's `max`. A node that is
//! larger than `max` on its own is cut with a [`BoundaryFinder`], possibly
//! across several calls; the cursor remembers how far into the node it got.

use std::ops::Range;

use chunkwise_core::{Language, SizeWindow};
use chunkwise_plaintext::{BoundaryFinder, PlainTextFinder};
use tracing::{debug, trace};

use crate::ChunkError;
use crate::grammar::{grammar_for, parse};

/// Position over a run of sibling nodes.
pub trait SiblingCursor {
    /// Byte span of the node the cursor is on.
    fn node_span(&self) -> Range<usize>;

    /// Move to the next sibling. Returns false, staying put, if there is none.
    fn goto_next_sibling(&mut self) -> bool;
}

impl SiblingCursor for tree_sitter::TreeCursor<'_> {
    fn node_span(&self) -> Range<usize> {
        self.node().byte_range()
    }

    fn goto_next_sibling(&mut self) -> bool {
        tree_sitter::TreeCursor::goto_next_sibling(self)
    }
}

/// Owned snapshot of the root node's children.
///
/// Detaches the cursor from the `Tree`'s lifetime so a [`ChunkCursor`] can
/// parse and own everything it needs.
#[derive(Debug, Clone)]
pub struct TopLevelNodes {
    spans: Vec<Range<usize>>,
    current: usize,
}

impl TopLevelNodes {
    pub fn from_tree(tree: &tree_sitter::Tree) -> Result<Self, ChunkError> {
        let mut cursor = tree.walk();
        if !cursor.goto_first_child() {
            return Err(ChunkError::EmptyTree);
        }

        let mut spans = vec![cursor.node().byte_range()];
        while cursor.goto_next_sibling() {
            spans.push(cursor.node().byte_range());
        }
        Self::from_spans(spans)
    }

    pub fn from_spans(spans: Vec<Range<usize>>) -> Result<Self, ChunkError> {
        if spans.is_empty() {
            return Err(ChunkError::EmptyTree);
        }
        Ok(Self { spans, current: 0 })
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl SiblingCursor for TopLevelNodes {
    fn node_span(&self) -> Range<usize> {
        self.spans[self.current].clone()
    }

    fn goto_next_sibling(&mut self) -> bool {
        if self.current + 1 < self.spans.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }
}

/// Emits bounded chunks of a source buffer, one per call to [`next_span`].
///
/// Chunks are consecutive and together cover the whole buffer: bytes between
/// top-level nodes travel with the chunk that follows them, and the last
/// chunk runs to the end of the buffer. Such trivia is split off into chunks
/// of its own when carrying it would push a chunk past `max`.
///
/// A `ChunkCursor` is a single-owner state machine. It performs no locking
/// and must be driven from one thread of control; give each consumer its own
/// cursor. The source buffer is only ever read.
///
/// [`next_span`]: ChunkCursor::next_span
pub struct ChunkCursor<'src, C = TopLevelNodes, F = PlainTextFinder> {
    source: &'src [u8],
    window: SizeWindow,
    nodes: C,
    finder: F,
    /// Bytes of the current node already emitted by earlier calls.
    offset: usize,
    /// End of the last emitted chunk.
    emitted: usize,
    /// Every node is consumed; only trailing trivia remains, cut by the finder.
    tail_pending: bool,
}

impl<'src> ChunkCursor<'src> {
    /// Parse `source` and position on its first top-level node.
    pub fn new(
        grammar: &tree_sitter::Language,
        source: &'src [u8],
        window: SizeWindow,
    ) -> Result<Self, ChunkError> {
        let tree = parse(grammar, source)?;
        let nodes = TopLevelNodes::from_tree(&tree)?;
        debug!(nodes = nodes.len(), bytes = source.len(), %window, "parsed source");
        Ok(Self::with_parts(source, window, nodes, PlainTextFinder))
    }

    /// Like [`ChunkCursor::new`], looking the grammar up by language.
    pub fn for_language(
        language: Language,
        source: &'src [u8],
        window: SizeWindow,
    ) -> Result<Self, ChunkError> {
        let grammar = grammar_for(language).ok_or(ChunkError::UnsupportedLanguage(language))?;
        Self::new(&grammar, source, window)
    }
}

impl<'src, C: SiblingCursor, F: BoundaryFinder> ChunkCursor<'src, C, F> {
    /// Build a cursor over an already positioned sibling cursor.
    pub fn with_parts(source: &'src [u8], window: SizeWindow, nodes: C, finder: F) -> Self {
        Self {
            source,
            window,
            nodes,
            finder,
            offset: 0,
            emitted: 0,
            tail_pending: false,
        }
    }

    pub fn window(&self) -> SizeWindow {
        self.window
    }

    /// Bytes of the current node emitted so far; zero unless mid-node.
    pub fn resume_offset(&self) -> usize {
        self.offset
    }

    /// Emit the next chunk and report whether more follow.
    ///
    /// Once this returns `false` the cursor is exhausted; further calls are
    /// a logic error and yield unspecified spans.
    pub fn next_chunk(&mut self) -> (&'src [u8], bool) {
        let source = self.source;
        let (span, more) = self.next_span();
        (&source[span], more)
    }

    /// Byte range form of [`ChunkCursor::next_chunk`].
    pub fn next_span(&mut self) -> (Range<usize>, bool) {
        loop {
            let (span, more) = self.step();
            if span.is_empty() && more {
                continue;
            }
            return (span, more);
        }
    }

    /// Drain the cursor as an iterator of spans.
    pub fn into_chunks(self) -> Chunks<'src, C, F> {
        Chunks {
            cursor: self,
            done: false,
        }
    }

    fn step(&mut self) -> (Range<usize>, bool) {
        if self.tail_pending {
            let start = self.emitted;
            let end = start + self.find_cut(start);
            self.emitted = end;
            return (start..end, end < self.source.len());
        }

        let node = self.nodes.node_span();
        assert!(
            node.start <= node.end && node.end <= self.source.len(),
            "node span {node:?} outside {}-byte source",
            self.source.len()
        );
        let start = self.emitted;
        let node_start = node.start + self.offset;
        debug_assert!(start <= node_start);

        if !self.window.fits(node.end - node_start) {
            return self.split_oversized(start, node);
        }

        if !self.window.fits(node.end - start) {
            // The node fits but not together with the trivia before it.
            let end = (start + self.find_cut(start)).min(node_start);
            trace!(start, end, "emitted leading trivia");
            self.emitted = end;
            return (start..end, true);
        }

        self.offset = 0;
        let mut end = node.end;
        let mut more = false;
        while self.nodes.goto_next_sibling() {
            let sibling = self.nodes.node_span();
            if !self.window.fits(sibling.end - start) {
                // Leave the cursor on this sibling; it opens the next chunk.
                more = true;
                break;
            }
            end = sibling.end;
        }
        trace!(start, end, more, "packed siblings");
        self.emit(start, end, more)
    }

    fn split_oversized(&mut self, start: usize, node: Range<usize>) -> (Range<usize>, bool) {
        let split_end = start + self.find_cut(start);
        if split_end >= node.end {
            self.offset = 0;
            let more = self.nodes.goto_next_sibling();
            trace!(start, end = node.end, more, "finished oversized node");
            return self.emit(start, node.end, more);
        }

        self.offset = split_end.saturating_sub(node.start);
        debug!(start, end = split_end, offset = self.offset, "split oversized node");
        self.emit(start, split_end, true)
    }

    /// Length of the next piece starting at `start`, as chosen by the finder.
    fn find_cut(&self, start: usize) -> usize {
        let rest = &self.source[start..];
        let split = self.finder.find_split(rest, self.window);
        assert!(
            split > 0 && split <= rest.len(),
            "boundary finder returned {split} for {} remaining bytes",
            rest.len()
        );
        split
    }

    fn emit(&mut self, start: usize, end: usize, more: bool) -> (Range<usize>, bool) {
        let mut end = end;
        let mut more = more;
        if !more {
            let tail = self.source.len();
            if end == tail || self.window.fits(tail - start) {
                end = tail;
            } else {
                self.tail_pending = true;
                more = true;
            }
        }
        self.emitted = end;
        (start..end, more)
    }
}

/// Iterator returned by [`ChunkCursor::into_chunks`].
pub struct Chunks<'src, C, F> {
    cursor: ChunkCursor<'src, C, F>,
    done: bool,
}

impl<C: SiblingCursor, F: BoundaryFinder> Iterator for Chunks<'_, C, F> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (span, more) = self.cursor.next_span();
        self.done = !more;
        Some(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(min: usize, max: usize) -> SizeWindow {
        SizeWindow::new(min, max).unwrap()
    }

    /// Drive a cursor until it reports no more chunks.
    fn drain<C: SiblingCursor, F: BoundaryFinder>(
        mut cursor: ChunkCursor<'_, C, F>,
    ) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        loop {
            let (span, more) = cursor.next_span();
            spans.push(span);
            if !more {
                return spans;
            }
            assert!(spans.len() < 10_000, "cursor did not terminate");
        }
    }

    fn assert_covers(spans: &[Range<usize>], len: usize) {
        assert_eq!(spans.first().map(|s| s.start), Some(0));
        assert_eq!(spans.last().map(|s| s.end), Some(len));
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap or overlap in {spans:?}");
        }
    }

    /// 50 top-level `const` items, 20 bytes per line.
    fn fifty_consts() -> String {
        (0..50).map(|i| format!("const A{i:02}: u32 = 0;\n")).collect()
    }

    fn statement_spans(lines: usize, width: usize) -> Vec<Range<usize>> {
        (0..lines).map(|i| i * width..(i + 1) * width - 1).collect()
    }

    #[test]
    fn packs_whole_statements_up_to_max() {
        let source = fifty_consts();
        assert_eq!(source.len(), 1000);
        let nodes = TopLevelNodes::from_spans(statement_spans(50, 20)).unwrap();
        let cursor = ChunkCursor::with_parts(source.as_bytes(), window(100, 150), nodes, PlainTextFinder);

        let spans = drain(cursor);
        assert_covers(&spans, 1000);
        assert_eq!(spans.len(), 8);
        assert_eq!(spans[0], 0..139);
        assert_eq!(spans[1], 139..279);
        for span in &spans {
            assert!(span.len() <= 150, "{span:?} exceeds max");
        }
        for span in &spans[..7] {
            assert!(span.len() >= 100, "{span:?} below min");
        }
    }

    #[test]
    fn parsed_statements_match_synthetic_nodes() {
        let source = fifty_consts();
        let parsed = ChunkCursor::for_language(Language::Rust, source.as_bytes(), window(100, 150))
            .unwrap();
        let nodes = TopLevelNodes::from_spans(statement_spans(50, 20)).unwrap();
        let synthetic =
            ChunkCursor::with_parts(source.as_bytes(), window(100, 150), nodes, PlainTextFinder);

        assert_eq!(drain(parsed), drain(synthetic));
    }

    #[test]
    fn whole_document_in_one_chunk_when_it_fits() {
        let source = fifty_consts();
        let mut cursor =
            ChunkCursor::for_language(Language::Rust, source.as_bytes(), window(0, 100_000))
                .unwrap();
        let (chunk, more) = cursor.next_chunk();
        assert_eq!(chunk, source.as_bytes());
        assert!(!more);
    }

    #[test]
    fn single_node_without_siblings_ends_iteration() {
        let source = b"fn main() {}\n";
        let mut cursor = ChunkCursor::for_language(Language::Rust, source, window(0, 64)).unwrap();
        let (chunk, more) = cursor.next_chunk();
        assert_eq!(chunk, source);
        assert!(!more);
    }

    #[test]
    fn node_exactly_max_is_not_split() {
        let source = b"0123456789";
        let nodes = TopLevelNodes::from_spans(vec![0..10]).unwrap();
        let mut cursor = ChunkCursor::with_parts(&source[..], window(0, 10), nodes, PlainTextFinder);
        assert_eq!(cursor.next_span(), (0..10, false));
    }

    /// A 500-byte node with spaces at 60, 140, 210, 280, 350, 420 and 490.
    fn spaced_node() -> Vec<u8> {
        let mut source = vec![b'x'; 500];
        for pos in [60, 140, 210, 280, 350, 420, 490] {
            source[pos] = b' ';
        }
        source
    }

    #[test]
    fn oversized_node_is_split_on_whitespace() {
        let source = spaced_node();
        let nodes = TopLevelNodes::from_spans(vec![0..500]).unwrap();
        let cursor = ChunkCursor::with_parts(&source[..], window(50, 100), nodes, PlainTextFinder);

        let spans = drain(cursor);
        assert_covers(&spans, 500);
        assert_eq!(
            spans,
            vec![0..61, 61..141, 141..211, 211..281, 281..351, 351..421, 421..500]
        );
        for span in &spans[..spans.len() - 1] {
            assert!(span.len() > 50 && span.len() <= 100, "{span:?} outside window");
        }
    }

    #[test]
    fn resume_offset_tracks_partial_node() {
        let source = spaced_node();
        let nodes = TopLevelNodes::from_spans(vec![0..500]).unwrap();
        let mut cursor =
            ChunkCursor::with_parts(&source[..], window(50, 100), nodes, PlainTextFinder);

        assert_eq!(cursor.resume_offset(), 0);
        assert_eq!(cursor.next_span(), (0..61, true));
        assert_eq!(cursor.resume_offset(), 61);
        assert_eq!(cursor.next_span(), (61..141, true));
        assert_eq!(cursor.resume_offset(), 141);
    }

    #[test]
    fn resume_offset_resets_on_next_node() {
        let mut source = spaced_node();
        source.extend_from_slice(b"\nshort;");
        let nodes = TopLevelNodes::from_spans(vec![0..500, 501..507]).unwrap();
        let mut cursor =
            ChunkCursor::with_parts(&source[..], window(50, 100), nodes, PlainTextFinder);

        let mut last = (0..0, true);
        while last.1 {
            last = cursor.next_span();
            if last.0.end == 500 {
                assert_eq!(cursor.resume_offset(), 0);
            }
        }
        // The tail of the big node and the short node pack together.
        assert_eq!(last.0, 421..507);
        assert_eq!(cursor.resume_offset(), 0);
    }

    #[test]
    fn finder_cut_past_node_end_stops_at_node() {
        // 30-byte node followed by a 5-byte node; the finder wants 33 bytes.
        let source = vec![b'a'; 35];
        let nodes = TopLevelNodes::from_spans(vec![0..30, 30..35]).unwrap();
        let finder = |_: &[u8], _: SizeWindow| 33;
        let mut cursor = ChunkCursor::with_parts(&source[..], window(0, 20), nodes, finder);

        assert_eq!(cursor.next_span(), (0..30, true));
        assert_eq!(cursor.resume_offset(), 0);
        assert_eq!(cursor.next_span(), (30..35, false));
    }

    #[test]
    fn sibling_too_large_is_held_for_next_call() {
        let source = vec![b'a'; 100];
        let nodes = TopLevelNodes::from_spans(vec![0..10, 10..20, 20..90, 90..100]).unwrap();
        let mut cursor =
            ChunkCursor::with_parts(&source[..], window(0, 25), nodes, |t: &[u8], _: SizeWindow| {
                t.len().min(25)
            });

        assert_eq!(cursor.next_span(), (0..20, true));
        // 20..90 is 70 bytes, so it is cut by the finder.
        assert_eq!(cursor.next_span(), (20..45, true));
        assert_eq!(cursor.resume_offset(), 25);
        assert_eq!(cursor.next_span(), (45..70, true));
        assert_eq!(cursor.next_span(), (70..90, true));
        assert_eq!(cursor.resume_offset(), 0);
        assert_eq!(cursor.next_span(), (90..100, false));
    }

    #[test]
    fn leading_and_inter_node_trivia_are_covered() {
        let source = b"\n\n  fn a() {}\n\n\nfn b() {}\n\n";
        let cursor = ChunkCursor::for_language(Language::Rust, source, window(0, 14)).unwrap();
        let spans = drain(cursor);
        assert_covers(&spans, source.len());
        assert_eq!(spans.len(), 2);
        assert!(source[spans[0].clone()].starts_with(b"\n\n  fn a()"));
        assert!(source[spans[1].clone()].ends_with(b"fn b() {}\n\n"));
    }

    #[test]
    fn trailing_trivia_past_max_is_cut_within_window() {
        let mut source = b"abc".to_vec();
        source.extend(std::iter::repeat_n(b'\n', 20));
        let nodes = TopLevelNodes::from_spans(vec![0..3]).unwrap();
        let mut cursor = ChunkCursor::with_parts(&source[..], window(5, 10), nodes, PlainTextFinder);

        assert_eq!(cursor.next_span(), (0..3, true));
        assert_eq!(cursor.next_span(), (3..9, true));
        assert_eq!(cursor.next_span(), (9..15, true));
        assert_eq!(cursor.next_span(), (15..23, false));
    }

    #[test]
    fn short_trailing_trivia_joins_last_chunk() {
        let source = b"abc\n\n";
        let nodes = TopLevelNodes::from_spans(vec![0..3]).unwrap();
        let mut cursor = ChunkCursor::with_parts(&source[..], window(0, 10), nodes, PlainTextFinder);
        assert_eq!(cursor.next_span(), (0..5, false));
    }

    /// A 100-byte node, five newlines, then a 96-byte node.
    fn gap_before_fitting_node(newline_inside: bool) -> (Vec<u8>, TopLevelNodes) {
        let mut source = vec![b'a'; 100];
        source.extend(std::iter::repeat_n(b'\n', 5));
        source.extend(std::iter::repeat_n(b'b', 96));
        if newline_inside {
            source[165] = b'\n';
        }
        let nodes = TopLevelNodes::from_spans(vec![0..100, 105..201]).unwrap();
        (source, nodes)
    }

    #[test]
    fn leading_trivia_does_not_split_a_fitting_node() {
        for newline_inside in [true, false] {
            let (source, nodes) = gap_before_fitting_node(newline_inside);
            let cursor =
                ChunkCursor::with_parts(&source[..], window(50, 100), nodes, PlainTextFinder);

            let spans = drain(cursor);
            assert_covers(&spans, 201);
            assert_eq!(spans, vec![0..100, 100..105, 105..201]);
        }
    }

    #[test]
    fn real_function_of_exactly_max_stays_whole() {
        let fn_a = format!("fn a() {{\n{}}}", "    let x = 1;\n".repeat(5));
        let fn_b = format!("fn b() {{\n{}}}", "    let y = 1;\n".repeat(6));
        assert_eq!(fn_b.len(), 100);
        let source = format!("{fn_a}\n\n\n\n\n{fn_b}\n");

        let cursor =
            ChunkCursor::for_language(Language::Rust, source.as_bytes(), window(20, 100)).unwrap();
        let spans = drain(cursor);

        assert_covers(&spans, source.len());
        for span in &spans {
            assert!(span.len() <= 100, "{span:?} exceeds max");
        }
        assert!(
            spans.iter().any(|s| &source.as_bytes()[s.clone()] == fn_b.as_bytes()),
            "fn b was cut: {spans:?}"
        );
    }

    #[test]
    fn zero_width_nodes_do_not_produce_empty_chunks() {
        let source = vec![b'a'; 40];
        let nodes = TopLevelNodes::from_spans(vec![0..0, 0..30, 30..40]).unwrap();
        let finder = |t: &[u8], _: SizeWindow| t.len().min(20);
        let cursor = ChunkCursor::with_parts(&source[..], window(0, 20), nodes, finder);

        let spans = drain(cursor);
        assert_covers(&spans, 40);
        assert!(spans.iter().all(|s| !s.is_empty()), "empty chunk in {spans:?}");
    }

    #[test]
    fn splitting_a_real_function_body() {
        let mut source = String::from("fn big() {\n");
        for i in 0..40 {
            source.push_str(&format!("    let x{i:02} = 1;\n"));
        }
        source.push_str("}\n\nfn small() {}\n");

        let cursor =
            ChunkCursor::for_language(Language::Rust, source.as_bytes(), window(50, 120)).unwrap();
        let spans = drain(cursor);

        assert_covers(&spans, source.len());
        assert!(spans.len() >= 5);
        for span in &spans {
            assert!(span.len() <= 120, "{span:?} exceeds max");
        }
        let text: Vec<&str> = spans
            .iter()
            .map(|s| std::str::from_utf8(&source.as_bytes()[s.clone()]).unwrap())
            .collect();
        assert!(text.last().unwrap().ends_with("fn small() {}\n"));
    }

    #[test]
    fn terminates_within_bound() {
        let text: String = (0..200)
            .map(|i| format!("x{i} = {i}\n"))
            .collect();
        let (min, max) = (16, 48);
        let cursor = ChunkCursor::for_language(Language::Python, text.as_bytes(), window(min, max))
            .unwrap();
        let spans = drain(cursor);
        assert_covers(&spans, text.len());
        assert!(spans.len() <= text.len() / min + 2);
    }

    #[test]
    fn construction_is_deterministic() {
        let source = "def a():\n    return 1\n\nclass B:\n    pass\n\nprint(a())\n";
        let make = || {
            ChunkCursor::for_language(Language::Python, source.as_bytes(), window(4, 24)).unwrap()
        };
        assert_eq!(drain(make()), drain(make()));
    }

    #[test]
    fn into_chunks_stops_after_final_chunk() {
        let source = fifty_consts();
        let cursor =
            ChunkCursor::for_language(Language::Rust, source.as_bytes(), window(100, 150)).unwrap();
        let spans: Vec<_> = cursor.into_chunks().collect();
        assert_eq!(spans.len(), 8);
        assert_covers(&spans, source.len());
    }

    #[test]
    fn live_tree_cursor_drives_chunking() {
        let source = fifty_consts();
        let grammar = grammar_for(Language::Rust).unwrap();
        let tree = parse(&grammar, source.as_bytes()).unwrap();
        let mut walk = tree.walk();
        assert!(walk.goto_first_child());

        let live =
            ChunkCursor::with_parts(source.as_bytes(), window(100, 150), walk, PlainTextFinder);
        let owned =
            ChunkCursor::for_language(Language::Rust, source.as_bytes(), window(100, 150)).unwrap();
        assert_eq!(drain(live), drain(owned));
    }

    #[test]
    fn empty_source_is_an_empty_tree() {
        let result = ChunkCursor::for_language(Language::Rust, b"", window(0, 10));
        assert!(matches!(result, Err(ChunkError::EmptyTree)));

        let result = ChunkCursor::for_language(Language::Python, b"   \n\n", window(0, 10));
        assert!(matches!(result, Err(ChunkError::EmptyTree)));
    }

    #[test]
    fn empty_span_list_is_an_empty_tree() {
        assert!(matches!(
            TopLevelNodes::from_spans(vec![]),
            Err(ChunkError::EmptyTree)
        ));
    }

    #[test]
    fn unsupported_language_is_rejected() {
        let result = ChunkCursor::for_language(Language::Markdown, b"# title\n", window(0, 10));
        assert!(matches!(
            result,
            Err(ChunkError::UnsupportedLanguage(Language::Markdown))
        ));
    }

    #[test]
    #[should_panic(expected = "boundary finder returned 0")]
    fn stalled_finder_panics() {
        let source = vec![b'a'; 50];
        let nodes = TopLevelNodes::from_spans(vec![0..50]).unwrap();
        let stalled = |_: &[u8], _: SizeWindow| 0;
        let mut cursor = ChunkCursor::with_parts(&source[..], window(0, 10), nodes, stalled);
        cursor.next_span();
    }

    #[test]
    #[should_panic(expected = "remaining bytes")]
    fn overreaching_finder_panics() {
        let source = vec![b'a'; 50];
        let nodes = TopLevelNodes::from_spans(vec![0..50]).unwrap();
        let overreach = |t: &[u8], _: SizeWindow| t.len() + 1;
        let mut cursor = ChunkCursor::with_parts(&source[..], window(0, 10), nodes, overreach);
        cursor.next_span();
    }

    #[test]
    #[should_panic(expected = "outside 5-byte source")]
    fn node_outside_source_panics() {
        let nodes = TopLevelNodes::from_spans(vec![0..9]).unwrap();
        let mut cursor = ChunkCursor::with_parts(&b"abcde"[..], window(0, 100), nodes, PlainTextFinder);
        cursor.next_span();
    }
}
