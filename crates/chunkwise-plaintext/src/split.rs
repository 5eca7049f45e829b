/// Find where to cut the front of `text` so the piece lands in `(min, max]`.
///
/// Cuts always fall just after a boundary byte, so the returned offset is the
/// length of the piece to take:
///
/// 1. all of `text` if it is no longer than `max`;
/// 2. otherwise just after the first `\n` with a cut in `(min, max]`;
/// 3. otherwise just after the first ASCII whitespace with a cut in `(min, max]`;
/// 4. otherwise all of `text`.
///
/// The result is never 0 for non-empty input. Boundary bytes are ASCII, so
/// UTF-8 text is never cut inside a code point.
pub fn find_split_bounds(text: &[u8], min: usize, max: usize) -> usize {
    if text.len() <= max {
        return text.len();
    }

    first_cut(text, min, max, |b| b == b'\n')
        .or_else(|| first_cut(text, min, max, |b| b.is_ascii_whitespace()))
        .unwrap_or(text.len())
}

fn first_cut(text: &[u8], min: usize, max: usize, is_boundary: impl Fn(u8) -> bool) -> Option<usize> {
    // A cut after byte `i` has length `i + 1`, which must land in (min, max].
    let end = max.min(text.len());
    text[min.min(end)..end]
        .iter()
        .position(|&b| is_boundary(b))
        .map(|pos| min.min(end) + pos + 1)
}
