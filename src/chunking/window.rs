//! Overlapping window splitter.
//!
//! Lengths and offsets are counted in `char`s, not bytes, so multi-byte text
//! is windowed the same way as ASCII and never split inside a code point.
//!
//! 1. Text no longer than the window is returned verbatim (untrimmed).
//! 2. Otherwise a window of `chunk_size` chars is cut at the cursor.
//! 3. Unless it is the last window, it is shortened to end just after the last
//!    `.` or `\n` it contains, provided that break lies past `chunk_size / 2`.
//! 4. The window is trimmed and emitted; the cursor moves to `end - overlap`.

/// Split `text` into overlapping windows. Callers must pass
/// `0 <= overlap < chunk_size`; see [`super::ChunkSettings`].
pub fn split_windows(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    if len <= chunk_size {
        return vec![text.to_string()];
    }

    let half = chunk_size / 2;
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < len {
        // `end` may run past the text on the final window; only the slice is clamped
        let mut end = start + chunk_size;
        let mut window = &chars[start..end.min(len)];

        if end < len {
            if let Some(break_point) = window.iter().rposition(|&c| c == '.' || c == '\n') {
                if break_point > half {
                    window = &window[..=break_point];
                    end = start + break_point + 1;
                }
            }
        }

        let piece: String = window.iter().collect();
        chunks.push(piece.trim().to_string());

        // A snapped window shorter than the overlap would rewind the cursor;
        // continue from the end of the window instead.
        let next = end - overlap.min(end);
        start = if next > start { next } else { end };
    }

    chunks
}
