//! Splitting of text that exceeds the chunk window.

/// Splits text into pieces of at most `max` characters.
///
/// Each piece ends at the last newline, else the last space, inside the
/// window; text without either is cut at the window edge. Consecutive pieces
/// repeat the last `overlap` characters of their predecessor.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    max: usize,
    overlap: usize,
}

impl TextSplitter {
    /// Create a splitter. `overlap` is clamped below `max`.
    pub fn new(max: usize, overlap: usize) -> Self {
        let max = max.max(1);
        Self {
            max,
            overlap: overlap.min(max - 1),
        }
    }

    /// Split `text`. Text that fits is returned as one piece.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::chunking::TextSplitter;
    ///
    /// let pieces = TextSplitter::new(11, 0).split("hello world again");
    /// assert_eq!(pieces, vec!["hello world", "again"]);
    /// ```
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.max {
            return vec![text.to_string()];
        }

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let window_end = (start + self.max).min(chars.len());
            if window_end == chars.len() {
                push_trimmed(&mut pieces, &chars[start..]);
                break;
            }

            // one character past the window: a separator right after a full
            // window still counts
            let (end, next) = match self.boundary(&chars[start..=window_end]) {
                // separator is dropped from both pieces
                Some(offset) => (start + offset, start + offset + 1),
                None => (window_end, window_end),
            };
            push_trimmed(&mut pieces, &chars[start..end]);

            let restart = next.saturating_sub(self.overlap);
            start = if restart > start { restart } else { next };
        }
        pieces
    }

    /// Offset of the preferred separator in `window`, at most `max`.
    fn boundary(&self, window: &[char]) -> Option<usize> {
        // a piece must keep at least one character
        let search = &window[1..];
        search
            .iter()
            .rposition(|&c| c == '\n')
            .or_else(|| search.iter().rposition(|&c| c == ' '))
            .map(|p| p + 1)
    }
}

fn push_trimmed(pieces: &mut Vec<String>, chars: &[char]) {
    let piece: String = chars.iter().collect();
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        pieces.push(trimmed.to_string());
    }
}
