//! Case-folded substring matching utilities.

use std::ops::Range;

use memchr::memmem;

// ---------------------------------------------------------------------------
// Query normalisation
// ---------------------------------------------------------------------------

/// Trims and case-folds a raw query.
///
/// Returns `None` for empty or whitespace-only input, which callers treat as
/// "no text constraint".
pub fn normalize_query(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(fold_case(trimmed))
}

/// Lowercases text one character at a time.
///
/// Folding per character (rather than with `str::to_lowercase`) keeps the
/// result context-free, so a field and any of its substrings fold the same way.
pub fn fold_case(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    folded.extend(text.chars().flat_map(char::to_lowercase));
    folded
}

/// Checks whether `field` contains an already folded needle, ignoring case.
pub fn contains_folded(field: &str, folded_needle: &str) -> bool {
    if folded_needle.is_empty() {
        return true;
    }
    memmem::find(fold_case(field).as_bytes(), folded_needle.as_bytes()).is_some()
}

// ---------------------------------------------------------------------------
// Folded text with offsets back into the original
// ---------------------------------------------------------------------------

/// A case-folded copy of a text that remembers where each folded byte came from.
///
/// Lowercasing can change byte lengths (`'İ'` folds to two characters), so
/// match offsets found in the folded text are mapped back through the
/// originating character before they are used against the original.
#[derive(Debug, Clone)]
pub struct FoldedText {
    folded: String,
    origin_starts: Vec<usize>,
    origin_ends: Vec<usize>,
}

impl FoldedText {
    pub fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut origin_starts = Vec::with_capacity(text.len());
        let mut origin_ends = Vec::with_capacity(text.len());

        for (offset, ch) in text.char_indices() {
            let end = offset + ch.len_utf8();
            for lower in ch.to_lowercase() {
                let before = folded.len();
                folded.push(lower);
                for _ in before..folded.len() {
                    origin_starts.push(offset);
                    origin_ends.push(end);
                }
            }
        }

        Self {
            folded,
            origin_starts,
            origin_ends,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Finds every non-overlapping occurrence of a folded needle, left to right.
    ///
    /// Ranges are byte ranges into the original text and always fall on
    /// character boundaries. The scan resumes after the end of each match.
    pub fn find_ranges(&self, folded_needle: &str) -> Vec<Range<usize>> {
        if folded_needle.is_empty() {
            return Vec::new();
        }

        let needle_len = folded_needle.len();
        let mut ranges: Vec<Range<usize>> = Vec::new();
        for start in memmem::find_iter(self.folded.as_bytes(), folded_needle.as_bytes()) {
            let range = self.origin_starts[start]..self.origin_ends[start + needle_len - 1];
            // Two folded matches can snap onto the same original character.
            if ranges.last().is_some_and(|last| range.start < last.end) {
                continue;
            }
            ranges.push(range);
        }
        ranges
    }
}
