//! Match highlighting for rendered list rows.
//!
//! Marks every case-insensitive, non-overlapping occurrence of the query in a
//! text:
//! - Matching is literal; characters such as `.`, `*` or `(` in the query are
//!   never pattern syntax
//! - The marked substring keeps the casing of the original text
//! - Markup-significant characters of the text are escaped, so a row can never
//!   inject markup of its own
//! - Spans are reported left to right over the escaped text

use std::ops::Range;

use crate::config::HighlightConfig;
use crate::query::{normalize_query, FoldedText};

pub const DEFAULT_MARK_OPEN: &str = "<mark>";
pub const DEFAULT_MARK_CLOSE: &str = "</mark>";

/// Byte span of one marked match inside the escaped (markup-free) text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
}

impl HighlightSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Escaped text with match markers inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedText {
    /// The escaped text with open/close markers around every match.
    pub rendered: String,
    /// Matches in increasing start order, over the escaped text.
    pub spans: Vec<HighlightSpan>,
}

impl MarkedText {
    pub fn has_matches(&self) -> bool {
        !self.spans.is_empty()
    }

    pub fn match_count(&self) -> usize {
        self.spans.len()
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

/// Wraps matches in a configurable pair of markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighter {
    open: String,
    close: String,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_MARK_OPEN, DEFAULT_MARK_CLOSE)
    }
}

impl Highlighter {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn from_config(config: &HighlightConfig) -> Self {
        Self::new(config.open.as_str(), config.close.as_str())
    }

    /// Byte ranges of every match over the unescaped `text`.
    ///
    /// Useful for presenters that style ranges directly instead of parsing
    /// markup.
    pub fn spans(&self, text: &str, query: &str) -> Vec<Range<usize>> {
        match normalize_query(query) {
            Some(needle) => FoldedText::new(text).find_ranges(&needle),
            None => Vec::new(),
        }
    }

    /// Escapes `text` and marks every occurrence of `query`.
    ///
    /// An empty query leaves the escaped text without markers.
    pub fn highlight(&self, text: &str, query: &str) -> MarkedText {
        let ranges = self.spans(text, query);
        if ranges.is_empty() {
            return MarkedText {
                rendered: escape_markup(text),
                spans: Vec::new(),
            };
        }

        let mut rendered = String::with_capacity(
            text.len() + ranges.len() * (self.open.len() + self.close.len()),
        );
        let mut spans = Vec::with_capacity(ranges.len());
        let mut escaped_len = 0usize;
        let mut cursor = 0usize;

        for range in ranges {
            escaped_len += push_escaped(&mut rendered, &text[cursor..range.start]);

            rendered.push_str(&self.open);
            let start = escaped_len;
            escaped_len += push_escaped(&mut rendered, &text[range.clone()]);
            rendered.push_str(&self.close);

            spans.push(HighlightSpan {
                start,
                end: escaped_len,
            });
            cursor = range.end;
        }
        push_escaped(&mut rendered, &text[cursor..]);

        MarkedText { rendered, spans }
    }

    /// Removes the markers from rendered text, giving back the escaped text.
    ///
    /// Exact when both markers contain a character that [`escape_markup`]
    /// rewrites, as the default `<mark>` pair does.
    pub fn strip_markup(&self, rendered: &str) -> String {
        rendered.replace(&self.open, "").replace(&self.close, "")
    }
}

/// Highlights `query` in `text` with the default `<mark>` markers.
pub fn highlight(text: &str, query: &str) -> MarkedText {
    Highlighter::default().highlight(text, query)
}

/// Escapes characters that are meaningful to HTML-like markup.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    push_escaped(&mut escaped, text);
    escaped
}

/// Appends the escaped form of `text` and returns the number of bytes written.
fn push_escaped(out: &mut String, text: &str) -> usize {
    let before = out.len();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(spans: &MarkedText, escaped: &str) -> Vec<String> {
        spans
            .spans
            .iter()
            .map(|span| escaped[span.start..span.end].to_string())
            .collect()
    }

    #[test]
    fn marks_single_match() {
        assert_eq!(
            highlight("git status", "status").rendered,
            "git <mark>status</mark>"
        );
    }

    #[test]
    fn preserves_original_casing() {
        assert_eq!(
            highlight("Git STATUS", "status").rendered,
            "Git <mark>STATUS</mark>"
        );
        assert_eq!(
            highlight("Git STATUS", "GIT").rendered,
            "<mark>Git</mark> STATUS"
        );
    }

    #[test]
    fn empty_query_adds_no_markup() {
        let result = highlight("git status", "");
        assert_eq!(result.rendered, "git status");
        assert!(!result.has_matches());

        assert_eq!(highlight("git status", "   ").rendered, "git status");
    }

    #[test]
    fn scan_is_greedy_and_non_overlapping() {
        let result = highlight("aaaa", "aa");
        assert_eq!(result.rendered, "<mark>aa</mark><mark>aa</mark>");
        assert_eq!(result.match_count(), 2);
    }

    #[test]
    fn query_is_literal_text() {
        let result = highlight("axb and a.b", "a.b");
        assert_eq!(result.rendered, "axb and <mark>a.b</mark>");

        let result = highlight("match (.*) here", "(.*)");
        assert_eq!(result.rendered, "match <mark>(.*)</mark> here");

        assert_eq!(highlight("abc", "[").rendered, "abc");
    }

    #[test]
    fn text_markup_is_escaped() {
        let result = highlight("<b>bold</b> & more", "bold");
        assert_eq!(
            result.rendered,
            "&lt;b&gt;<mark>bold</mark>&lt;/b&gt; &amp; more"
        );
    }

    #[test]
    fn escaped_entities_are_not_matched() {
        // "lt" must not hit the "&lt;" produced by escaping "<".
        let result = highlight("a < b", "lt");
        assert_eq!(result.rendered, "a &lt; b");
        assert!(!result.has_matches());
    }

    #[test]
    fn query_with_markup_characters_matches_them() {
        let result = highlight("Vec<String>", "<string>");
        assert_eq!(result.rendered, "Vec<mark>&lt;String&gt;</mark>");
    }

    #[test]
    fn stripping_markup_reconstructs_escaped_text() {
        let highlighter = Highlighter::default();
        for (text, query) in [
            ("git status", "status"),
            ("<tag attr='x'> & <tag>", "tag"),
            ("aaaa", "aa"),
            ("nothing here", "zzz"),
            ("Straße STRASSE", "s"),
        ] {
            let result = highlighter.highlight(text, query);
            assert_eq!(highlighter.strip_markup(&result.rendered), escape_markup(text));
        }
    }

    #[test]
    fn spans_are_ordered_and_disjoint() {
        let text = "a<a>a&aa";
        let result = highlight(text, "a");
        let escaped = escape_markup(text);
        for pair in result.spans.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        assert_eq!(marked(&result, &escaped), vec!["a"; 5]);
    }

    #[test]
    fn custom_markers() {
        let highlighter = Highlighter::new("[", "]");
        assert_eq!(
            highlighter.highlight("docker ps", "PS").rendered,
            "docker [ps]"
        );
    }

    #[test]
    fn spans_over_unescaped_text() {
        let highlighter = Highlighter::default();
        let text = "<x> status";
        let ranges = highlighter.spans(text, "status");
        assert_eq!(ranges, vec![4..10]);
        assert_eq!(&text[ranges[0].clone()], "status");
    }
}
