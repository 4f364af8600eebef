/// Byte-offset range into template source text.
///
/// Every token, expression and diagnostic carries one of these so that
/// errors can point back at the exact text that caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is after end {end}");
        Self { start, end }
    }

    /// An empty span at `offset`.
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one covering both ranges.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The source text covered by this span.
    ///
    /// Returns an empty string when the span does not fall on char
    /// boundaries inside `source`.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or("")
    }

    /// Shift both ends by `offset`, for spans computed relative to a
    /// substring of the source.
    pub fn offset(self, offset: usize) -> Span {
        Span {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// A resolved position: 1-based line number, 0-based byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// Maps byte offsets in a source string to line/column positions.
///
/// Built once per source with a single scan for newlines; lookups are a
/// binary search over the recorded line starts.
#[derive(Debug, Clone)]
pub struct LineIndex<'s> {
    source: &'s str,
    line_starts: Vec<usize>,
}

impl<'s> LineIndex<'s> {
    pub fn new(source: &'s str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Number of lines. A trailing newline opens a final empty line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The 1-based line containing `offset`. Offsets past the end of the
    /// source clamp to the last line.
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.source.len());
        match self.line_starts.binary_search(&offset) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    pub fn location(&self, offset: usize) -> Location {
        let line = self.line_of(offset);
        let start = self.line_starts[line - 1];
        Location {
            line,
            column: offset.min(self.source.len()) - start,
        }
    }

    /// Byte range of a 1-based line, excluding its line terminator.
    pub fn line_span(&self, line: usize) -> Option<Span> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let mut end = match self.line_starts.get(line) {
            Some(next) => next - 1,
            None => self.source.len(),
        };
        if end > start && self.source.as_bytes()[end - 1] == b'\r' {
            end -= 1;
        }
        Some(Span::new(start, end))
    }

    /// Text of a 1-based line, excluding its line terminator.
    pub fn line_text(&self, line: usize) -> Option<&'s str> {
        self.line_span(line).map(|span| span.slice(self.source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_span_basics() {
        let span = Span::new(3, 9);
        assert_eq!(span.len(), 6);
        assert!(!span.is_empty());
        assert!(Span::point(4).is_empty());
        assert_eq!(span.slice("{{ foo|bar }}"), "foo|ba");
    }

    #[test]
    fn test_span_merge_and_offset() {
        let merged = Span::new(7, 10).merge(Span::new(3, 6));
        assert_eq!(merged, Span::new(3, 10));
        assert_eq!(Span::new(0, 3).offset(5), Span::new(5, 8));
    }

    #[test]
    fn test_slice_out_of_bounds_is_empty() {
        assert_eq!(Span::new(2, 40).slice("short"), "");
    }

    #[test]
    fn test_single_line_locations() {
        let index = LineIndex::new("{{ foo|center }}");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.location(7), Location { line: 1, column: 7 });
        assert_eq!(index.line_text(1), Some("{{ foo|center }}"));
    }

    #[test]
    fn test_multi_line_locations() {
        let source = "first\nsecond {{ x }}\nthird";
        let index = LineIndex::new(source);
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.location(0), Location { line: 1, column: 0 });
        assert_eq!(index.location(6), Location { line: 2, column: 0 });
        assert_eq!(index.location(16), Location { line: 2, column: 10 });
        assert_eq!(index.line_text(2), Some("second {{ x }}"));
        assert_eq!(index.line_text(3), Some("third"));
        assert_eq!(index.line_text(4), None);
        assert_eq!(index.line_text(0), None);
    }

    #[test]
    fn test_newline_belongs_to_its_line() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.line_of(2), 1);
        assert_eq!(index.line_of(3), 2);
    }

    #[test]
    fn test_crlf_line_text() {
        let index = LineIndex::new("one\r\ntwo\r\n");
        assert_eq!(index.line_text(1), Some("one"));
        assert_eq!(index.line_text(2), Some("two"));
        assert_eq!(index.line_text(3), Some(""));
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let index = LineIndex::new("abc");
        assert_eq!(index.location(99), Location { line: 1, column: 3 });
    }
}
