use super::span::Span;

/// A reference to a single line in the scanned text with its byte span.
#[derive(Debug, Clone, Copy)]
pub struct LineRef<'a> {
    /// Byte span of this line (includes the newline if present).
    pub span: Span,
    /// The line text, including its newline.
    pub text: &'a str,
}

impl<'a> LineRef<'a> {
    /// The line text without its trailing `\n` / `\r\n`.
    pub fn content(&self) -> &'a str {
        self.text.trim_end_matches(['\r', '\n'])
    }

    /// Byte offset just past the line content, before the newline.
    pub fn content_end(&self) -> usize {
        self.span.start + self.content().len()
    }

    pub fn is_blank(&self) -> bool {
        self.content().trim().is_empty()
    }
}

/// Returns an iterator over lines with their byte spans.
///
/// Newline characters are kept in each line so spans tile the whole text.
pub fn lines_with_spans(text: &str) -> impl Iterator<Item = LineRef<'_>> + '_ {
    let mut offset = 0usize;
    text.split_inclusive('\n').map(move |line| {
        let start = offset;
        offset += line.len();
        LineRef {
            span: Span { start, end: offset },
            text: line,
        }
    })
}
