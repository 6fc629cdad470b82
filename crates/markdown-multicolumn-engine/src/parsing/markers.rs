//! Tag grammar scanner.
//!
//! Every marker kind has several textual spellings. The scanner tries all of
//! them and normalises whatever matched into a [`Marker`], so nothing past
//! this module ever looks at the raw spelling.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::{
    ScanLimits,
    fence::fenced_blocks,
    pandoc::{ColumnsAttributes, FenceTokenKind, fence_tokens, find_balanced_close},
    settings::parse_settings,
    span::Span,
};

/// Info strings that open a settings block.
pub const SETTINGS_BLOCK_INFOS: &[&str] = &["column-settings", "multi-column-settings", "settings"];

/// Info strings of the oldest start syntax: a fenced block carrying an `ID:` line.
pub const START_BLOCK_INFOS: &[&str] = &["start-multi-column"];

static START_MULTI_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:===|---)[ \t]*start-multi-column(?:[ \t]*:[ \t]*(?P<id>[^\r\n]*?))?[ \t]*\r?$")
        .expect("start-multi-column regex")
});

static MULTI_COLUMN_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:===|---)[ \t]*multi-column-start(?:[ \t]*:[ \t]*(?P<id>[^\r\n]*?))?[ \t]*\r?$")
        .expect("multi-column-start regex")
});

static END_MULTI_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:===|---)[ \t]*end-multi-column[ \t]*\r?$").expect("end-multi-column regex")
});

static MULTI_COLUMN_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:===|---)[ \t]*multi-column-end[ \t]*\r?$").expect("multi-column-end regex")
});

static BREAK_EQUALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"===[ \t]*(?:column-break|column-end|end-column|break-column)[ \t]*===")
        .expect("=== column break regex")
});

static BREAK_DASHES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"---[ \t]*(?:column-break|column-end|end-column|break-column)[ \t]*---")
        .expect("--- column break regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MarkerKind {
    RegionStart,
    RegionEnd,
    ColumnBreak,
    SettingsBlockStart,
    PandocFenceOpen,
    PandocFenceClose,
}

/// A recognised marker. Spans are relative to the text that was scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub span: Span,
    /// Region id, for region starts. Empty ids are reported as `None`.
    pub id: Option<String>,
    /// Settings body (settings blocks, fenced starts) or fence attributes.
    pub body: Option<String>,
}

impl Marker {
    fn new(kind: MarkerKind, span: Span) -> Self {
        Self {
            kind,
            span,
            id: None,
            body: None,
        }
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// The same marker with its span shifted by `offset` bytes.
    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.span = self.span.offset(offset);
        self
    }
}

/// One textual spelling of a marker kind.
enum Spelling {
    /// A whole-line pattern with an optional `id` capture.
    Line(&'static LazyLock<Regex>),
    /// A pattern that may sit anywhere inside a line.
    Inline(&'static LazyLock<Regex>),
    /// A fenced block whose info string is one of the listed words.
    FencedBlock(&'static [&'static str]),
    /// A Pandoc `:::` fence.
    PandocFence,
}

static REGION_START_SPELLINGS: [Spelling; 3] = [
    Spelling::Line(&START_MULTI_COLUMN),
    Spelling::Line(&MULTI_COLUMN_START),
    Spelling::FencedBlock(START_BLOCK_INFOS),
];
static REGION_END_SPELLINGS: [Spelling; 2] = [
    Spelling::Line(&END_MULTI_COLUMN),
    Spelling::Line(&MULTI_COLUMN_END),
];
static COLUMN_BREAK_SPELLINGS: [Spelling; 2] = [
    Spelling::Inline(&BREAK_EQUALS),
    Spelling::Inline(&BREAK_DASHES),
];
static SETTINGS_SPELLINGS: [Spelling; 1] = [Spelling::FencedBlock(SETTINGS_BLOCK_INFOS)];
static PANDOC_SPELLINGS: [Spelling; 1] = [Spelling::PandocFence];

fn spellings(kind: MarkerKind) -> &'static [Spelling] {
    match kind {
        MarkerKind::RegionStart => &REGION_START_SPELLINGS,
        MarkerKind::RegionEnd => &REGION_END_SPELLINGS,
        MarkerKind::ColumnBreak => &COLUMN_BREAK_SPELLINGS,
        MarkerKind::SettingsBlockStart => &SETTINGS_SPELLINGS,
        MarkerKind::PandocFenceOpen | MarkerKind::PandocFenceClose => &PANDOC_SPELLINGS,
    }
}

/// Stateless marker scanner carrying its runaway limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scanner {
    limits: ScanLimits,
}

impl Scanner {
    pub fn new(limits: ScanLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ScanLimits {
        self.limits
    }

    /// The earliest syntactically complete marker of `kind` in `text`.
    ///
    /// For [`MarkerKind::PandocFenceClose`] this is the depth-counted close
    /// balancing a div whose content starts at the beginning of `text`.
    pub fn find(&self, kind: MarkerKind, text: &str) -> Option<Marker> {
        if kind == MarkerKind::PandocFenceClose {
            return find_balanced_close(text, self.limits.max_fence_tokens)
                .map(|span| Marker::new(kind, span));
        }
        self.find_all(kind, text).into_iter().next()
    }

    /// The last marker of `kind` in `text`.
    pub fn find_last(&self, kind: MarkerKind, text: &str) -> Option<Marker> {
        self.find_all(kind, text).pop()
    }

    /// Every non-overlapping marker of `kind`, ordered by start offset.
    ///
    /// Where spellings overlap, the earliest-starting (then longest) match
    /// wins. Pandoc closes are listed without depth counting.
    pub fn find_all(&self, kind: MarkerKind, text: &str) -> Vec<Marker> {
        let mut candidates = vec![];
        for spelling in spellings(kind) {
            collect_spelling(kind, spelling, text, &mut candidates);
        }

        candidates.sort_by(|a, b| a.start().cmp(&b.start()).then(b.len().cmp(&a.len())));

        let mut out: Vec<Marker> = Vec::with_capacity(candidates.len());
        for marker in candidates {
            if out.last().is_some_and(|prev| marker.start() < prev.end()) {
                continue;
            }
            out.push(marker);
        }
        out
    }
}

fn collect_spelling(kind: MarkerKind, spelling: &Spelling, text: &str, out: &mut Vec<Marker>) {
    match spelling {
        Spelling::Line(re) => {
            for caps in re.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                // `\r?$` may leave the carriage return inside the match.
                let matched = whole.as_str().trim_end_matches('\r');
                let mut marker = Marker::new(kind, Span::new(whole.start(), whole.start() + matched.len()));
                marker.id = caps
                    .name("id")
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|id| !id.is_empty());
                out.push(marker);
            }
        }
        Spelling::Inline(re) => {
            out.extend(re.find_iter(text).map(|m| Marker::new(kind, m.range().into())));
        }
        Spelling::FencedBlock(infos) => {
            for block in fenced_blocks(text, infos) {
                let body = block.body.slice(text).to_string();
                let mut marker = Marker::new(kind, block.span);
                if kind == MarkerKind::RegionStart {
                    marker.id = parse_settings(&body).id;
                }
                marker.body = Some(body);
                out.push(marker);
            }
        }
        Spelling::PandocFence => {
            for token in fence_tokens(text) {
                match (kind, token.kind) {
                    (MarkerKind::PandocFenceOpen, FenceTokenKind::Open { attributes }) => {
                        if let Some(parsed) = ColumnsAttributes::parse(&attributes) {
                            let mut marker = Marker::new(kind, token.span);
                            marker.id = parsed.id;
                            marker.body = Some(attributes);
                            out.push(marker);
                        }
                    }
                    (MarkerKind::PandocFenceClose, FenceTokenKind::Close) => {
                        out.push(Marker::new(kind, token.span));
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Finds the first marker of `kind` with default scan limits.
pub fn find_marker(kind: MarkerKind, text: &str) -> Option<Marker> {
    Scanner::default().find(kind, text)
}

/// Finds the last marker of `kind` with default scan limits.
pub fn find_last_marker(kind: MarkerKind, text: &str) -> Option<Marker> {
    Scanner::default().find_last(kind, text)
}

/// Every marker of `kind` with default scan limits.
pub fn find_all_markers(kind: MarkerKind, text: &str) -> Vec<Marker> {
    Scanner::default().find_all(kind, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("--- start-multi-column: A", Some("A"))]
    #[case("=== start-multi-column:A", Some("A"))]
    #[case("--- multi-column-start: my id ", Some("my id"))]
    #[case("---start-multi-column", None)]
    #[case("=== multi-column-start:", None)]
    fn region_start_spellings(#[case] text: &str, #[case] id: Option<&str>) {
        let marker = find_marker(MarkerKind::RegionStart, text).expect("start marker");
        assert_eq!(marker.start(), 0);
        assert_eq!(marker.id.as_deref(), id);
    }

    #[rstest]
    #[case("some text --- start-multi-column: A")]
    #[case("--- start-multi-columns")]
    #[case("-- start-multi-column")]
    fn region_start_must_own_its_line(#[case] text: &str) {
        assert_eq!(find_marker(MarkerKind::RegionStart, text), None);
    }

    #[rstest]
    #[case("--- end-multi-column")]
    #[case("=== end-multi-column  ")]
    #[case("--- multi-column-end")]
    fn region_end_spellings(#[case] text: &str) {
        assert!(find_marker(MarkerKind::RegionEnd, text).is_some());
    }

    #[test]
    fn region_end_inside_a_line_is_not_a_marker() {
        assert_eq!(find_marker(MarkerKind::RegionEnd, "see --- end-multi-column"), None);
    }

    #[rstest]
    #[case("--- column-break ---")]
    #[case("=== column-end ===")]
    #[case("--- end-column ---")]
    #[case("===break-column===")]
    fn column_break_spellings(#[case] text: &str) {
        let marker = find_marker(MarkerKind::ColumnBreak, text).unwrap();
        assert_eq!(marker.len(), text.len());
    }

    #[test]
    fn column_break_requires_matching_fences() {
        assert_eq!(find_marker(MarkerKind::ColumnBreak, "--- column-break ==="), None);
    }

    #[test]
    fn column_break_glued_to_text_is_still_found() {
        let text = "some words\n--- column-break ---";
        let marker = find_marker(MarkerKind::ColumnBreak, text).unwrap();
        assert_eq!(marker.start(), 11);
    }

    #[test]
    fn earliest_spelling_wins() {
        let text = "--- multi-column-start: second\n\n--- start-multi-column: third\n";
        let marker = find_marker(MarkerKind::RegionStart, text).unwrap();
        assert_eq!(marker.id.as_deref(), Some("second"));
        let last = find_last_marker(MarkerKind::RegionStart, text).unwrap();
        assert_eq!(last.id.as_deref(), Some("third"));
    }

    #[test]
    fn crlf_is_not_part_of_the_marker() {
        let text = "--- start-multi-column: A\r\nbody";
        let marker = find_marker(MarkerKind::RegionStart, text).unwrap();
        assert_eq!(marker.span.slice(text), "--- start-multi-column: A");
        assert_eq!(marker.id.as_deref(), Some("A"));
    }

    #[test]
    fn settings_block_reports_body() {
        let text = "```column-settings\nNumber of Columns: 3\nBorder: off\n```\n";
        let marker = find_marker(MarkerKind::SettingsBlockStart, text).unwrap();
        assert_eq!(marker.body.as_deref(), Some("Number of Columns: 3\nBorder: off\n"));
        assert_eq!(marker.end(), text.len() - 1);
    }

    #[test]
    fn fenced_start_takes_id_from_body() {
        let text = "```start-multi-column\nID: legacy\nNumber of Columns: 3\n```\n";
        let marker = find_marker(MarkerKind::RegionStart, text).unwrap();
        assert_eq!(marker.id.as_deref(), Some("legacy"));
        assert!(marker.body.unwrap().contains("Number of Columns: 3"));
    }

    #[test]
    fn pandoc_open_reports_attributes_and_id() {
        let text = "intro\n\n::: {.2-columns #cols border=off}\nbody\n:::\n";
        let marker = find_marker(MarkerKind::PandocFenceOpen, text).unwrap();
        assert_eq!(marker.id.as_deref(), Some("cols"));
        assert_eq!(marker.body.as_deref(), Some("{.2-columns #cols border=off}"));
        assert_eq!(marker.start(), 7);
    }

    #[test]
    fn pandoc_open_ignores_plain_divs() {
        assert_eq!(find_marker(MarkerKind::PandocFenceOpen, "::: {.note}\n:::\n"), None);
    }

    #[test]
    fn pandoc_close_is_depth_counted() {
        let body = "a\n:::{.note}\nb\n:::\nc\n:::\n";
        let close = find_marker(MarkerKind::PandocFenceClose, body).unwrap();
        assert_eq!(close.start(), body.rfind(":::").unwrap());
        assert_eq!(
            Scanner::default().find_all(MarkerKind::PandocFenceClose, body).len(),
            2
        );
    }

    #[test]
    fn missing_marker_is_none() {
        assert_eq!(find_marker(MarkerKind::RegionStart, "plain text"), None);
        assert_eq!(find_last_marker(MarkerKind::ColumnBreak, ""), None);
    }

    #[test]
    fn offset_shifts_marker() {
        let marker = find_marker(MarkerKind::RegionEnd, "--- end-multi-column").unwrap();
        assert_eq!(marker.offset(5).span, Span::new(5, 25));
    }
}
