//! Print/export targets for rendered regions.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::error::{RegionError, RegionWarning};
use crate::layout::{ColumnGroup, RenderedColumn};
use crate::models::{Alignment, ColumnPosition, ContentOverflow, Fragment, FragmentKind};

/// Receives a region's columns in order.
pub trait ExportTarget {
    fn begin_group(&mut self, _group: &ColumnGroup) {}

    fn column(&mut self, column: &RenderedColumn, fragments: &[&Fragment]);

    fn end_group(&mut self, _group: &ColumnGroup) {}

    /// A region that renders as an error instead of content.
    fn error(&mut self, error: &RegionError);

    fn warning(&mut self, _warning: &RegionWarning) {}
}

/// Plain text, one column after another.
#[derive(Debug, Default)]
pub struct PlainTextExport {
    out: String,
    group: usize,
}

impl PlainTextExport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl ExportTarget for PlainTextExport {
    fn begin_group(&mut self, _group: &ColumnGroup) {
        if self.group > 0 {
            self.out.push('\n');
        }
        self.group += 1;
    }

    fn column(&mut self, column: &RenderedColumn, fragments: &[&Fragment]) {
        let _ = writeln!(
            self.out,
            "[column {} | {}]",
            column.index + 1,
            column.width
        );
        for fragment in fragments {
            for line in fragment.text.lines() {
                let _ = writeln!(self.out, "{}", line.trim_end());
            }
        }
    }

    fn error(&mut self, error: &RegionError) {
        let _ = writeln!(self.out, "[error] {error}");
    }

    fn warning(&mut self, warning: &RegionWarning) {
        let _ = writeln!(self.out, "[warning] {warning}");
    }
}

/// Self-contained HTML with inline column styles.
#[derive(Debug, Default)]
pub struct HtmlExport {
    out: String,
}

impl HtmlExport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn fragment(&mut self, fragment: &Fragment) {
        let text = encode_text(fragment.text.trim_end());
        let _ = match &fragment.kind {
            FragmentKind::Heading { level } => {
                let level = (*level).clamp(1, 6);
                writeln!(self.out, "<h{level}>{text}</h{level}>")
            }
            FragmentKind::CodeBlock { lang: Some(lang) } => writeln!(
                self.out,
                "<pre><code class=\"language-{}\">{text}</code></pre>",
                encode_double_quoted_attribute(lang)
            ),
            FragmentKind::CodeBlock { lang: None } => writeln!(self.out, "<pre><code>{text}</code></pre>"),
            FragmentKind::TaskList { checked } => {
                self.out.push_str("<ul class=\"task-list\">\n");
                for (i, item) in fragment.text.lines().enumerate() {
                    let mark = if checked.get(i).copied().unwrap_or(false) {
                        " checked"
                    } else {
                        ""
                    };
                    let _ = writeln!(
                        self.out,
                        "<li><input type=\"checkbox\" disabled{mark}> {}</li>",
                        encode_text(item)
                    );
                }
                writeln!(self.out, "</ul>")
            }
            FragmentKind::List => {
                self.out.push_str("<ul>\n");
                for item in fragment.text.lines() {
                    let _ = writeln!(self.out, "<li>{}</li>", encode_text(item));
                }
                writeln!(self.out, "</ul>")
            }
            FragmentKind::BlockQuote => writeln!(self.out, "<blockquote>{text}</blockquote>"),
            FragmentKind::Embed { target } => writeln!(
                self.out,
                "<div class=\"embed\" data-target=\"{}\">{text}</div>",
                encode_double_quoted_attribute(target)
            ),
            FragmentKind::ThematicBreak => writeln!(self.out, "<hr>"),
            FragmentKind::Paragraph | FragmentKind::Other => writeln!(self.out, "<p>{text}</p>"),
        };
    }
}

fn justify(position: ColumnPosition) -> &'static str {
    match position {
        ColumnPosition::Left => "flex-start",
        ColumnPosition::Center => "center",
        ColumnPosition::Right => "flex-end",
    }
}

fn text_align(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
    }
}

fn overflow(overflow: ContentOverflow) -> &'static str {
    match overflow {
        ContentOverflow::Scroll => "auto",
        ContentOverflow::Hidden => "hidden",
    }
}

impl ExportTarget for HtmlExport {
    fn begin_group(&mut self, group: &ColumnGroup) {
        let _ = writeln!(
            self.out,
            "<div class=\"multi-column\" style=\"display: flex; justify-content: {};\">",
            justify(group.position)
        );
    }

    fn column(&mut self, column: &RenderedColumn, fragments: &[&Fragment]) {
        let mut style = format!(
            "width: {}; overflow: {}; text-align: {};",
            column.width,
            overflow(column.overflow),
            text_align(column.alignment)
        );
        if column.border {
            style.push_str(" border: 1px solid;");
        }
        if column.shadow {
            style.push_str(" box-shadow: 0 0.2em 0.5em rgba(0, 0, 0, 0.25);");
        }
        let _ = writeln!(self.out, "<div class=\"column\" style=\"{style}\">");
        for fragment in fragments {
            self.fragment(fragment);
        }
        self.out.push_str("</div>\n");
    }

    fn end_group(&mut self, _group: &ColumnGroup) {
        self.out.push_str("</div>\n");
    }

    fn error(&mut self, error: &RegionError) {
        let _ = writeln!(
            self.out,
            "<div class=\"multi-column-error\">{}</div>",
            encode_text(&error.to_string())
        );
    }

    fn warning(&mut self, warning: &RegionWarning) {
        let _ = writeln!(
            self.out,
            "<div class=\"multi-column-warning\">{}</div>",
            encode_text(&warning.to_string())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnWidth, ObjectId};

    fn column(index: usize) -> RenderedColumn {
        RenderedColumn {
            index,
            width: ColumnWidth::percent(50.0),
            border: true,
            shadow: false,
            overflow: ContentOverflow::Hidden,
            alignment: Alignment::Center,
            items: vec![ObjectId::new()],
        }
    }

    #[test]
    fn plain_text_lists_columns() {
        let mut export = PlainTextExport::new();
        let fragment = Fragment::paragraph("hello  \nworld");
        export.column(&column(0), &[&fragment]);
        assert_eq!(export.finish(), "[column 1 | 50%]\nhello\nworld\n");
    }

    #[test]
    fn html_escapes_content() {
        let mut export = HtmlExport::new();
        let fragment = Fragment::paragraph("a < b & c");
        export.column(&column(0), &[&fragment]);
        let html = export.finish();
        assert!(html.contains("<p>a &lt; b &amp; c</p>"));
        assert!(html.contains("width: 50%; overflow: hidden; text-align: center; border: 1px solid;"));
        assert!(!html.contains("box-shadow"));
    }

    #[test]
    fn html_renders_task_state() {
        let mut export = HtmlExport::new();
        let fragment = Fragment::new(
            FragmentKind::TaskList {
                checked: vec![true, false],
            },
            "done\ntodo",
        );
        export.column(&column(0), &[&fragment]);
        let html = export.finish();
        assert!(html.contains("disabled checked> done"));
        assert!(html.contains("disabled> todo"));
    }

    #[test]
    fn errors_are_shown_in_place() {
        let mut export = HtmlExport::new();
        export.error(&RegionError::DuplicateRegionId { id: "<A>".to_string() });
        assert!(export.finish().contains("&lt;A&gt;"));
    }
}
