//! Reference markdown renderer.
//!
//! Hosts supply their own renderer; this one splits markdown into top-level
//! blocks with `pulldown-cmark` so the engine can be driven without a host.

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

use crate::models::{Fragment, FragmentKind};

static EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[\[(?P<target>[^\]|]+)(?:\|[^\]]*)?\]\]$").expect("embed regex"));

/// Turns markdown text into rendered fragments.
pub trait MarkdownRenderer {
    fn render(&mut self, markdown: &str) -> Vec<Fragment>;
}

/// A top-level block and the source bytes it was rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub fragment: Fragment,
    pub source: Range<usize>,
}

/// Renders each top-level markdown block as one fragment.
#[derive(Debug, Clone, Copy)]
pub struct BlockRenderer {
    options: Options,
}

impl Default for BlockRenderer {
    fn default() -> Self {
        Self {
            options: Options::ENABLE_TASKLISTS | Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
        }
    }
}

struct OpenBlock {
    kind: FragmentKind,
    start: usize,
    text: String,
    checked: Vec<bool>,
}

impl OpenBlock {
    fn finish(self, end: usize, source: &str) -> RenderedBlock {
        let text = self.text.trim_end().to_string();
        let kind = match self.kind {
            FragmentKind::List if !self.checked.is_empty() => FragmentKind::TaskList {
                checked: self.checked,
            },
            FragmentKind::Paragraph => match EMBED.captures(source[self.start..end].trim()) {
                Some(caps) => FragmentKind::Embed {
                    target: caps["target"].trim().to_string(),
                },
                None => FragmentKind::Paragraph,
            },
            kind => kind,
        };
        RenderedBlock {
            fragment: Fragment::new(kind, text),
            source: self.start..end,
        }
    }
}

fn block_kind(tag: &Tag<'_>) -> FragmentKind {
    match tag {
        Tag::Paragraph => FragmentKind::Paragraph,
        Tag::Heading { level, .. } => FragmentKind::Heading { level: *level as u8 },
        Tag::CodeBlock(CodeBlockKind::Fenced(info)) => FragmentKind::CodeBlock {
            lang: info.split_whitespace().next().map(str::to_string),
        },
        Tag::CodeBlock(CodeBlockKind::Indented) => FragmentKind::CodeBlock { lang: None },
        Tag::List(_) => FragmentKind::List,
        Tag::BlockQuote(_) => FragmentKind::BlockQuote,
        _ => FragmentKind::Other,
    }
}

impl BlockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `markdown` into top-level blocks with their source ranges.
    pub fn render_blocks(&self, markdown: &str) -> Vec<RenderedBlock> {
        let mut blocks = vec![];
        let mut depth = 0usize;
        let mut open: Option<OpenBlock> = None;

        for (event, range) in Parser::new_ext(markdown, self.options).into_offset_iter() {
            match event {
                Event::Start(tag) => {
                    if depth == 0 {
                        open = Some(OpenBlock {
                            kind: block_kind(&tag),
                            start: range.start,
                            text: String::new(),
                            checked: vec![],
                        });
                    }
                    depth += 1;
                }
                Event::End(tag) => {
                    depth = depth.saturating_sub(1);
                    if let Some(block) = open.as_mut()
                        && matches!(tag, TagEnd::Item | TagEnd::Paragraph | TagEnd::Heading(_))
                        && depth > 0
                        && !block.text.ends_with('\n')
                    {
                        block.text.push('\n');
                    }
                    if depth == 0
                        && let Some(block) = open.take()
                    {
                        blocks.push(block.finish(range.end, markdown));
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some(block) = open.as_mut() {
                        block.text.push_str(&text);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if let Some(block) = open.as_mut() {
                        block.text.push('\n');
                    }
                }
                Event::TaskListMarker(checked) => {
                    if let Some(block) = open.as_mut() {
                        block.checked.push(checked);
                    }
                }
                Event::Rule if depth == 0 => blocks.push(RenderedBlock {
                    fragment: Fragment::new(FragmentKind::ThematicBreak, ""),
                    source: range,
                }),
                _ => {}
            }
        }
        blocks
    }
}

impl MarkdownRenderer for BlockRenderer {
    fn render(&mut self, markdown: &str) -> Vec<Fragment> {
        self.render_blocks(markdown)
            .into_iter()
            .map(|block| block.fragment)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(markdown: &str) -> Vec<FragmentKind> {
        BlockRenderer::new()
            .render(markdown)
            .into_iter()
            .map(|f| f.kind)
            .collect()
    }

    #[test]
    fn splits_top_level_blocks() {
        let markdown = "# Title\n\nSome *text*\nwrapped.\n\n```rust\nfn main() {}\n```\n\n***\n";
        let fragments = BlockRenderer::new().render(markdown);
        assert_eq!(
            fragments,
            vec![
                Fragment::new(FragmentKind::Heading { level: 1 }, "Title"),
                Fragment::paragraph("Some text\nwrapped."),
                Fragment::new(
                    FragmentKind::CodeBlock {
                        lang: Some("rust".to_string())
                    },
                    "fn main() {}"
                ),
                Fragment::new(FragmentKind::ThematicBreak, ""),
            ]
        );
    }

    #[test]
    fn markers_render_as_paragraphs() {
        let markdown = "--- start-multi-column: A\n\n--- column-break ---\n\n--- end-multi-column\n";
        let fragments = BlockRenderer::new().render(markdown);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0], Fragment::paragraph("--- start-multi-column: A"));
        assert_eq!(fragments[1].text, "--- column-break ---");
    }

    #[test]
    fn task_lists_record_checkbox_state() {
        let kinds = kinds("- [x] done\n- [ ] todo\n");
        assert_eq!(
            kinds,
            vec![FragmentKind::TaskList {
                checked: vec![true, false]
            }]
        );
    }

    #[test]
    fn list_items_are_lines() {
        let fragments = BlockRenderer::new().render("- one\n- two\n");
        assert_eq!(fragments[0].kind, FragmentKind::List);
        assert_eq!(fragments[0].text, "one\ntwo");
    }

    #[test]
    fn embeds_are_recognised() {
        assert_eq!(
            kinds("![[Daily Note|alias]]\n"),
            vec![FragmentKind::Embed {
                target: "Daily Note".to_string()
            }]
        );
    }

    #[test]
    fn source_ranges_point_at_blocks() {
        let markdown = "first\n\nsecond\n";
        let blocks = BlockRenderer::new().render_blocks(markdown);
        assert_eq!(blocks.len(), 2);
        assert_eq!(markdown[blocks[1].source.clone()].trim_end(), "second");
    }
}
