//! Pandoc-style fenced divs (`::: {.2-columns}` ... `:::`).
//!
//! Any `:::` line with trailing text opens a div; a line of only colons
//! closes one. Only opens carrying a `.N-columns` class start a region, but
//! every open counts towards the nesting depth when looking for the close
//! that balances a region's opening fence.

use std::sync::LazyLock;

use regex::Regex;

use super::{lines::lines_with_spans, span::Span};

static FENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]{0,3}:{3,}[ \t]*(?P<rest>.*?)[ \t]*$").expect("fence line regex")
});

static COLUMNS_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.(?:(?P<a>\d+)-columns|columns-(?P<b>\d+))$").expect("columns class regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenceTokenKind {
    /// An opening fence with its attribute text (braces included).
    Open { attributes: String },
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceToken {
    /// The fence line without its newline.
    pub span: Span,
    pub kind: FenceTokenKind,
}

/// Iterates every fence line in `text` in document order.
pub fn fence_tokens(text: &str) -> impl Iterator<Item = FenceToken> + '_ {
    lines_with_spans(text).filter_map(|line| {
        let caps = FENCE_LINE.captures(line.content())?;
        let rest = caps
            .name("rest")
            .map(|m| m.as_str().trim_end_matches(':').trim())
            .unwrap_or("");
        let span = Span::new(line.span.start, line.content_end());
        let kind = if rest.is_empty() {
            FenceTokenKind::Close
        } else {
            FenceTokenKind::Open {
                attributes: rest.to_string(),
            }
        };
        Some(FenceToken { span, kind })
    })
}

/// The attribute block of a columns fence, e.g.
/// `{.3-columns #intro border=off column-size="[25%, 50%, 25%]"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnsAttributes {
    pub columns: usize,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub pairs: Vec<(String, String)>,
}

impl ColumnsAttributes {
    /// Parses fence attributes; returns `None` unless they carry a columns class.
    pub fn parse(attributes: &str) -> Option<Self> {
        let inner = attributes.trim().strip_prefix('{')?.strip_suffix('}')?;

        let mut columns = None;
        let mut id = None;
        let mut classes = vec![];
        let mut pairs = vec![];

        for token in split_attribute_tokens(inner) {
            if let Some(caps) = COLUMNS_CLASS.captures(&token) {
                let digits = caps.name("a").or_else(|| caps.name("b"));
                columns = digits.and_then(|d| d.as_str().parse::<usize>().ok());
            } else if let Some(class) = token.strip_prefix('.') {
                classes.push(class.to_string());
            } else if let Some(ident) = token.strip_prefix('#') {
                id = Some(ident.to_string()).filter(|s| !s.is_empty());
            } else if let Some((key, value)) = token.split_once('=') {
                let value = value.trim_matches(['"', '\'']);
                pairs.push((key.to_string(), value.to_string()));
            }
        }

        let columns = columns.filter(|&n| n >= 1)?;
        Some(Self {
            columns,
            id,
            classes,
            pairs,
        })
    }
}

/// Splits attribute text on whitespace outside quotes and brackets.
fn split_attribute_tokens(inner: &str) -> Vec<String> {
    let mut tokens = vec![];
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut brackets = 0usize;

    for c in inner.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '[') => {
                brackets += 1;
                current.push(c);
            }
            (None, ']') => {
                brackets = brackets.saturating_sub(1);
                current.push(c);
            }
            (None, c) if c.is_whitespace() && brackets == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Finds the fence closing the div whose content starts at the beginning of
/// `text`.
///
/// Scans fence by fence: an open increments the depth, a close decrements
/// it, and the first close taking the depth to -1 is returned. At most
/// `max_tokens` fences are examined; past that the scan gives up.
pub fn find_balanced_close(text: &str, max_tokens: usize) -> Option<Span> {
    let mut depth: i64 = 0;
    for (examined, token) in fence_tokens(text).enumerate() {
        if examined >= max_tokens {
            log::warn!("pandoc fence scan stopped after {max_tokens} fence tokens");
            return None;
        }
        match token.kind {
            FenceTokenKind::Open { .. } => depth += 1,
            FenceTokenKind::Close => {
                depth -= 1;
                if depth < 0 {
                    return Some(token.span);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tokens_distinguish_open_and_close() {
        let text = "::: {.2-columns}\nbody\n:::\n";
        let tokens: Vec<_> = fence_tokens(text).collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            tokens[0].kind,
            FenceTokenKind::Open {
                attributes: "{.2-columns}".to_string()
            }
        );
        assert_eq!(tokens[1].kind, FenceTokenKind::Close);
        assert_eq!(tokens[1].span.slice(text), ":::");
    }

    #[test]
    fn trailing_colons_on_open_are_ignored() {
        let tokens: Vec<_> = fence_tokens("::::: note :::::").collect();
        assert_eq!(
            tokens[0].kind,
            FenceTokenKind::Open {
                attributes: "note".to_string()
            }
        );
    }

    #[test]
    fn parses_columns_attributes() {
        let attrs =
            ColumnsAttributes::parse(r#"{.3-columns .wide #intro border=off col-size="[25%, 50%, 25%]"}"#)
                .unwrap();
        assert_eq!(attrs.columns, 3);
        assert_eq!(attrs.id.as_deref(), Some("intro"));
        assert_eq!(attrs.classes, vec!["wide".to_string()]);
        assert_eq!(
            attrs.pairs,
            vec![
                ("border".to_string(), "off".to_string()),
                ("col-size".to_string(), "[25%, 50%, 25%]".to_string()),
            ]
        );
    }

    #[test]
    fn alternate_columns_class_spelling() {
        assert_eq!(ColumnsAttributes::parse("{.columns-4}").unwrap().columns, 4);
    }

    #[test]
    fn non_columns_div_is_not_a_region() {
        assert_eq!(ColumnsAttributes::parse("{.note}"), None);
        assert_eq!(ColumnsAttributes::parse("{.0-columns}"), None);
        assert_eq!(ColumnsAttributes::parse("note"), None);
    }

    #[test]
    fn balanced_close_skips_inner_div() {
        let body = "a\n:::{.note}\nb\n:::\nc\n:::\nafter\n";
        let close = find_balanced_close(body, 100).unwrap();
        // The outer close is the second bare fence.
        assert_eq!(close.start, body.rfind(":::").unwrap());
    }

    #[test]
    fn unbalanced_body_has_no_close() {
        assert_eq!(find_balanced_close("a\n::: note\nb\n:::\n", 100), None);
    }

    #[test]
    fn scan_is_capped() {
        let mut body = String::new();
        for _ in 0..60 {
            body.push_str("::: note\n:::\n");
        }
        body.push_str(":::\n");
        assert_eq!(find_balanced_close(&body, 100), None);
        assert!(find_balanced_close(&body, 1000).is_some());
    }
}
