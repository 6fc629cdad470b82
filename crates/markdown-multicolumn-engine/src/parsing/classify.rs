//! Tags a mounted fragment from its own source text.

use crate::models::{BreakType, ContentTag};

use super::fence::code_blocks;
use super::markers::{MarkerKind, Scanner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub tag: ContentTag,
    pub break_type: BreakType,
}

impl Classification {
    fn tagged(tag: ContentTag) -> Self {
        Self {
            tag,
            break_type: BreakType::None,
        }
    }
}

/// Classifies the source text of one fragment.
///
/// A column break sharing its fragment with other content is reported as a
/// plain object with a break sub-type: `Pre` when the break comes first,
/// `Post` when it comes last, `Mid` when content surrounds it.
pub fn classify_fragment(scanner: &Scanner, source: &str) -> Classification {
    if scanner.find(MarkerKind::RegionStart, source).is_some()
        || scanner.find(MarkerKind::PandocFenceOpen, source).is_some()
    {
        return Classification::tagged(ContentTag::StartRegion);
    }
    if scanner.find(MarkerKind::SettingsBlockStart, source).is_some() {
        return Classification::tagged(ContentTag::RegionSettings);
    }
    if scanner.find(MarkerKind::RegionEnd, source).is_some() {
        return Classification::tagged(ContentTag::EndRegion);
    }

    // Break syntax shown inside a code block is content, not a break.
    let code = code_blocks(source);
    let Some(marker) = scanner
        .find_all(MarkerKind::ColumnBreak, source)
        .into_iter()
        .find(|marker| !code.iter().any(|block| block.span.contains(marker.span)))
    else {
        return Classification::default();
    };
    let before = source[..marker.start()].trim();
    let after = source[marker.end()..].trim();
    let break_type = match (before.is_empty(), after.is_empty()) {
        (true, true) => return Classification::tagged(ContentTag::ColumnBreak),
        (true, false) => BreakType::Pre,
        (false, true) => BreakType::Post,
        (false, false) => BreakType::Mid,
    };
    Classification {
        tag: ContentTag::None,
        break_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("--- start-multi-column: A", ContentTag::StartRegion)]
    #[case("::: {.3-columns}", ContentTag::StartRegion)]
    #[case("```column-settings\nBorder: off\n```", ContentTag::RegionSettings)]
    #[case("=== end-multi-column", ContentTag::EndRegion)]
    #[case("--- column-break ---", ContentTag::ColumnBreak)]
    #[case("  --- column-break ---\n", ContentTag::ColumnBreak)]
    #[case("just text", ContentTag::None)]
    #[case("::: {.note}", ContentTag::None)]
    #[case("```\n--- column-break ---\n```", ContentTag::None)]
    #[case("~~~markdown\n=== column-break ===\n~~~\n", ContentTag::None)]
    fn tags(#[case] source: &str, #[case] tag: ContentTag) {
        let class = classify_fragment(&Scanner::default(), source);
        assert_eq!(class.tag, tag);
        assert_eq!(class.break_type, BreakType::None);
    }

    #[rstest]
    #[case("--- column-break ---\nsecond column text", BreakType::Pre)]
    #[case("first column text\n--- column-break ---", BreakType::Post)]
    #[case("before --- column-break --- after", BreakType::Mid)]
    fn glued_breaks(#[case] source: &str, #[case] break_type: BreakType) {
        let class = classify_fragment(&Scanner::default(), source);
        assert_eq!(class.tag, ContentTag::None);
        assert_eq!(class.break_type, break_type);
    }

    #[test]
    fn break_after_code_block_still_counts() {
        let source = "```\n--- column-break ---\n```\n--- column-break ---";
        let class = classify_fragment(&Scanner::default(), source);
        assert_eq!(class.tag, ContentTag::None);
        assert_eq!(class.break_type, BreakType::Post);
    }
}
