use crate::models::{BreakType, ContentObject, ContentTag, RegionSettings};

use super::{ColumnCursor, LayoutStrategy, RegionRender, widths::column_widths};

/// Fixed column breaks: each break moves on to the next column, clamped to
/// the last one.
pub fn layout(objects: &[ContentObject], settings: &RegionSettings) -> RegionRender {
    let mut cursor = ColumnCursor::new(settings.columns(), false);

    for object in objects {
        match object.tag {
            ContentTag::ColumnBreak => cursor.advance(),
            ContentTag::None => match object.break_type {
                BreakType::Pre => {
                    cursor.advance();
                    cursor.place(object.id);
                }
                BreakType::Mid | BreakType::Post => {
                    cursor.place(object.id);
                    cursor.advance();
                }
                BreakType::None => cursor.place(object.id),
            },
            ContentTag::StartRegion | ContentTag::RegionSettings | ContentTag::EndRegion => {}
        }
    }

    RegionRender {
        strategy: LayoutStrategy::Standard,
        groups: cursor.finish(settings, &column_widths(settings)),
        warnings: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::{glued, keys, tagged, text};
    use crate::parsing::parse_settings;
    use pretty_assertions::assert_eq;

    #[test]
    fn breaks_split_columns() {
        let objects = vec![
            tagged(ContentTag::StartRegion),
            text("text1"),
            tagged(ContentTag::ColumnBreak),
            text("text2"),
            tagged(ContentTag::EndRegion),
        ];
        let render = layout(&objects, &RegionSettings::default());
        assert_eq!(keys(&objects, &render), vec![vec!["text1"], vec!["text2"]]);
    }

    #[test]
    fn no_breaks_fills_first_column() {
        let objects = vec![text("a"), text("b")];
        let render = layout(&objects, &RegionSettings::default());
        assert_eq!(keys(&objects, &render), vec![vec!["a", "b"], vec![]]);
    }

    #[test]
    fn extra_breaks_clamp_to_last_column() {
        let objects = vec![
            text("a"),
            tagged(ContentTag::ColumnBreak),
            text("b"),
            tagged(ContentTag::ColumnBreak),
            text("c"),
        ];
        let render = layout(&objects, &RegionSettings::default());
        assert_eq!(keys(&objects, &render), vec![vec!["a"], vec!["b", "c"]]);
    }

    #[test]
    fn glued_breaks_advance_around_their_object() {
        let objects = vec![
            text("a"),
            glued("b", BreakType::Post),
            text("c"),
            glued("d", BreakType::Pre),
        ];
        let settings = parse_settings("Number of Columns: 3");
        let render = layout(&objects, &settings);
        assert_eq!(keys(&objects, &render), vec![vec!["a", "b"], vec!["c"], vec!["d"]]);
    }

    #[test]
    fn settings_blocks_are_not_placed() {
        let objects = vec![tagged(ContentTag::RegionSettings), text("a")];
        let render = layout(&objects, &RegionSettings::default());
        assert_eq!(keys(&objects, &render)[0], vec!["a"]);
    }

    #[test]
    fn columns_carry_per_column_styles() {
        let settings = parse_settings("Border: [on, off]\nAlignment: [left, right]");
        let render = layout(&[], &settings);
        let columns: Vec<_> = render.columns().collect();
        assert!(columns[0].border);
        assert!(!columns[1].border);
        assert_eq!(columns[1].alignment, crate::models::Alignment::Right);
        assert_eq!(columns[1].width.value, 50.0);
    }
}
