use crate::models::{BreakType, ContentObject, ContentTag, RegionSettings};

use super::{ColumnCursor, LayoutStrategy, RegionRender, auto_balance, widths::column_widths};

/// Height-bounded wrapping.
///
/// Columns fill up to `column_height`; an object that would push a non-empty
/// column past it starts the next column, and once every column of a group
/// is used a new group of the same width opens below. A heading is kept
/// together with the object that follows it.
pub fn layout(objects: &[ContentObject], heights: &[f32], settings: &RegionSettings) -> RegionRender {
    let Some(ceiling) = settings.column_height else {
        log::debug!("reflow without a column height, balancing by average instead");
        return auto_balance::layout(objects, heights, settings);
    };
    let height = |i: usize| heights.get(i).copied().unwrap_or(0.0);

    let mut cursor = ColumnCursor::new(settings.columns(), true);
    let mut filled = 0.0;
    let mut i = 0;

    while i < objects.len() {
        let object = &objects[i];
        match object.tag {
            ContentTag::ColumnBreak => {
                cursor.advance();
                filled = 0.0;
                i += 1;
            }
            ContentTag::None => {
                let mut unit = vec![i];
                if object.fragment.is_heading()
                    && object.break_type == BreakType::None
                    && let Some(next) = objects.get(i + 1)
                    && next.is_placeable()
                    && next.break_type != BreakType::Pre
                {
                    unit.push(i + 1);
                }
                let unit_height: f32 = unit.iter().map(|&j| height(j)).sum();

                if object.break_type == BreakType::Pre {
                    cursor.advance();
                    filled = 0.0;
                }
                if !cursor.current_is_empty() && filled + unit_height > ceiling {
                    cursor.advance();
                    filled = 0.0;
                }
                for &j in &unit {
                    cursor.place(objects[j].id);
                }
                filled += unit_height;

                let last = &objects[i + unit.len() - 1];
                if matches!(last.break_type, BreakType::Mid | BreakType::Post) {
                    cursor.advance();
                    filled = 0.0;
                }
                i += unit.len();
            }
            ContentTag::StartRegion | ContentTag::RegionSettings | ContentTag::EndRegion => i += 1,
        }
    }

    RegionRender {
        strategy: LayoutStrategy::Reflow,
        groups: cursor.finish(settings, &column_widths(settings)),
        warnings: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::{heading, keys, tagged, text};
    use crate::parsing::parse_settings;
    use pretty_assertions::assert_eq;

    fn reflow_settings(height: u32) -> RegionSettings {
        parse_settings(&format!("Full Doc Reflow: on\nColumn Height: {height}px"))
    }

    #[test]
    fn overflow_opens_new_groups() {
        let objects: Vec<_> = ["a", "b", "c", "d", "e"].into_iter().map(text).collect();
        let render = layout(&objects, &[60.0; 5], &reflow_settings(100));
        assert_eq!(render.groups.len(), 3);
        assert_eq!(
            keys(&objects, &render),
            vec![vec!["a"], vec!["b"], vec!["c"], vec!["d"], vec!["e"], vec![]]
        );
    }

    #[test]
    fn fills_column_up_to_ceiling() {
        let objects: Vec<_> = ["a", "b", "c"].into_iter().map(text).collect();
        let render = layout(&objects, &[50.0, 50.0, 50.0], &reflow_settings(100));
        assert_eq!(keys(&objects, &render), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn heading_moves_with_following_object() {
        let objects = vec![text("a"), heading("h"), text("b")];
        let render = layout(&objects, &[50.0, 30.0, 40.0], &reflow_settings(100));
        assert_eq!(keys(&objects, &render), vec![vec!["a"], vec!["h", "b"]]);
    }

    #[test]
    fn oversized_object_still_placed() {
        let objects = vec![text("big")];
        let render = layout(&objects, &[150.0], &reflow_settings(100));
        assert_eq!(keys(&objects, &render), vec![vec!["big"], vec![]]);
    }

    #[test]
    fn explicit_breaks_wrap_into_new_group() {
        let objects = vec![
            text("a"),
            tagged(ContentTag::ColumnBreak),
            text("b"),
            tagged(ContentTag::ColumnBreak),
            text("c"),
        ];
        let render = layout(&objects, &[10.0, 0.0, 10.0, 0.0, 10.0], &reflow_settings(1000));
        assert_eq!(render.groups.len(), 2);
        assert_eq!(
            keys(&objects, &render),
            vec![vec!["a"], vec!["b"], vec!["c"], vec![]]
        );
    }

    #[test]
    fn without_column_height_balances() {
        let objects: Vec<_> = ["a", "b", "c"].into_iter().map(text).collect();
        let settings = parse_settings("Full Doc Reflow: on");
        let render = layout(&objects, &[100.0, 100.0, 10.0], &settings);
        assert_eq!(keys(&objects, &render), vec![vec!["a", "b"], vec!["c"]]);
    }
}
