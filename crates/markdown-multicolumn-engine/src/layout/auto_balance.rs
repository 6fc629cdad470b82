use crate::models::{BreakType, ContentObject, ContentTag, RegionSettings};

use super::{ColumnCursor, LayoutStrategy, RegionRender, widths::column_widths};

/// Greedy height balancing.
///
/// The target height per column is the total placeable height divided by the
/// column count. Each object is placed in the current column first; if the
/// column now exceeds the target and a later column exists, the next object
/// starts a new column. Explicit breaks always advance.
pub fn layout(objects: &[ContentObject], heights: &[f32], settings: &RegionSettings) -> RegionRender {
    let columns = settings.columns();
    let height = |i: usize| heights.get(i).copied().unwrap_or(0.0);

    let total: f32 = objects
        .iter()
        .enumerate()
        .filter(|(_, object)| object.is_placeable())
        .map(|(i, _)| height(i))
        .sum();
    let target = total / columns as f32;
    log::trace!("auto balance: total height {total}, target {target} per column");

    let mut cursor = ColumnCursor::new(columns, false);
    let mut filled = 0.0;

    for (i, object) in objects.iter().enumerate() {
        match object.tag {
            ContentTag::ColumnBreak => {
                cursor.advance();
                filled = 0.0;
            }
            ContentTag::None => {
                if object.break_type == BreakType::Pre {
                    cursor.advance();
                    filled = 0.0;
                }
                cursor.place(object.id);
                filled += height(i);

                let glued_after = matches!(object.break_type, BreakType::Mid | BreakType::Post);
                if glued_after || (filled > target && !cursor.is_last_column()) {
                    cursor.advance();
                    filled = 0.0;
                }
            }
            ContentTag::StartRegion | ContentTag::RegionSettings | ContentTag::EndRegion => {}
        }
    }

    RegionRender {
        strategy: LayoutStrategy::AutoBalance,
        groups: cursor.finish(settings, &column_widths(settings)),
        warnings: vec![],
    }
}
