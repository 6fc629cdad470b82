use crate::models::{ContentObject, RegionSettings};

use super::{ColumnGroup, LayoutStrategy, RegionRender, styled_column, widths::single_column_width};

/// One column holding every placeable object; only width and position vary.
pub fn layout(objects: &[ContentObject], settings: &RegionSettings) -> RegionRender {
    let items = objects
        .iter()
        .filter(|object| object.is_placeable())
        .map(|object| object.id)
        .collect();
    let width = single_column_width(settings);

    RegionRender {
        strategy: LayoutStrategy::SingleColumn,
        groups: vec![ColumnGroup {
            position: settings.column_position,
            columns: vec![styled_column(settings, &[width], 0, items)],
        }],
        warnings: vec![],
    }
}
