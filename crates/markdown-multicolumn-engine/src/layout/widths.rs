use crate::models::{ColumnLayout, ColumnSize, ColumnWidth, RegionSettings};

const TWO_COLUMNS: &[(ColumnLayout, [f32; 2])] = &[
    (ColumnLayout::Standard, [50.0, 50.0]),
    (ColumnLayout::Left, [75.0, 25.0]),
    (ColumnLayout::Center, [50.0, 50.0]),
    (ColumnLayout::Right, [25.0, 75.0]),
];

const THREE_COLUMNS: &[(ColumnLayout, [f32; 3])] = &[
    (ColumnLayout::Standard, [33.3, 33.3, 33.3]),
    (ColumnLayout::Left, [50.0, 25.0, 25.0]),
    (ColumnLayout::Center, [25.0, 50.0, 25.0]),
    (ColumnLayout::Right, [25.0, 25.0, 50.0]),
];

fn preset<const N: usize>(table: &[(ColumnLayout, [f32; N])], layout: ColumnLayout) -> Vec<ColumnWidth> {
    table
        .iter()
        .find(|(l, _)| *l == layout)
        .or(table.first())
        .map(|(_, widths)| widths.iter().copied().map(ColumnWidth::percent).collect())
        .unwrap_or_default()
}

/// Widths of the columns of a multi-column region, one per column.
///
/// Explicit widths win over the largest-column preset; a short explicit list
/// repeats its last entry. Counts without a preset split evenly.
pub fn column_widths(settings: &RegionSettings) -> Vec<ColumnWidth> {
    let columns = settings.columns();
    if let ColumnSize::Widths(widths) = &settings.column_size
        && let Some(last) = widths.last()
    {
        return (0..columns)
            .map(|i| widths.get(i).copied().unwrap_or(*last))
            .collect();
    }

    match columns {
        2 => preset(TWO_COLUMNS, settings.column_layout),
        3 => preset(THREE_COLUMNS, settings.column_layout),
        n => vec![ColumnWidth::percent(100.0 / n as f32); n],
    }
}

/// Width of a single-column region.
pub fn single_column_width(settings: &RegionSettings) -> ColumnWidth {
    match &settings.column_size {
        ColumnSize::Preset(size) => ColumnWidth::percent(size.percent()),
        ColumnSize::Widths(widths) => widths
            .first()
            .copied()
            .unwrap_or(ColumnWidth::percent(crate::models::SizePreset::Medium.percent())),
    }
}
