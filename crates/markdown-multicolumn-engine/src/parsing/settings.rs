//! Settings block parsing and serialisation.
//!
//! A settings body is a list of `key: value` lines. Keys are matched
//! case-, space-, hyphen- and underscore-insensitively against an alias
//! table; unknown keys and unusable values are skipped so the rest of the
//! block still applies.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

use crate::models::settings::{
    Alignment, ColumnLayout, ColumnPosition, ColumnSize, ColumnWidth, ContentOverflow, Keyword,
    PerColumn, RegionSettings, SizePreset, Switch, normalize_word,
};

use super::pandoc::ColumnsAttributes;

/// Column counts the line-marker grammar accepts. Pandoc fences may ask for more.
pub const LEGACY_COLUMN_RANGE: std::ops::RangeInclusive<usize> = 1..=3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingKey {
    NumberOfColumns,
    /// Column count written for Pandoc regions wider than the line markers allow.
    PandocColumns,
    LargestColumn,
    Border,
    Shadow,
    AutoLayout,
    ColumnPosition,
    ColumnSize,
    Overflow,
    Alignment,
    ColumnHeight,
    FullDocReflow,
    Id,
}

const KEY_ALIASES: &[(SettingKey, &[&str])] = &[
    (
        SettingKey::NumberOfColumns,
        &["numberofcolumns", "numofcols", "numberofcols", "colcount", "columncount", "columns"],
    ),
    (SettingKey::PandocColumns, &["pandoccolumns", "fencecolumns"]),
    (SettingKey::LargestColumn, &["largestcolumn", "columnlayout", "layout"]),
    (SettingKey::Border, &["border", "drawborder", "columnborder"]),
    (SettingKey::Shadow, &["shadow", "drawshadow", "columnshadow"]),
    (SettingKey::AutoLayout, &["autolayout", "autobalance"]),
    (
        SettingKey::ColumnPosition,
        &["columnposition", "colposition", "columnlocation", "collocation"],
    ),
    (SettingKey::ColumnSize, &["columnsize", "colsize", "columnwidth", "colwidth"]),
    (SettingKey::Overflow, &["overflow", "contentoverflow"]),
    (SettingKey::Alignment, &["alignment", "contentalignment", "textalign"]),
    (SettingKey::ColumnHeight, &["columnheight", "colheight", "maxcolumnheight"]),
    (SettingKey::FullDocReflow, &["fulldocreflow", "reflow", "fulldocumentreflow"]),
    (SettingKey::Id, &["id", "regionid"]),
];

static KEY_TABLE: LazyLock<HashMap<&'static str, SettingKey>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for (key, aliases) in KEY_ALIASES {
        for alias in *aliases {
            let previous = table.insert(*alias, *key);
            debug_assert!(previous.is_none(), "setting alias {alias} registered twice");
        }
    }
    table
});

fn lookup_key(raw: &str) -> Option<SettingKey> {
    KEY_TABLE.get(normalize_word(raw).as_str()).copied()
}

/// Parses a settings body on top of the defaults.
pub fn parse_settings(body: &str) -> RegionSettings {
    apply_settings(RegionSettings::default(), body)
}

/// Applies every recognised `key: value` line of `body` to `base`.
pub fn apply_settings(mut base: RegionSettings, body: &str) -> RegionSettings {
    for line in body.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        apply_pair(&mut base, key, value, LEGACY_COLUMN_RANGE);
    }
    base
}

/// Applies a Pandoc fence attribute block (`{.3-columns #id border=off}`) on
/// top of `base`. Attributes without a columns class leave `base` unchanged.
pub fn parse_pandoc_attributes(attributes: &str, base: RegionSettings) -> RegionSettings {
    let Some(parsed) = ColumnsAttributes::parse(attributes) else {
        return base;
    };
    let mut settings = base;
    settings.number_of_columns = parsed.columns;
    if parsed.id.is_some() {
        settings.id = parsed.id;
    }
    for (key, value) in &parsed.pairs {
        apply_pair(&mut settings, key, value, 1..=usize::MAX);
    }
    settings
}

/// Returns false when the key is unknown or the value unusable.
fn apply_pair(
    settings: &mut RegionSettings,
    key: &str,
    value: &str,
    column_range: std::ops::RangeInclusive<usize>,
) -> bool {
    let Some(setting) = lookup_key(key) else {
        log::debug!("ignoring unknown setting {:?}", key.trim());
        return false;
    };
    let value = value.trim();

    let applied = match setting {
        SettingKey::NumberOfColumns => value
            .parse::<usize>()
            .ok()
            .filter(|n| column_range.contains(n))
            .map(|n| settings.number_of_columns = n),
        SettingKey::PandocColumns => value
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .map(|n| settings.number_of_columns = n),
        SettingKey::LargestColumn => {
            ColumnLayout::from_keyword(value).map(|v| settings.column_layout = v)
        }
        SettingKey::Border => parse_per_column(value, parse_switch).map(|v| settings.draw_border = v),
        SettingKey::Shadow => parse_per_column(value, parse_switch).map(|v| settings.draw_shadow = v),
        SettingKey::AutoLayout => parse_switch(value).map(|v| settings.auto_layout = v),
        SettingKey::ColumnPosition => {
            ColumnPosition::from_keyword(value).map(|v| settings.column_position = v)
        }
        SettingKey::ColumnSize => parse_column_size(value).map(|v| settings.column_size = v),
        SettingKey::Overflow => parse_per_column(value, ContentOverflow::from_keyword)
            .map(|v| settings.content_overflow = v),
        SettingKey::Alignment => {
            parse_per_column(value, Alignment::from_keyword).map(|v| settings.alignment = v)
        }
        SettingKey::ColumnHeight => parse_height(value).map(|v| settings.column_height = Some(v)),
        SettingKey::FullDocReflow => parse_switch(value).map(|v| settings.full_doc_reflow = v),
        SettingKey::Id => (!value.is_empty()).then(|| settings.id = Some(value.to_string())),
    };

    if applied.is_none() {
        log::debug!("ignoring value {value:?} for setting {setting:?}");
    }
    applied.is_some()
}

fn parse_switch(value: &str) -> Option<bool> {
    Switch::from_keyword(value).map(|Switch(on)| on)
}

/// Splits `[a, b, c]` into its items; any other value is a single item.
fn list_items(value: &str) -> Vec<&str> {
    match value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        Some(inner) => inner.split(',').map(str::trim).collect(),
        None => vec![value],
    }
}

fn parse_list<T>(value: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    list_items(value).into_iter().map(parse).collect()
}

fn parse_per_column<T>(value: &str, parse: impl Fn(&str) -> Option<T>) -> Option<PerColumn<T>> {
    parse_list(value, parse).and_then(PerColumn::from_values)
}

fn parse_column_size(value: &str) -> Option<ColumnSize> {
    if let Some(preset) = SizePreset::from_keyword(value) {
        return Some(ColumnSize::Preset(preset));
    }
    parse_list(value, ColumnWidth::parse)
        .filter(|widths| !widths.is_empty())
        .map(ColumnSize::Widths)
}

fn parse_height(value: &str) -> Option<f32> {
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f32>().ok().filter(|h| h.is_finite() && *h > 0.0)
}

fn write_list<T>(out: &mut String, values: &[T], item: impl Fn(&T) -> String) {
    if let [single] = values {
        out.push_str(&item(single));
        return;
    }
    let items: Vec<String> = values.iter().map(item).collect();
    let _ = write!(out, "[{}]", items.join(", "));
}

/// Writes `settings` as a settings body that parses back to the same value.
pub fn serialize_settings(settings: &RegionSettings) -> String {
    let mut out = String::new();
    let switch = |on: &bool| Switch(*on).keyword().to_string();

    if LEGACY_COLUMN_RANGE.contains(&settings.number_of_columns) {
        let _ = writeln!(out, "Number of Columns: {}", settings.number_of_columns);
    } else {
        let _ = writeln!(out, "Pandoc Columns: {}", settings.number_of_columns);
    }
    let _ = writeln!(out, "Largest Column: {}", settings.column_layout.keyword());

    out.push_str("Border: ");
    write_list(&mut out, settings.draw_border.as_slice(), switch);
    out.push('\n');

    out.push_str("Shadow: ");
    write_list(&mut out, settings.draw_shadow.as_slice(), switch);
    out.push('\n');

    let _ = writeln!(out, "Auto Layout: {}", settings.auto_layout);
    let _ = writeln!(out, "Column Position: {}", settings.column_position.keyword());

    out.push_str("Column Size: ");
    match &settings.column_size {
        ColumnSize::Preset(preset) => out.push_str(preset.keyword()),
        ColumnSize::Widths(widths) => {
            let items: Vec<String> = widths.iter().map(ToString::to_string).collect();
            let _ = write!(out, "[{}]", items.join(", "));
        }
    }
    out.push('\n');

    out.push_str("Overflow: ");
    write_list(&mut out, settings.content_overflow.as_slice(), |v| v.keyword().to_string());
    out.push('\n');

    out.push_str("Alignment: ");
    write_list(&mut out, settings.alignment.as_slice(), |v| v.keyword().to_string());
    out.push('\n');

    let _ = writeln!(out, "Full Doc Reflow: {}", settings.full_doc_reflow);
    if let Some(height) = settings.column_height {
        let _ = writeln!(out, "Column Height: {height}px");
    }
    if let Some(id) = &settings.id {
        let _ = writeln!(out, "ID: {id}");
    }
    out
}
