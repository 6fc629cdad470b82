use std::fmt;

use serde::Serialize;

/// Normalises a keyword or key for table lookup: lowercase, with
/// whitespace, underscores and hyphens removed.
pub fn normalize_word(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// A closed set of values spelled by keywords in settings text.
///
/// `TABLE` lists every accepted (normalised) spelling; the first spelling of
/// each variant is the canonical one used when serialising.
pub trait Keyword: Copy + PartialEq + 'static {
    const TABLE: &'static [(&'static str, Self)];

    fn from_keyword(raw: &str) -> Option<Self> {
        let word = normalize_word(raw);
        Self::TABLE
            .iter()
            .find(|(spelling, _)| *spelling == word)
            .map(|(_, value)| *value)
    }

    fn keyword(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, value)| *value == self)
            .map(|(spelling, _)| *spelling)
            .unwrap_or_default()
    }
}

/// Which column the "Largest Column" setting widens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ColumnLayout {
    #[default]
    Standard,
    Left,
    Center,
    Right,
}

impl Keyword for ColumnLayout {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("standard", Self::Standard),
        ("left", Self::Left),
        ("first", Self::Left),
        ("center", Self::Center),
        ("centre", Self::Center),
        ("middle", Self::Center),
        ("second", Self::Center),
        ("right", Self::Right),
        ("third", Self::Right),
        ("last", Self::Right),
    ];
}

/// Width presets for a single-column region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SizePreset {
    Small,
    #[default]
    Medium,
    Large,
    Full,
}

impl Keyword for SizePreset {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("small", Self::Small),
        ("sm", Self::Small),
        ("medium", Self::Medium),
        ("med", Self::Medium),
        ("large", Self::Large),
        ("lg", Self::Large),
        ("full", Self::Full),
        ("fullwidth", Self::Full),
        ("fullpage", Self::Full),
    ];
}

impl SizePreset {
    pub fn percent(self) -> f32 {
        match self {
            SizePreset::Small => 25.0,
            SizePreset::Medium => 50.0,
            SizePreset::Large => 75.0,
            SizePreset::Full => 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ColumnPosition {
    Left,
    #[default]
    Center,
    Right,
}

impl Keyword for ColumnPosition {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("left", Self::Left),
        ("center", Self::Center),
        ("centre", Self::Center),
        ("middle", Self::Center),
        ("right", Self::Right),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ContentOverflow {
    #[default]
    Scroll,
    Hidden,
}

impl Keyword for ContentOverflow {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("scroll", Self::Scroll),
        ("auto", Self::Scroll),
        ("hidden", Self::Hidden),
        ("hide", Self::Hidden),
        ("clip", Self::Hidden),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Keyword for Alignment {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("left", Self::Left),
        ("center", Self::Center),
        ("centre", Self::Center),
        ("middle", Self::Center),
        ("right", Self::Right),
    ];
}

/// On/off switches (border, shadow, auto layout, reflow).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switch(pub bool);

impl Keyword for Switch {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("enabled", Self(true)),
        ("on", Self(true)),
        ("true", Self(true)),
        ("disabled", Self(false)),
        ("off", Self(false)),
        ("false", Self(false)),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LengthUnit {
    Percent,
    Px,
    Pt,
    Em,
    Rem,
    Vw,
}

impl LengthUnit {
    const SUFFIXES: &'static [(&'static str, LengthUnit)] = &[
        ("%", LengthUnit::Percent),
        ("px", LengthUnit::Px),
        ("pt", LengthUnit::Pt),
        ("rem", LengthUnit::Rem),
        ("em", LengthUnit::Em),
        ("vw", LengthUnit::Vw),
    ];

    pub fn suffix(self) -> &'static str {
        Self::SUFFIXES
            .iter()
            .find(|(_, unit)| *unit == self)
            .map(|(suffix, _)| *suffix)
            .unwrap_or_default()
    }
}

/// An explicit column width such as `25%` or `200px`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnWidth {
    pub value: f32,
    pub unit: LengthUnit,
}

impl ColumnWidth {
    pub fn percent(value: f32) -> Self {
        Self {
            value,
            unit: LengthUnit::Percent,
        }
    }

    /// Parses `25%`, `200px`, `12.5em`, ... A bare number is a percentage.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        let (number, unit) = LengthUnit::SUFFIXES
            .iter()
            .find_map(|(suffix, unit)| raw.strip_suffix(suffix).map(|n| (n.trim().to_string(), *unit)))
            .unwrap_or((raw.clone(), LengthUnit::Percent));
        let value = number.parse::<f32>().ok()?;
        (value.is_finite() && value > 0.0).then_some(Self { value, unit })
    }
}

impl fmt::Display for ColumnWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// Named preset or explicit per-column widths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColumnSize {
    Preset(SizePreset),
    Widths(Vec<ColumnWidth>),
}

impl Default for ColumnSize {
    fn default() -> Self {
        ColumnSize::Preset(SizePreset::default())
    }
}

/// Per-column values. Never empty; indexing past the end yields the last entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerColumn<T>(Vec<T>);

impl<T> PerColumn<T> {
    pub fn single(value: T) -> Self {
        Self(vec![value])
    }

    /// Returns `None` for an empty list.
    pub fn from_values(values: Vec<T>) -> Option<Self> {
        (!values.is_empty()).then_some(Self(values))
    }

    pub fn get(&self, index: usize) -> &T {
        let last = self.0.len() - 1;
        &self.0[index.min(last)]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

/// Settings of one multi-column region. Immutable value: a change produces
/// a new record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSettings {
    pub number_of_columns: usize,
    pub column_layout: ColumnLayout,
    pub column_size: ColumnSize,
    pub column_position: ColumnPosition,
    pub draw_border: PerColumn<bool>,
    pub draw_shadow: PerColumn<bool>,
    pub content_overflow: PerColumn<ContentOverflow>,
    pub alignment: PerColumn<Alignment>,
    pub auto_layout: bool,
    pub full_doc_reflow: bool,
    /// Height bound used by reflow, in measurement units.
    pub column_height: Option<f32>,
    /// Region id given inside a settings body (oldest start syntax).
    pub id: Option<String>,
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            number_of_columns: 2,
            column_layout: ColumnLayout::default(),
            column_size: ColumnSize::default(),
            column_position: ColumnPosition::default(),
            draw_border: PerColumn::single(true),
            draw_shadow: PerColumn::single(true),
            content_overflow: PerColumn::single(ContentOverflow::default()),
            alignment: PerColumn::single(Alignment::default()),
            auto_layout: false,
            full_doc_reflow: false,
            column_height: None,
            id: None,
        }
    }
}

impl RegionSettings {
    /// Number of columns, never below one.
    pub fn columns(&self) -> usize {
        self.number_of_columns.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_is_two_centered_bordered_columns() {
        let settings = RegionSettings::default();
        assert_eq!(settings.number_of_columns, 2);
        assert_eq!(settings.column_position, ColumnPosition::Center);
        assert!(*settings.draw_border.get(0));
        assert!(*settings.draw_shadow.get(5));
    }

    #[test]
    fn per_column_clamps_to_last_entry() {
        let values = PerColumn::from_values(vec![true, false]).unwrap();
        assert!(*values.get(0));
        assert!(!*values.get(1));
        assert!(!*values.get(7));
        assert_eq!(PerColumn::<bool>::from_values(vec![]), None);
    }

    #[rstest]
    #[case("First", Some(ColumnLayout::Left))]
    #[case("MIDDLE", Some(ColumnLayout::Center))]
    #[case("last", Some(ColumnLayout::Right))]
    #[case("huge", None)]
    fn layout_keywords(#[case] raw: &str, #[case] expected: Option<ColumnLayout>) {
        assert_eq!(ColumnLayout::from_keyword(raw), expected);
    }

    #[test]
    fn canonical_keyword_is_first_spelling() {
        assert_eq!(ColumnLayout::Center.keyword(), "center");
        assert_eq!(SizePreset::Full.keyword(), "full");
        assert_eq!(Switch(false).keyword(), "disabled");
    }

    #[test]
    fn full_width_with_space_is_a_preset() {
        assert_eq!(SizePreset::from_keyword("Full Width"), Some(SizePreset::Full));
    }

    #[rstest]
    #[case("25%", Some(ColumnWidth::percent(25.0)))]
    #[case("40", Some(ColumnWidth::percent(40.0)))]
    #[case(" 200px ", Some(ColumnWidth { value: 200.0, unit: LengthUnit::Px }))]
    #[case("1.5rem", Some(ColumnWidth { value: 1.5, unit: LengthUnit::Rem }))]
    #[case("2em", Some(ColumnWidth { value: 2.0, unit: LengthUnit::Em }))]
    #[case("wide", None)]
    #[case("-5%", None)]
    fn parses_widths(#[case] raw: &str, #[case] expected: Option<ColumnWidth>) {
        assert_eq!(ColumnWidth::parse(raw), expected);
    }

    #[test]
    fn width_display_round_trips() {
        let width = ColumnWidth {
            value: 33.3,
            unit: LengthUnit::Percent,
        };
        assert_eq!(width.to_string(), "33.3%");
        assert_eq!(ColumnWidth::parse(&width.to_string()), Some(width));
    }
}
