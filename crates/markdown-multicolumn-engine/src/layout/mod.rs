//! Column layout strategies.
//!
//! A strategy partitions a region's ordered content objects into columns.
//! Strategies hold no state: each render is a pure function of the objects,
//! their measured heights, and the region settings.

pub mod auto_balance;
pub mod reflow;
pub mod single;
pub mod standard;
pub mod widths;

use serde::Serialize;

use crate::error::RegionWarning;
use crate::models::{
    Alignment, BreakType, ColumnPosition, ColumnWidth, ContentObject, ContentOverflow, Fragment,
    ObjectId, RegionSettings,
};

/// Injected height measurement for a rendered fragment.
pub trait Measure {
    fn measure(&mut self, fragment: &Fragment) -> f32;
}

impl<F> Measure for F
where
    F: FnMut(&Fragment) -> f32,
{
    fn measure(&mut self, fragment: &Fragment) -> f32 {
        self(fragment)
    }
}

/// Measures fragments as line count times a fixed line height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMeasure {
    pub line_height: f32,
}

impl LineMeasure {
    pub const DEFAULT_LINE_HEIGHT: f32 = 20.0;

    pub fn new(line_height: f32) -> Self {
        Self { line_height }
    }
}

impl Default for LineMeasure {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LINE_HEIGHT)
    }
}

impl Measure for LineMeasure {
    fn measure(&mut self, fragment: &Fragment) -> f32 {
        let lines = fragment.text.lines().count().max(1);
        lines as f32 * self.line_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LayoutStrategy {
    Standard,
    AutoBalance,
    Reflow,
    SingleColumn,
}

impl LayoutStrategy {
    /// The strategy a region with `settings` renders with.
    pub fn for_settings(settings: &RegionSettings) -> Self {
        if settings.columns() == 1 {
            LayoutStrategy::SingleColumn
        } else if settings.auto_layout {
            LayoutStrategy::AutoBalance
        } else if settings.full_doc_reflow {
            LayoutStrategy::Reflow
        } else {
            LayoutStrategy::Standard
        }
    }

    pub fn needs_heights(self) -> bool {
        matches!(self, LayoutStrategy::AutoBalance | LayoutStrategy::Reflow)
    }

    /// Lays out `objects`. `heights` is parallel to `objects` and may be
    /// empty for strategies that do not measure.
    pub fn layout(
        self,
        objects: &[ContentObject],
        heights: &[f32],
        settings: &RegionSettings,
    ) -> RegionRender {
        let mut render = match self {
            LayoutStrategy::Standard => standard::layout(objects, settings),
            LayoutStrategy::AutoBalance => auto_balance::layout(objects, heights, settings),
            LayoutStrategy::Reflow => reflow::layout(objects, heights, settings),
            LayoutStrategy::SingleColumn => single::layout(objects, settings),
        };
        render.strategy = self;
        render.warnings = break_warnings(objects);
        render
    }
}

/// One column of a render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedColumn {
    pub index: usize,
    pub width: ColumnWidth,
    pub border: bool,
    pub shadow: bool,
    pub overflow: ContentOverflow,
    pub alignment: Alignment,
    pub items: Vec<ObjectId>,
}

/// A row of side-by-side columns. Only reflow produces more than one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnGroup {
    pub position: ColumnPosition,
    pub columns: Vec<RenderedColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRender {
    pub strategy: LayoutStrategy,
    pub groups: Vec<ColumnGroup>,
    pub warnings: Vec<RegionWarning>,
}

impl RegionRender {
    pub fn columns(&self) -> impl Iterator<Item = &RenderedColumn> {
        self.groups.iter().flat_map(|group| group.columns.iter())
    }

    /// Item ids per column, groups flattened in order.
    pub fn assignments(&self) -> Vec<Vec<ObjectId>> {
        self.columns().map(|column| column.items.clone()).collect()
    }

    /// Column index (within its group) of every placed object.
    pub fn column_of(&self, id: ObjectId) -> Option<usize> {
        self.columns()
            .find(|column| column.items.contains(&id))
            .map(|column| column.index)
    }
}

/// Tracks the column being filled and grows the group list on demand.
pub(crate) struct ColumnCursor {
    groups: Vec<Vec<Vec<ObjectId>>>,
    column: usize,
    columns: usize,
    wrap: bool,
}

impl ColumnCursor {
    /// A cursor over one group of `columns` columns. With `wrap`, advancing
    /// past the last column opens a new group; otherwise it stays put.
    pub(crate) fn new(columns: usize, wrap: bool) -> Self {
        let columns = columns.max(1);
        Self {
            groups: vec![vec![vec![]; columns]],
            column: 0,
            columns,
            wrap,
        }
    }

    pub(crate) fn advance(&mut self) {
        if self.column + 1 < self.columns {
            self.column += 1;
        } else if self.wrap {
            self.groups.push(vec![vec![]; self.columns]);
            self.column = 0;
        }
    }

    pub(crate) fn is_last_column(&self) -> bool {
        self.column + 1 >= self.columns
    }

    pub(crate) fn current_is_empty(&self) -> bool {
        self.current().is_empty()
    }

    pub(crate) fn place(&mut self, id: ObjectId) {
        log::trace!("placing {id} in column {}", self.column);
        self.current_mut().push(id);
    }

    fn current(&self) -> &Vec<ObjectId> {
        &self.groups[self.groups.len() - 1][self.column]
    }

    fn current_mut(&mut self) -> &mut Vec<ObjectId> {
        let group = self.groups.len() - 1;
        &mut self.groups[group][self.column]
    }

    /// Builds the groups, styling columns from `settings` and `widths`.
    pub(crate) fn finish(self, settings: &RegionSettings, widths: &[ColumnWidth]) -> Vec<ColumnGroup> {
        self.groups
            .into_iter()
            .map(|group| ColumnGroup {
                position: settings.column_position,
                columns: group
                    .into_iter()
                    .enumerate()
                    .map(|(index, items)| styled_column(settings, widths, index, items))
                    .collect(),
            })
            .collect()
    }
}

pub(crate) fn styled_column(
    settings: &RegionSettings,
    widths: &[ColumnWidth],
    index: usize,
    items: Vec<ObjectId>,
) -> RenderedColumn {
    let width = widths
        .get(index)
        .or(widths.last())
        .copied()
        .unwrap_or(ColumnWidth::percent(100.0));
    RenderedColumn {
        index,
        width,
        border: *settings.draw_border.get(index),
        shadow: *settings.draw_shadow.get(index),
        overflow: *settings.content_overflow.get(index),
        alignment: *settings.alignment.get(index),
        items,
    }
}

fn break_warnings(objects: &[ContentObject]) -> Vec<RegionWarning> {
    objects
        .iter()
        .filter(|object| object.break_type != BreakType::None)
        .map(|object| {
            log::warn!("column break glued to content in object {}", object.id);
            RegionWarning::MalformedColumnBreak {
                break_type: object.break_type,
                text: object.fragment.text.clone(),
            }
        })
        .collect()
}
