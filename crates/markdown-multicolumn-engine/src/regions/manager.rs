use crate::error::RegionWarning;
use crate::export::ExportTarget;
use crate::layout::{LayoutStrategy, Measure, RegionRender};
use crate::models::{BreakType, ContentObject, ContentTag, Fragment, ObjectId, RegionSettings};

use super::content_model::ContentObjectModel;

/// Whether a region still has content after a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    Keep,
    /// The last object is gone; the region should be dropped.
    Empty,
}

#[derive(Debug, Clone)]
struct CachedRender {
    content_version: u64,
    settings_version: u64,
    render: RegionRender,
}

/// Owns one region's content and settings and renders it into columns.
#[derive(Debug, Clone)]
pub struct RegionManager {
    region_id: String,
    settings: RegionSettings,
    settings_version: u64,
    strategy: LayoutStrategy,
    content: ContentObjectModel,
    cache: Option<CachedRender>,
}

impl RegionManager {
    pub fn new(region_id: impl Into<String>, settings: RegionSettings) -> Self {
        Self {
            region_id: region_id.into(),
            strategy: LayoutStrategy::for_settings(&settings),
            settings,
            settings_version: 0,
            content: ContentObjectModel::new(),
            cache: None,
        }
    }

    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    pub fn settings(&self) -> &RegionSettings {
        &self.settings
    }

    pub fn strategy(&self) -> LayoutStrategy {
        self.strategy
    }

    pub fn content(&self) -> &ContentObjectModel {
        &self.content
    }

    /// Replaces the settings, switching strategy if they call for another.
    /// The content is kept as is.
    pub fn set_settings(&mut self, settings: RegionSettings) {
        if settings == self.settings {
            return;
        }
        let strategy = LayoutStrategy::for_settings(&settings);
        if strategy != self.strategy {
            log::debug!(
                "region {:?}: switching layout {:?} -> {:?}",
                self.region_id,
                self.strategy,
                strategy
            );
        }
        self.strategy = strategy;
        self.settings = settings;
        self.settings_version += 1;
    }

    pub fn add_object(&mut self, above: &[Fragment], below: &[Fragment], object: ContentObject) -> usize {
        self.content.add(above, below, object)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Teardown {
        if self.content.remove(id).is_none() {
            log::debug!("region {:?}: no object {id} to remove", self.region_id);
        }
        if self.content.is_empty() {
            Teardown::Empty
        } else {
            Teardown::Keep
        }
    }

    pub fn update_tag(&mut self, id: ObjectId, tag: ContentTag, break_type: BreakType) -> bool {
        self.content.update_tag(id, tag, break_type)
    }

    /// Lays the content out with the active strategy.
    ///
    /// The result is cached against the content and settings versions, so
    /// rendering an unchanged region returns the previous render untouched.
    pub fn render(&mut self, measure: &mut dyn Measure) -> &RegionRender {
        let fresh = self.cache.as_ref().is_some_and(|cache| {
            cache.content_version == self.content.version()
                && cache.settings_version == self.settings_version
        });
        let cache = match self.cache.take() {
            Some(cache) if fresh => cache,
            _ => CachedRender {
                render: self.layout(measure),
                content_version: self.content.version(),
                settings_version: self.settings_version,
            },
        };
        &self.cache.insert(cache).render
    }

    fn layout(&mut self, measure: &mut dyn Measure) -> RegionRender {
        let heights = if self.strategy.needs_heights() {
            self.measure_all(measure)
        } else {
            vec![]
        };
        let render = self
            .strategy
            .layout(self.content.objects(), &heights, &self.settings);

        let ids: Vec<ObjectId> = self.content.objects().iter().map(|o| o.id).collect();
        for id in ids {
            self.content.set_column(id, render.column_of(id));
        }
        render
    }

    fn measure_all(&mut self, measure: &mut dyn Measure) -> Vec<f32> {
        let mut heights = Vec::with_capacity(self.content.len());
        let mut measured = vec![];
        for object in self.content.objects() {
            let height = match object.height {
                Some(height) => height,
                None if object.is_placeable() => {
                    let height = measure.measure(&object.fragment);
                    measured.push((object.id, height));
                    height
                }
                None => 0.0,
            };
            heights.push(height);
        }
        for (id, height) in measured {
            self.content.set_height(id, height);
        }
        heights
    }

    /// The most recent render, which may predate the latest content change.
    pub fn last_render(&self) -> Option<&RegionRender> {
        self.cache.as_ref().map(|cache| &cache.render)
    }

    /// Warnings of the most recent render.
    pub fn warnings(&self) -> &[RegionWarning] {
        self.cache
            .as_ref()
            .map(|cache| cache.render.warnings.as_slice())
            .unwrap_or_default()
    }

    /// Renders and walks the columns into `target`.
    pub fn export_for_print(&mut self, target: &mut dyn ExportTarget, measure: &mut dyn Measure) {
        let render = self.render(measure).clone();
        for warning in &render.warnings {
            target.warning(warning);
        }
        for group in &render.groups {
            target.begin_group(group);
            for column in &group.columns {
                let fragments: Vec<&Fragment> = column
                    .items
                    .iter()
                    .filter_map(|id| self.content.get_by_id(*id))
                    .map(|object| &object.fragment)
                    .collect();
                target.column(column, &fragments);
            }
            target.end_group(group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::PlainTextExport;
    use crate::layout::LineMeasure;
    use crate::parsing::parse_settings;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn paragraph(text: &str) -> ContentObject {
        ContentObject::new(Fragment::paragraph(text), text)
    }

    fn manager_with(texts: &[&str]) -> RegionManager {
        let mut manager = RegionManager::new("A", RegionSettings::default());
        let fragments: Vec<Fragment> = texts.iter().map(|t| Fragment::paragraph(*t)).collect();
        for (i, text) in texts.iter().enumerate() {
            let mut object = paragraph(text);
            if text.starts_with("---") {
                object = object.with_tag(ContentTag::ColumnBreak, BreakType::None);
            }
            manager.add_object(&fragments[..i], &fragments[i + 1..], object);
        }
        manager
    }

    #[test]
    fn render_is_idempotent() {
        let mut manager = manager_with(&["a", "--- column-break ---", "b"]);
        let mut measure = LineMeasure::default();
        let first = manager.render(&mut measure).clone();
        let second = manager.render(&mut measure).clone();
        assert_eq!(first, second);
        assert_eq!(first.assignments().iter().map(Vec::len).collect::<Vec<_>>(), vec![1, 1]);
    }

    #[test]
    fn render_records_assigned_columns() {
        let mut manager = manager_with(&["a", "--- column-break ---", "b"]);
        manager.render(&mut LineMeasure::default());
        let columns: Vec<_> = manager.content().objects().iter().map(|o| o.column).collect();
        assert_eq!(columns, vec![Some(0), None, Some(1)]);
    }

    #[test]
    fn cached_render_is_reused_until_content_changes() {
        let mut manager = manager_with(&["a", "b"]);
        manager.set_settings(parse_settings("Auto Layout: on"));
        let calls = Cell::new(0);
        let mut counting = |_: &Fragment| {
            calls.set(calls.get() + 1);
            10.0
        };
        manager.render(&mut counting);
        manager.render(&mut counting);
        assert_eq!(calls.get(), 2);

        let fragments = [Fragment::paragraph("a"), Fragment::paragraph("b")];
        manager.add_object(&fragments, &[], paragraph("c"));
        manager.render(&mut counting);
        // Heights of a and b are cached on the objects.
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn settings_change_swaps_strategy_and_keeps_content() {
        let mut manager = manager_with(&["a", "b", "c"]);
        assert_eq!(manager.strategy(), LayoutStrategy::Standard);

        manager.set_settings(parse_settings("Number of Columns: 1"));
        assert_eq!(manager.strategy(), LayoutStrategy::SingleColumn);
        assert_eq!(manager.content().len(), 3);

        let render = manager.render(&mut LineMeasure::default());
        assert_eq!(render.strategy, LayoutStrategy::SingleColumn);
        assert_eq!(render.assignments()[0].len(), 3);
    }

    #[test]
    fn settings_change_invalidates_cache() {
        let mut manager = manager_with(&["a", "b"]);
        let before = manager.render(&mut LineMeasure::default()).clone();
        manager.set_settings(parse_settings("Number of Columns: 3"));
        let after = manager.render(&mut LineMeasure::default()).clone();
        assert_eq!(before.assignments().len(), 2);
        assert_eq!(after.assignments().len(), 3);
    }

    #[test]
    fn removing_last_object_requests_teardown() {
        let mut manager = manager_with(&["a", "b"]);
        let ids: Vec<_> = manager.content().objects().iter().map(|o| o.id).collect();
        assert_eq!(manager.remove_object(ids[0]), Teardown::Keep);
        assert_eq!(manager.remove_object(ids[1]), Teardown::Empty);
    }

    #[test]
    fn export_walks_columns() {
        let mut manager = manager_with(&["left", "--- column-break ---", "right"]);
        let mut export = PlainTextExport::new();
        manager.export_for_print(&mut export, &mut LineMeasure::default());
        let text = export.finish();
        assert!(text.find("left").unwrap() < text.find("right").unwrap());
        assert!(!text.contains("column-break"));
    }
}
