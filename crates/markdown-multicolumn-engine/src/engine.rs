//! Host-facing entry point.
//!
//! The host calls [`Engine::mount`] for every fragment it renders and
//! [`Engine::unmount`] when a fragment goes away, in any order. The engine
//! works out which region each fragment belongs to, keeps each region's
//! content in document order, and renders regions into columns on demand.

use serde::Serialize;

use crate::error::RegionError;
use crate::export::ExportTarget;
use crate::layout::{Measure, RegionRender};
use crate::models::{
    ContentObject, ContentTag, DocumentId, Fragment, ObjectId, RegionDirectory, RegionSettings,
};
use crate::parsing::settings::apply_settings;
use crate::parsing::{
    MarkerKind, RegionKind, RegionLocation, ScanLimits, Scanner, classify_fragment, locate_region,
    parse_pandoc_attributes, parse_settings,
};
use crate::regions::Teardown;
use crate::render::MarkdownRenderer;

/// Where a mounted fragment sits in its document.
#[derive(Debug, Clone, Copy)]
pub struct SectionInfo<'a> {
    /// Document text before the fragment.
    pub lines_above: &'a str,
    /// Markdown source of the fragment itself.
    pub source: &'a str,
    /// Document text after the fragment.
    pub lines_below: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MountOutcome {
    /// Not inside any region; the host renders the fragment normally.
    Outside,
    Placed {
        region_id: String,
        object_id: ObjectId,
        index: usize,
    },
    /// The region cannot be shown; the host displays `error` in its place.
    Rejected { region_id: String, error: RegionError },
}

/// Concatenates two text pieces so the second starts on its own line.
fn join_lines(first: &str, second: &str) -> String {
    let mut joined = String::with_capacity(first.len() + second.len() + 1);
    joined.push_str(first);
    if !first.is_empty() && !first.ends_with('\n') && !second.is_empty() {
        joined.push('\n');
    }
    joined.push_str(second);
    joined
}

#[derive(Debug, Default)]
pub struct Engine {
    scanner: Scanner,
    directory: RegionDirectory,
}

impl Engine {
    pub fn new(limits: ScanLimits) -> Self {
        Self {
            scanner: Scanner::new(limits),
            directory: RegionDirectory::new(),
        }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn directory(&self) -> &RegionDirectory {
        &self.directory
    }

    /// Handles a fragment the host has just rendered.
    pub fn mount(
        &mut self,
        document: &DocumentId,
        section: SectionInfo<'_>,
        fragment: Fragment,
        renderer: &mut dyn MarkdownRenderer,
    ) -> MountOutcome {
        let scanner = self.scanner;
        let with_source = join_lines(section.lines_above, section.source);

        let (location, closes_region) = match locate_region(&scanner, &with_source, section.lines_below) {
            Some(location) => (location, false),
            None => {
                // A fragment holding the region's end marker is the last
                // piece of that region.
                let rest = join_lines(section.source, section.lines_below);
                match locate_region(&scanner, section.lines_above, &rest) {
                    Some(location) => (location, true),
                    None => return MountOutcome::Outside,
                }
            }
        };

        if location.is_duplicate() {
            log::warn!(
                "{document}: region id {:?} is used more than once",
                location.region_id
            );
            return MountOutcome::Rejected {
                error: RegionError::DuplicateRegionId {
                    id: location.region_id.clone(),
                },
                region_id: location.region_id,
            };
        }

        let (region_above, region_below) = if closes_region {
            (location.lines_above_trimmed.as_str(), "")
        } else {
            // `lines_above_trimmed` ends with the fragment's own source.
            let above_end = section.lines_above.len();
            let region_above = with_source
                .get(location.start.start()..above_end)
                .unwrap_or_default();
            (region_above, location.lines_below_trimmed.as_str())
        };
        let above = renderer.render(region_above);
        let below = renderer.render(region_below);

        let settings = self.region_settings(&location);
        let mut class = classify_fragment(&scanner, section.source);
        if closes_region {
            class.tag = ContentTag::EndRegion;
        }
        let object = ContentObject::new(fragment, section.source).with_tag(class.tag, class.break_type);
        let object_id = object.id;

        let manager = self
            .directory
            .get_or_create(document, &location.region_id, || settings.clone());
        if manager.settings() != &settings {
            manager.set_settings(settings);
        }
        let index = manager.add_object(&above, &below, object);
        log::trace!(
            "{document}: placed {object_id} at {index} in region {:?} as {:?}",
            location.region_id,
            class.tag
        );

        MountOutcome::Placed {
            region_id: location.region_id,
            object_id,
            index,
        }
    }

    /// Settings from the start marker, overlaid by the region's first
    /// settings block.
    fn region_settings(&self, location: &RegionLocation) -> RegionSettings {
        let start_body = location.start.body.as_deref().unwrap_or_default();
        let base = match location.kind {
            RegionKind::Pandoc => parse_pandoc_attributes(start_body, RegionSettings::default()),
            RegionKind::Legacy => parse_settings(start_body),
        };

        let region_text = join_lines(&location.lines_above_trimmed, &location.lines_below_trimmed);
        let after_start = region_text.get(location.start.len()..).unwrap_or_default();
        match self.scanner.find(MarkerKind::SettingsBlockStart, after_start) {
            Some(block) => apply_settings(base, block.body.as_deref().unwrap_or_default()),
            None => base,
        }
    }

    /// Handles a fragment the host has discarded. Unknown ids are a no-op.
    pub fn unmount(&mut self, document: &DocumentId, region_id: &str, object_id: ObjectId) -> bool {
        let Some(manager) = self.directory.get_mut(document, region_id) else {
            log::debug!("{document}: unmount for unknown region {region_id:?}");
            return false;
        };
        if manager.remove_object(object_id) == Teardown::Empty {
            self.directory.remove_region(document, region_id);
        }
        true
    }

    pub fn render_region(
        &mut self,
        document: &DocumentId,
        region_id: &str,
        measure: &mut dyn Measure,
    ) -> Option<&RegionRender> {
        Some(self.directory.get_mut(document, region_id)?.render(measure))
    }

    pub fn export_region(
        &mut self,
        document: &DocumentId,
        region_id: &str,
        target: &mut dyn ExportTarget,
        measure: &mut dyn Measure,
    ) -> bool {
        let Some(manager) = self.directory.get_mut(document, region_id) else {
            return false;
        };
        manager.export_for_print(target, measure);
        true
    }

    /// Re-renders every live region, returning those whose columns changed.
    pub fn tick(&mut self, measure: &mut dyn Measure) -> Vec<(DocumentId, String)> {
        let mut changed = vec![];
        for (document, manager) in self.directory.iter_mut() {
            let previous = manager.last_render().cloned();
            let current = manager.render(measure);
            if previous.as_ref() != Some(current) {
                changed.push((document.clone(), manager.region_id().to_string()));
            }
        }
        changed
    }

    /// Drops every region of a closed document.
    pub fn close_document(&mut self, document: &DocumentId) -> usize {
        self.directory.remove_document(document)
    }
}
