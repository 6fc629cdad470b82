//! Drives an [`Engine`] the way a host would, from a whole markdown document.
//!
//! The document is split into top-level blocks; each block becomes one
//! mounted fragment. Blocks can be mounted in any order, which is what hosts
//! that render lazily or concurrently do.

use std::ops::Range;

use crate::engine::{Engine, MountOutcome, SectionInfo};
use crate::error::RegionError;
use crate::models::{DocumentId, Fragment};
use crate::render::{BlockRenderer, MarkdownRenderer};

#[derive(Debug, Clone)]
struct Block {
    source: Range<usize>,
    fragment: Fragment,
    outcome: Option<MountOutcome>,
}

#[derive(Debug, Clone)]
pub struct HostSimulator {
    document: DocumentId,
    markdown: String,
    renderer: BlockRenderer,
    blocks: Vec<Block>,
}

impl HostSimulator {
    pub fn new(document: DocumentId, markdown: impl Into<String>) -> Self {
        let markdown = markdown.into();
        let renderer = BlockRenderer::new();
        let blocks = renderer
            .render_blocks(&markdown)
            .into_iter()
            .map(|block| {
                // Fragments cover whole lines.
                let line_start = markdown[..block.source.start].rfind('\n').map_or(0, |i| i + 1);
                Block {
                    source: line_start..block.source.end,
                    fragment: block.fragment,
                    outcome: None,
                }
            })
            .collect();
        Self {
            document,
            markdown,
            renderer,
            blocks,
        }
    }

    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn fragment(&self, index: usize) -> Option<&Fragment> {
        self.blocks.get(index).map(|block| &block.fragment)
    }

    /// Mounts block `index`, replacing any earlier mount of the same block.
    pub fn mount(&mut self, engine: &mut Engine, index: usize) -> Option<&MountOutcome> {
        self.unmount(engine, index);
        let block = self.blocks.get(index)?;
        let range = block.source.clone();
        let section = SectionInfo {
            lines_above: &self.markdown[..range.start],
            source: &self.markdown[range.clone()],
            lines_below: &self.markdown[range.end..],
        };
        let outcome = engine.mount(&self.document, section, block.fragment.clone(), &mut self.renderer);
        let block = self.blocks.get_mut(index)?;
        Some(block.outcome.insert(outcome))
    }

    /// Mounts every block in document order.
    pub fn mount_all(&mut self, engine: &mut Engine) {
        for index in 0..self.blocks.len() {
            self.mount(engine, index);
        }
    }

    /// Mounts blocks in the given order. Out of range indices are skipped.
    pub fn mount_in_order(&mut self, engine: &mut Engine, order: &[usize]) {
        for &index in order {
            if self.mount(engine, index).is_none() {
                log::debug!("{}: no block {index} to mount", self.document);
            }
        }
    }

    /// Unmounts block `index`; false when it was not mounted into a region.
    pub fn unmount(&mut self, engine: &mut Engine, index: usize) -> bool {
        let Some(block) = self.blocks.get_mut(index) else {
            return false;
        };
        match block.outcome.take() {
            Some(MountOutcome::Placed {
                region_id, object_id, ..
            }) => engine.unmount(&self.document, &region_id, object_id),
            _ => false,
        }
    }

    pub fn unmount_all(&mut self, engine: &mut Engine) {
        for index in 0..self.blocks.len() {
            self.unmount(engine, index);
        }
    }

    pub fn outcome(&self, index: usize) -> Option<&MountOutcome> {
        self.blocks.get(index)?.outcome.as_ref()
    }

    /// Index of the first block whose text contains `needle`.
    pub fn find_block(&self, needle: &str) -> Option<usize> {
        self.blocks
            .iter()
            .position(|block| self.markdown[block.source.clone()].contains(needle))
    }

    /// Blocks rejected by the engine, with the error shown in their place.
    pub fn rejections(&self) -> impl Iterator<Item = (usize, &RegionError)> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(index, block)| match &block.outcome {
                Some(MountOutcome::Rejected { error, .. }) => Some((index, error)),
                _ => None,
            })
    }

    /// Ids of the regions blocks were placed into, in document order.
    pub fn region_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = vec![];
        for block in &self.blocks {
            if let Some(MountOutcome::Placed { region_id, .. }) = &block.outcome
                && !ids.contains(region_id)
            {
                ids.push(region_id.clone());
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = "intro\n\n--- start-multi-column: A\n\nleft\n\n--- column-break ---\n\nright\n\n--- end-multi-column\n\noutro\n";

    #[test]
    fn blocks_cover_whole_lines() {
        let host = HostSimulator::new(DocumentId::from("a.md"), "> quoted\n\n  indented para\n");
        assert_eq!(host.block_count(), 2);
        assert_eq!(host.find_block("indented"), Some(1));
    }

    #[test]
    fn mount_all_places_region_blocks() {
        let mut engine = Engine::default();
        let mut host = HostSimulator::new(DocumentId::from("a.md"), DOC);
        host.mount_all(&mut engine);

        assert_eq!(host.outcome(0), Some(&MountOutcome::Outside));
        assert_eq!(host.outcome(host.block_count() - 1), Some(&MountOutcome::Outside));
        assert_eq!(host.region_ids(), vec!["A".to_string()]);
        let manager = engine.directory().get(host.document(), "A").unwrap();
        assert_eq!(manager.content().len(), 5);
    }

    #[test]
    fn remount_replaces_object() {
        let mut engine = Engine::default();
        let mut host = HostSimulator::new(DocumentId::from("a.md"), DOC);
        host.mount_all(&mut engine);
        let left = host.find_block("left").unwrap();
        host.mount(&mut engine, left);

        let manager = engine.directory().get(host.document(), "A").unwrap();
        assert_eq!(manager.content().len(), 5);
    }

    #[test]
    fn unmount_all_tears_down() {
        let mut engine = Engine::default();
        let mut host = HostSimulator::new(DocumentId::from("a.md"), DOC);
        host.mount_all(&mut engine);
        host.unmount_all(&mut engine);
        assert!(engine.directory().is_empty());
        assert!(host.rejections().next().is_none());
    }
}
