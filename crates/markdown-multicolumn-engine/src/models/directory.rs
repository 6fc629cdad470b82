use std::collections::BTreeMap;
use std::fmt;

use relative_path::{RelativePath, RelativePathBuf};
use serde::Serialize;

use crate::regions::RegionManager;

use super::settings::RegionSettings;

/// Identity of a document, as a path relative to the document root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DocumentId(RelativePathBuf);

impl DocumentId {
    pub fn new(path: impl AsRef<RelativePath>) -> Self {
        Self(path.as_ref().to_relative_path_buf())
    }

    pub fn as_path(&self) -> &RelativePath {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Region managers by document and region id.
///
/// Uses BTreeMap so documents and regions iterate in a stable order.
#[derive(Debug, Default)]
pub struct RegionDirectory {
    documents: BTreeMap<DocumentId, BTreeMap<String, RegionManager>>,
}

impl RegionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, document: &DocumentId, region_id: &str) -> Option<&RegionManager> {
        self.documents.get(document)?.get(region_id)
    }

    pub fn get_mut(&mut self, document: &DocumentId, region_id: &str) -> Option<&mut RegionManager> {
        self.documents.get_mut(document)?.get_mut(region_id)
    }

    /// The manager for a region, created with `settings()` if absent.
    pub fn get_or_create(
        &mut self,
        document: &DocumentId,
        region_id: &str,
        settings: impl FnOnce() -> RegionSettings,
    ) -> &mut RegionManager {
        self.documents
            .entry(document.clone())
            .or_default()
            .entry(region_id.to_string())
            .or_insert_with(|| {
                log::debug!("creating region {region_id:?} in {document}");
                RegionManager::new(region_id, settings())
            })
    }

    /// Drops a region; the document entry goes with its last region.
    pub fn remove_region(&mut self, document: &DocumentId, region_id: &str) -> Option<RegionManager> {
        let regions = self.documents.get_mut(document)?;
        let removed = regions.remove(region_id);
        if regions.is_empty() {
            self.documents.remove(document);
        }
        if removed.is_some() {
            log::debug!("removed region {region_id:?} from {document}");
        }
        removed
    }

    /// Drops every region of a document, returning how many there were.
    pub fn remove_document(&mut self, document: &DocumentId) -> usize {
        self.documents.remove(document).map_or(0, |regions| regions.len())
    }

    /// Regions of one document, sorted by id.
    pub fn regions(&self, document: &DocumentId) -> impl Iterator<Item = &RegionManager> {
        self.documents.get(document).into_iter().flat_map(|regions| regions.values())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&DocumentId, &mut RegionManager)> {
        self.documents
            .iter_mut()
            .flat_map(|(document, regions)| regions.values_mut().map(move |manager| (document, manager)))
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentId> {
        self.documents.keys()
    }

    /// Total number of regions across documents.
    pub fn len(&self) -> usize {
        self.documents.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }
}
