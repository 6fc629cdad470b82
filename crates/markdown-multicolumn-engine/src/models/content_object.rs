use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::fragment::Fragment;

/// Identity of a content object. Survives re-keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role of a content object within its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ContentTag {
    #[default]
    None,
    StartRegion,
    RegionSettings,
    ColumnBreak,
    EndRegion,
}

impl ContentTag {
    /// Only untagged objects are laid out into columns.
    pub fn is_placeable(self) -> bool {
        self == ContentTag::None
    }
}

/// Where a column break sits relative to content sharing its fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum BreakType {
    #[default]
    None,
    /// Break first, content after: the content opens the next column.
    Pre,
    /// Content on both sides.
    Mid,
    /// Content first, break after.
    Post,
}

/// The engine's record of one fragment inside a region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentObject {
    pub id: ObjectId,
    pub node_key: String,
    /// How many fragments with the same key precede this one in its
    /// region. Set when the object is placed.
    pub occurrence: usize,
    pub fragment: Fragment,
    /// Markdown source the fragment was rendered from.
    pub source: String,
    pub tag: ContentTag,
    pub break_type: BreakType,
    /// Column assigned by the most recent render.
    pub column: Option<usize>,
    /// Measured height, cached once known.
    pub height: Option<f32>,
}

impl ContentObject {
    pub fn new(fragment: Fragment, source: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            node_key: fragment.node_key(),
            occurrence: 0,
            fragment,
            source: source.into(),
            tag: ContentTag::None,
            break_type: BreakType::None,
            column: None,
            height: None,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: ContentTag, break_type: BreakType) -> Self {
        self.tag = tag;
        self.break_type = break_type;
        self
    }

    pub fn is_placeable(&self) -> bool {
        self.tag.is_placeable()
    }
}
