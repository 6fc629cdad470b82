pub mod classify;
pub mod fence;
pub mod lines;
pub mod locator;
pub mod markers;
pub mod pandoc;
pub mod settings;
pub mod span;

pub use classify::{Classification, classify_fragment};
pub use locator::{RegionKind, RegionLocation, locate_region};
pub use markers::{Marker, MarkerKind, Scanner, find_all_markers, find_last_marker, find_marker};
pub use settings::{parse_pandoc_attributes, parse_settings, serialize_settings};
pub use span::Span;

/// Hard caps on marker scanning for pathological input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    /// Pandoc fence lines examined when looking for a balanced close.
    pub max_fence_tokens: usize,
    /// Region start/end markers walked by the locator in one direction.
    pub max_region_tags: usize,
}

impl ScanLimits {
    pub const DEFAULT_MAX_FENCE_TOKENS: usize = 100;
    pub const DEFAULT_MAX_REGION_TAGS: usize = 100;
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_fence_tokens: Self::DEFAULT_MAX_FENCE_TOKENS,
            max_region_tags: Self::DEFAULT_MAX_REGION_TAGS,
        }
    }
}
