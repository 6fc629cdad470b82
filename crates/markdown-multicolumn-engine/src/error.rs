use serde::Serialize;

use crate::models::BreakType;

/// A region that cannot be rendered. Shown in place of the region's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum RegionError {
    #[error("Region ID \"{id}\" is already used by another multi-column region in this document")]
    DuplicateRegionId { id: String },
}

/// A recoverable problem attached to a region's render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum RegionWarning {
    #[error(
        "Column break is not separated from surrounding content ({break_type:?}): {text:?}. Put a blank line on both sides of the break"
    )]
    MalformedColumnBreak { break_type: BreakType, text: String },
}
