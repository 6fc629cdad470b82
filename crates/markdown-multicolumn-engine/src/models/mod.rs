pub mod content_object;
pub mod directory;
pub mod fragment;
pub mod settings;

pub use content_object::{BreakType, ContentObject, ContentTag, ObjectId};
pub use directory::{DocumentId, RegionDirectory};
pub use fragment::{Fragment, FragmentKind};
pub use settings::*;
