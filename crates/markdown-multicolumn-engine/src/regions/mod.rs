pub mod content_model;
pub mod manager;

pub use content_model::ContentObjectModel;
pub use manager::{RegionManager, Teardown};
