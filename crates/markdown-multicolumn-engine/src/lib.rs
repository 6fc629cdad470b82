pub mod engine;
pub mod error;
pub mod export;
pub mod io;
pub mod layout;
pub mod models;
pub mod parsing;
pub mod regions;
pub mod render;
pub mod replay;

// Re-export key types for easier usage
pub use engine::{Engine, MountOutcome, SectionInfo};
pub use error::{RegionError, RegionWarning};
pub use export::{ExportTarget, HtmlExport, PlainTextExport};
pub use io::*;
pub use layout::{ColumnGroup, LayoutStrategy, LineMeasure, Measure, RegionRender, RenderedColumn};
pub use models::*;
pub use parsing::{Marker, MarkerKind, ScanLimits, Scanner};
pub use regions::{ContentObjectModel, RegionManager, Teardown};
pub use render::{BlockRenderer, MarkdownRenderer};
pub use replay::HostSimulator;
