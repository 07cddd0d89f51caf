pub mod error;
pub mod extract;
pub mod graph;
pub mod loader;
pub mod rrf;
pub mod scope;
pub mod staging;

pub use error::{Error, Result};
pub use extract::{ExtractReport, Extractor};
pub use graph::OutputTable;
pub use loader::{load_release, LoadReport};
pub use scope::{HierarchyMode, Scope};
pub use staging::Staging;
