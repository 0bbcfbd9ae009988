//! Relation types derived from the data catalog

pub mod extract;
pub mod models;

pub use extract::{RELATION_MARKER, catalog_identifiers, extract_relations};
pub use models::{Extraction, RelationType};
