//! NVDB data catalog: object types and their property types

pub mod client;
pub mod models;

pub use client::{CatalogClient, CatalogSnapshot};
pub use models::{ChildReference, Include, ObjectType, PropertyType};
