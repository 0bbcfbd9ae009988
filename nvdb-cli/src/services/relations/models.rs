use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A relation property flattened out of the catalog
///
/// Serialized field names follow the column names used in the
/// Datafangst maintenance spreadsheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationType {
    #[serde(rename = "morObjTypeId")]
    pub parent_type_id: i64,
    #[serde(rename = "morObjTypeNavn")]
    pub parent_type_name: String,
    #[serde(rename = "type_id")]
    pub type_id: i64,
    #[serde(rename = "relasjonNavn")]
    pub relation_name: String,
    #[serde(rename = "datatype")]
    pub data_type: Option<String>,
    #[serde(rename = "datterObjektTypeId")]
    pub child_type_id: i64,
    /// Id of the nested `innhold` element, when the relation is list-valued
    #[serde(rename = "innhold_id")]
    pub content_id: Option<i64>,
}

/// A relation property whose child object type could not be resolved
#[derive(Debug, Clone, PartialEq, Error)]
#[error("no child object type on property {property_id} of object type {object_type_id} ({object_type_name})")]
pub struct MalformedCatalogEntry {
    pub object_type_id: i64,
    pub object_type_name: String,
    pub property_id: i64,
    /// The property record as the catalog sent it
    pub property: Value,
}

/// Output of the relation extractor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub relations: Vec<RelationType>,
    pub anomalies: Vec<MalformedCatalogEntry>,
}

impl Extraction {
    /// Number of marker properties seen, resolved or not
    pub fn marker_count(&self) -> usize {
        self.relations.len() + self.anomalies.len()
    }
}
