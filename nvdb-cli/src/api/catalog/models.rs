//! NVDB data catalog models
//!
//! Only the fields used by the relation extractor are typed. Everything else
//! is kept in `extra` so diagnostics can show the full record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response of `GET /status`
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogStatus {
    pub datagrunnlag: DataFoundation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataFoundation {
    pub datakatalog: CatalogVersion,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogVersion {
    pub versjon: String,
}

impl CatalogStatus {
    pub fn version(&self) -> &str {
        &self.datagrunnlag.datakatalog.versjon
    }
}

/// How much of each object type the catalog should include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Include {
    PropertyTypes,
    All,
}

impl Include {
    pub fn as_param(&self) -> &'static str {
        match self {
            Include::PropertyTypes => "egenskapstyper",
            Include::All => "alle",
        }
    }
}

/// One object type ("vegobjekttype") of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    pub id: i64,
    #[serde(rename = "navn")]
    pub name: String,
    #[serde(rename = "egenskapstyper", default)]
    pub property_types: Vec<PropertyType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One property type ("egenskapstype") of an object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyType {
    pub id: i64,
    #[serde(rename = "navn")]
    pub name: String,
    #[serde(rename = "datatype", default, deserialize_with = "string_or_number")]
    pub data_type: Option<String>,
    /// Nested description, present on list-valued relations
    #[serde(rename = "innhold", default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Box<PropertyContent>>,
    /// Child object type referenced directly
    #[serde(rename = "vegobjekttypeid", default, skip_serializing_if = "Option::is_none")]
    pub child_object_type_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `innhold` element of a list-valued property type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(
        rename = "datatype",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_type: Option<String>,
    #[serde(rename = "vegobjekttypeid", default, skip_serializing_if = "Option::is_none")]
    pub child_object_type_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Older catalog versions send the data type as a numeric code
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Where a relation property points to its child object type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildReference {
    /// Resolved through the nested `innhold` element
    NestedContent {
        child_id: i64,
        data_type: Option<String>,
        content_id: Option<i64>,
    },
    /// Resolved through the property's own `vegobjekttypeid`
    DirectChildId { child_id: i64 },
    Missing,
}

impl PropertyType {
    /// Work out the child object type, preferring the nested content
    pub fn child_reference(&self) -> ChildReference {
        match (self.content.as_deref(), self.child_object_type_id) {
            (
                Some(content @ PropertyContent {
                    child_object_type_id: Some(child_id),
                    ..
                }),
                _,
            ) => ChildReference::NestedContent {
                child_id: *child_id,
                data_type: content.data_type.clone(),
                content_id: content.id,
            },
            (_, Some(child_id)) => ChildReference::DirectChildId { child_id },
            _ => ChildReference::Missing,
        }
    }
}
