//! Datafangst models: contracts, feature collections and validation results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::api::resilience::PollStatus;

/// Response of `GET /contract/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractList {
    #[serde(default)]
    pub contracts: Vec<Contract>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContractList {
    /// Contracts whose name contains `substring`, ignoring case
    pub fn search(&self, substring: &str) -> Vec<&Contract> {
        let needle = substring.to_lowercase();
        self.contracts
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Hyperlinked resource of a feature collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLink {
    #[serde(default)]
    pub rel: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
}

/// Find the `src` of the resource with the given `rel`
pub fn resource_src<'a>(resources: &'a [ResourceLink], rel: &str) -> Option<&'a str> {
    resources
        .iter()
        .find(|r| r.rel.as_deref() == Some(rel))
        .and_then(|r| r.src.as_deref())
}

/// Response of `GET /contract/{id}/featurecollection`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCollectionList {
    #[serde(default)]
    pub feature_collections: Vec<FeatureCollectionSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollectionSummary {
    pub id: String,
    #[serde(default)]
    pub resources: Vec<ResourceLink>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureCollectionSummary {
    /// Link to the GeoJSON payload: the `data` resource, else the first with a `src`
    pub fn data_link(&self) -> Option<&str> {
        resource_src(&self.resources, "data")
            .or_else(|| self.resources.iter().find_map(|r| r.src.as_deref()))
    }

    /// Link to the validation status: the `status` resource, else `<data>/status`
    pub fn status_link(&self) -> Option<String> {
        resource_src(&self.resources, "status")
            .map(str::to_string)
            .or_else(|| {
                self.data_link()
                    .map(|data| format!("{}/status", data.trim_end_matches('/')))
            })
    }
}

/// Response to a POST/PUT of a feature collection (HTTP 202)
///
/// Acceptance only means the collection was queued for validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub feature_collection_id: String,
    #[serde(default)]
    pub resources: Vec<ResourceLink>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UploadReceipt {
    pub fn status_link(&self) -> Option<&str> {
        resource_src(&self.resources, "status")
    }
}

/// Outcome of server-side validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Pending,
    Processing,
    Accepted,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pending => "PENDING",
            ValidationStatus::Processing => "PROCESSING",
            ValidationStatus::Accepted => "ACCEPTED",
            ValidationStatus::Rejected => "REJECTED",
            ValidationStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ValidationStatus::Accepted | ValidationStatus::Rejected)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warning,
    Notabene,
    #[serde(other)]
    Other,
}

/// Where a validation issue was found
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_collection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_no: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub location: IssueLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureIdMapping {
    pub tag: String,
    pub feature_id: String,
}

/// Body of a status resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub validation_status: ValidationStatus,
    #[serde(default)]
    pub validation_issues: Vec<ValidationIssue>,
    #[serde(default)]
    pub feature_id_mappings: Vec<FeatureIdMapping>,
}

impl ValidationReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.validation_issues
            .iter()
            .filter(|i| i.severity == severity)
            .count()
    }
}

impl PollStatus for ValidationReport {
    fn is_terminal(&self) -> bool {
        self.validation_status.is_terminal()
    }

    fn summary(&self) -> String {
        format!(
            "{} ({} issues, {} errors, {} warnings)",
            self.validation_status,
            self.validation_issues.len(),
            self.count(Severity::Error),
            self.count(Severity::Warning)
        )
    }
}

/// GeoJSON feature collection in the Datafangst flavour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Value,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn feature_type() -> String {
    "Feature".to_string()
}
