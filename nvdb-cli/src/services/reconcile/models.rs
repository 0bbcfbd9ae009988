use serde::Serialize;

/// One row of the "known obsolete" relation table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObsoleteRow {
    pub parent_type_id: Option<i64>,
    pub parent_name: String,
    pub child_type_id: Option<i64>,
    pub child_name: String,
    /// Relation id under the legacy numbering (`TS_Id`)
    pub legacy_id: i64,
    /// Catalog version tag, empty when the row has none
    pub catalog_version: String,
    /// The "A og B gyldig" column, kept verbatim
    pub validity: String,
    pub relation_name: String,
}

/// A relation type still present in the operational store but listed as obsolete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetirementCandidate {
    pub row: ObsoleteRow,
    /// Name of the obsolete list the row came from
    pub source: String,
    /// Offset that turned the legacy id into `type_id`
    pub offset: i64,
    pub type_id: i64,
    /// Whether `type_id` is still a relation in the current catalog, if known
    pub in_current_catalog: Option<bool>,
}

/// Flat CSV row for the retirement report
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport<'a> {
    #[serde(rename = "VT_Id")]
    pub parent_type_id: Option<i64>,
    #[serde(rename = "VT_navn")]
    pub parent_name: &'a str,
    #[serde(rename = "VT_Id.1")]
    pub child_type_id: Option<i64>,
    #[serde(rename = "VT_navn.1")]
    pub child_name: &'a str,
    #[serde(rename = "TS_Id")]
    pub legacy_id: i64,
    #[serde(rename = "dakat_versjon")]
    pub catalog_version: &'a str,
    #[serde(rename = "A og B gyldig")]
    pub validity: &'a str,
    #[serde(rename = "SHT_Navn")]
    pub relation_name: &'a str,
    pub source: &'a str,
    pub offset: i64,
    pub type_id: i64,
    pub in_current_catalog: Option<bool>,
}

impl<'a> From<&'a RetirementCandidate> for CandidateReport<'a> {
    fn from(candidate: &'a RetirementCandidate) -> Self {
        let row = &candidate.row;
        Self {
            parent_type_id: row.parent_type_id,
            parent_name: &row.parent_name,
            child_type_id: row.child_type_id,
            child_name: &row.child_name,
            legacy_id: row.legacy_id,
            catalog_version: &row.catalog_version,
            validity: &row.validity,
            relation_name: &row.relation_name,
            source: &candidate.source,
            offset: candidate.offset,
            type_id: candidate.type_id,
            in_current_catalog: candidate.in_current_catalog,
        }
    }
}
