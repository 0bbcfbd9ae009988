//! Relation extraction from the catalog
//!
//! A property type whose name contains the relation marker ("Assosiert")
//! is a relation type. Output order follows the catalog: object types in
//! catalog order, properties in catalog order within each object type.

use log::warn;
use std::collections::HashSet;

use super::models::{Extraction, MalformedCatalogEntry, RelationType};
use crate::api::catalog::{ChildReference, ObjectType, PropertyType};

/// Default marker for relation property names
pub const RELATION_MARKER: &str = "Assosiert";

/// Flatten the relation properties of `object_types`
///
/// Properties without a resolvable child object type are reported in
/// `anomalies` and left out of `relations`.
pub fn extract_relations(object_types: &[ObjectType], marker: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for object_type in object_types {
        for property in object_type
            .property_types
            .iter()
            .filter(|p| p.name.contains(marker))
        {
            match to_relation(object_type, property) {
                Some(relation) => extraction.relations.push(relation),
                None => {
                    let anomaly = MalformedCatalogEntry {
                        object_type_id: object_type.id,
                        object_type_name: object_type.name.clone(),
                        property_id: property.id,
                        property: serde_json::to_value(property).unwrap_or_default(),
                    };
                    warn!("{}", anomaly);
                    extraction.anomalies.push(anomaly);
                }
            }
        }
    }

    extraction
}

fn to_relation(object_type: &ObjectType, property: &PropertyType) -> Option<RelationType> {
    let (child_type_id, data_type, content_id) = match property.child_reference() {
        ChildReference::NestedContent {
            child_id,
            data_type,
            content_id,
        } => (child_id, data_type.or_else(|| property.data_type.clone()), content_id),
        ChildReference::DirectChildId { child_id } => (child_id, property.data_type.clone(), None),
        ChildReference::Missing => return None,
    };

    Some(RelationType {
        parent_type_id: object_type.id,
        parent_type_name: object_type.name.clone(),
        type_id: property.id,
        relation_name: property.name.clone(),
        data_type,
        child_type_id,
        content_id,
    })
}

/// Every identifier under which a current relation may be stored downstream
///
/// List-valued relations are stored either under the property id or the
/// id of their nested content, so both count as current.
pub fn catalog_identifiers(relations: &[RelationType]) -> HashSet<i64> {
    relations
        .iter()
        .flat_map(|r| std::iter::once(r.type_id).chain(r.content_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog(value: serde_json::Value) -> Vec<ObjectType> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_nested_content_relation() {
        let types = catalog(json!([
            {
                "id": 241,
                "navn": "Vegdekke",
                "egenskapstyper": [
                    { "id": 4567, "navn": "Dekketype", "datatype": "FlerverdiAttributt, Tekst" },
                    { "id": 200805, "navn": "Assosiert Entreprenør", "datatype": "Liste",
                      "innhold": { "datatype": "Assosiasjon", "vegobjekttypeid": 608 } }
                ]
            }
        ]));

        let extraction = extract_relations(&types, RELATION_MARKER);

        assert!(extraction.anomalies.is_empty());
        assert_eq!(
            extraction.relations,
            vec![RelationType {
                parent_type_id: 241,
                parent_type_name: "Vegdekke".to_string(),
                type_id: 200805,
                relation_name: "Assosiert Entreprenør".to_string(),
                data_type: Some("Assosiasjon".to_string()),
                child_type_id: 608,
                content_id: None,
            }]
        );
    }

    #[test]
    fn test_direct_child_id_keeps_property_data_type() {
        let types = catalog(json!([
            { "id": 67, "navn": "Tunnelløp", "egenskapstyper": [
                { "id": 201637, "navn": "Assosiert Tunnelovervåkning", "datatype": "Assosiasjon",
                  "vegobjekttypeid": 776 }
            ] }
        ]));

        let extraction = extract_relations(&types, RELATION_MARKER);
        let relation = &extraction.relations[0];
        assert_eq!(relation.child_type_id, 776);
        assert_eq!(relation.data_type.as_deref(), Some("Assosiasjon"));
    }

    #[test]
    fn test_missing_child_is_reported_not_emitted() {
        let types = catalog(json!([
            { "id": 89, "navn": "Signalanlegg", "egenskapstyper": [
                { "id": 201786, "navn": "Assosiert Styreapparat", "datatype": "Assosiasjon" },
                { "id": 201787, "navn": "Assosiert Signalhode", "datatype": "Assosiasjon",
                  "vegobjekttypeid": 457 }
            ] }
        ]));

        let extraction = extract_relations(&types, RELATION_MARKER);

        assert_eq!(extraction.relations.len(), 1);
        assert_eq!(extraction.anomalies.len(), 1);
        let anomaly = &extraction.anomalies[0];
        assert_eq!(anomaly.object_type_id, 89);
        assert_eq!(anomaly.object_type_name, "Signalanlegg");
        assert_eq!(anomaly.property["id"], 201786);
    }

    #[test]
    fn test_relations_plus_anomalies_equal_marker_properties() {
        let types = catalog(json!([
            { "id": 1, "navn": "A", "egenskapstyper": [
                { "id": 10, "navn": "Assosiert B", "vegobjekttypeid": 2 },
                { "id": 11, "navn": "Assosiert C" },
                { "id": 12, "navn": "Lengde" }
            ] },
            { "id": 2, "navn": "B", "egenskapstyper": [
                { "id": 20, "navn": "Assosiert A", "innhold": { "id": 21, "vegobjekttypeid": 1 } },
                { "id": 22, "navn": "Assosiert D", "innhold": { "id": 23 } }
            ] },
            { "id": 3, "navn": "C" }
        ]));

        let marker_properties = types
            .iter()
            .flat_map(|t| &t.property_types)
            .filter(|p| p.name.contains(RELATION_MARKER))
            .count();

        let extraction = extract_relations(&types, RELATION_MARKER);
        assert_eq!(extraction.marker_count(), marker_properties);
        assert_eq!(extraction.relations.len(), 2);

        // Catalog order is kept
        let ids: Vec<i64> = extraction.relations.iter().map(|r| r.type_id).collect();
        assert_eq!(ids, vec![10, 20]);
    }

    #[test]
    fn test_catalog_identifiers_include_content_ids() {
        let types = catalog(json!([
            { "id": 2, "navn": "B", "egenskapstyper": [
                { "id": 20, "navn": "Assosiert A", "innhold": { "id": 21, "vegobjekttypeid": 1 } },
                { "id": 30, "navn": "Assosiert C", "vegobjekttypeid": 3 }
            ] }
        ]));

        let ids = catalog_identifiers(&extract_relations(&types, RELATION_MARKER).relations);
        assert_eq!(ids, HashSet::from([20, 21, 30]));
    }
}
