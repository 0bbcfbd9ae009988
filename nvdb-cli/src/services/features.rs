//! Local handling of feature collections: reading, status merging, saving

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::datafangst::models::{FeatureCollection, ValidationStatus};
use crate::api::error::ApiError;

/// Property under which the validation status is stored on each feature
pub const STATUS_PROPERTY: &str = "validationStatus";

/// Write `status` into the property bag of every feature
///
/// Features without a property bag get an empty one first.
pub fn merge_validation_status(collection: &mut FeatureCollection, status: ValidationStatus) {
    for feature in &mut collection.features {
        feature
            .properties
            .get_or_insert_with(Map::new)
            .insert(
                STATUS_PROPERTY.to_string(),
                Value::String(status.as_str().to_string()),
            );
    }
}

/// Read a GeoJSON feature collection from disk
pub fn load_collection(path: &Path) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a GeoJSON feature collection", path.display()))
}

/// Write `<dir>/<collection id>.geojson` as indented JSON
pub fn save_collection(
    dir: &Path,
    collection_id: &str,
    collection: &FeatureCollection,
) -> Result<PathBuf, ApiError> {
    let path = dir.join(format!("{}.geojson", sanitize_file_stem(collection_id)));
    let text = serde_json::to_string_pretty(collection).map_err(|source| ApiError::Decode {
        url: path.display().to_string(),
        source,
    })?;
    fs::write(&path, text).map_err(|source| ApiError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

// Keep collection ids from escaping the target directory
fn sanitize_file_stem(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection() -> FeatureCollection {
        serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": null, "properties": { "navn": "Bom" } },
                { "type": "Feature", "geometry": null }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_merge_sets_status_on_every_feature() {
        let mut fc = collection();
        merge_validation_status(&mut fc, ValidationStatus::Rejected);

        for feature in &fc.features {
            assert_eq!(
                feature.properties.as_ref().unwrap()[STATUS_PROPERTY],
                "REJECTED"
            );
        }
        assert_eq!(fc.features[0].properties.as_ref().unwrap()["navn"], "Bom");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_collection(dir.path(), "2143c586-d067", &collection()).unwrap();
        assert_eq!(path.file_name().unwrap(), "2143c586-d067.geojson");

        let loaded = load_collection(&path).unwrap();
        assert_eq!(loaded, collection());
    }

    #[test]
    fn test_collection_id_cannot_escape_directory() {
        assert_eq!(sanitize_file_stem("../../etc/passwd"), "______etc_passwd");
    }

    #[test]
    fn test_load_rejects_non_geojson() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feil.geojson");
        fs::write(&path, r#"{ "features": 5 }"#).unwrap();
        assert!(load_collection(&path).is_err());
    }
}
