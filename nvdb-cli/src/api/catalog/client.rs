//! Client for the NVDB read API (catalog endpoints only)

use chrono::NaiveDate;
use log::info;
use reqwest::header::ACCEPT;
use serde_json::Value;

use super::models::{CatalogStatus, Include, ObjectType};
use crate::api::error::ApiError;
use crate::api::http::{self, HttpSettings};
use crate::api::models::Environment;

/// Catalog version plus the object types fetched in the same run
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub environment: Environment,
    pub version: String,
    /// Catalog exactly as the service returned it
    pub raw: Value,
    pub object_types: Vec<ObjectType>,
}

impl CatalogSnapshot {
    /// `datakatalog-<ENV>-<version>-<date>.json`, dots in the version become underscores
    pub fn dump_file_name(&self, date: NaiveDate) -> String {
        format!(
            "datakatalog-{}-{}-{}.json",
            self.environment.label(),
            self.version.replace('.', "_"),
            date.format("%Y-%m-%d")
        )
    }
}

/// Reads the catalog of one environment
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    environment: Environment,
}

impl CatalogClient {
    pub fn new(
        base_url: impl Into<String>,
        environment: Environment,
        settings: &HttpSettings,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            http: settings.build_client()?,
            base_url: base_url.into(),
            environment,
        })
    }

    /// `GET /status`
    pub async fn status(&self) -> Result<CatalogStatus, ApiError> {
        let url = http::join_url(&self.base_url, "status");
        let request = self.http.get(&url).header(ACCEPT, "application/json");
        let response = http::send(request, &url).await?;
        http::read_json(response, &url).await
    }

    /// `GET /vegobjekttyper?inkluder=...`, undecoded
    pub async fn object_types_raw(&self, include: Include) -> Result<Value, ApiError> {
        let url = http::join_url(&self.base_url, "vegobjekttyper");
        let request = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&[("inkluder", include.as_param())]);
        let response = http::send(request, &url).await?;
        http::read_json(response, &url).await
    }

    /// Status and object types in two sequential requests
    pub async fn snapshot(&self, include: Include) -> Result<CatalogSnapshot, ApiError> {
        let status = self.status().await?;
        let version = status.version().to_string();
        info!(
            "Catalog version {} in {} ({})",
            version, self.environment, self.base_url
        );

        let raw = self.object_types_raw(include).await?;
        let object_types: Vec<ObjectType> =
            serde_json::from_value(raw.clone()).map_err(|source| ApiError::Decode {
                url: http::join_url(&self.base_url, "vegobjekttyper"),
                source,
            })?;
        info!("Fetched {} object types", object_types.len());

        Ok(CatalogSnapshot {
            environment: self.environment,
            version,
            raw,
            object_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> CatalogClient {
        let settings = HttpSettings {
            contact: Some("nvdb@vegvesen.no".to_string()),
            ..HttpSettings::default()
        };
        CatalogClient::new(server.uri(), Environment::Test, &settings).unwrap()
    }

    async fn mount_status(server: &MockServer, version: &str) {
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "datagrunnlag": { "datakatalog": { "versjon": version } }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_snapshot_fetches_status_and_object_types() {
        let server = MockServer::start().await;
        mount_status(&server, "2.34").await;

        Mock::given(method("GET"))
            .and(path("/vegobjekttyper"))
            .and(query_param("inkluder", "egenskapstyper"))
            .and(header("x-kontaktperson", "nvdb@vegvesen.no"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 241,
                    "navn": "Vegdekke",
                    "egenskapstyper": [
                        { "id": 200805, "navn": "Assosiert Entreprenør", "datatype": "Liste",
                          "innhold": { "datatype": "Assosiasjon", "vegobjekttypeid": 608 } }
                    ]
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = client(&server)
            .snapshot(Include::PropertyTypes)
            .await
            .unwrap();

        assert_eq!(snapshot.version, "2.34");
        assert_eq!(snapshot.object_types.len(), 1);
        assert_eq!(snapshot.object_types[0].property_types[0].id, 200805);
        assert_eq!(snapshot.raw[0]["navn"], "Vegdekke");
    }

    #[tokio::test]
    async fn test_status_failure_is_unreachable_service() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(502).set_body_string("x".repeat(2000)))
            .mount(&server)
            .await;

        let err = client(&server)
            .snapshot(Include::All)
            .await
            .unwrap_err();

        match err {
            ApiError::UnreachableService { url, status, body } => {
                assert!(url.ends_with("/status"));
                assert_eq!(status, 502);
                assert_eq!(body.len(), 500);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_catalog_failure_after_status() {
        let server = MockServer::start().await;
        mount_status(&server, "2.34").await;

        Mock::given(method("GET"))
            .and(path("/vegobjekttyper"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(&server)
            .snapshot(Include::All)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::UnreachableService { status: 500, .. }));
    }

    #[test]
    fn test_dump_file_name() {
        let snapshot = CatalogSnapshot {
            environment: Environment::Prod,
            version: "2.34".to_string(),
            raw: json!([]),
            object_types: Vec::new(),
        };
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        assert_eq!(
            snapshot.dump_file_name(date),
            "datakatalog-PROD-2_34-2024-07-04.json"
        );
    }
}
