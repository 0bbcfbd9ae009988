//! Datafangst 1.0 client (basic auth)
//!
//! See <https://apiskriv.vegdata.no/datafangst/datafangst-api>. Uploads are
//! asynchronous: a POST or PUT is answered with HTTP 202 and a set of links,
//! and the validation outcome has to be fetched from the `status` link.

use async_trait::async_trait;
use log::{info, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::models::{
    Contract, ContractList, FeatureCollection, FeatureCollectionList, FeatureCollectionSummary,
    UploadReceipt, ValidationReport, ValidationStatus,
};
use super::session::UploadSession;
use crate::api::error::ApiError;
use crate::api::http::{self, HttpSettings};
use crate::api::models::Credentials;
use crate::api::resilience::{
    PollConfig, StatusSource, poll_until_terminal, poll_until_terminal_with,
};
use crate::services::features;

const GEOJSON: &str = "application/geo+json";
const JSON: &str = "application/json";

/// One collection written by [`Df10Client::download`]
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedCollection {
    pub id: String,
    pub path: PathBuf,
    pub feature_count: usize,
    pub status: ValidationStatus,
}

/// Client for one Datafangst 1.0 deployment
#[derive(Debug, Clone)]
pub struct Df10Client {
    http: reqwest::Client,
    /// e.g. `https://datafangst.vegvesen.no/api/v1/`
    base_url: String,
    credentials: Credentials,
}

impl Df10Client {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        settings: &HttpSettings,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            http: settings.build_client()?,
            base_url: base_url.into(),
            credentials,
        })
    }

    fn contract_url(&self, rest: &str) -> String {
        http::join_url(&http::join_url(&self.base_url, "contract/"), rest)
    }

    fn collections_url(&self, contract_id: &str) -> String {
        self.contract_url(&format!(
            "{}/featurecollection",
            urlencoding::encode(contract_id)
        ))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, accept: &str) -> Result<T, ApiError> {
        let request = self
            .http
            .get(url)
            .header(ACCEPT, accept)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password));
        let response = http::send(request, url).await?;
        http::read_json(response, url).await
    }

    /// Contracts visible to the authenticated user
    pub async fn list_contracts(&self) -> Result<ContractList, ApiError> {
        let url = self.contract_url("");
        self.get_json(&url, JSON).await
    }

    pub async fn get_contract(&self, contract_id: &str) -> Result<Contract, ApiError> {
        let url = self.contract_url(&urlencoding::encode(contract_id));
        self.get_json(&url, JSON).await
    }

    pub async fn list_feature_collections(
        &self,
        contract_id: &str,
    ) -> Result<FeatureCollectionList, ApiError> {
        let url = self.collections_url(contract_id);
        self.get_json(&url, JSON).await
    }

    /// Submit a new feature collection to a contract
    pub async fn upload(
        &self,
        contract_id: &str,
        collection: &FeatureCollection,
    ) -> Result<UploadReceipt, ApiError> {
        let url = self.collections_url(contract_id);
        let request = self.http.post(&url);
        self.submit(request, &url, collection).await
    }

    /// Overwrite an existing feature collection
    pub async fn replace(
        &self,
        contract_id: &str,
        collection_id: &str,
        collection: &FeatureCollection,
    ) -> Result<UploadReceipt, ApiError> {
        let url = format!(
            "{}/{}",
            self.collections_url(contract_id),
            urlencoding::encode(collection_id)
        );
        let request = self.http.put(&url);
        self.submit(request, &url, collection).await
    }

    async fn submit(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        collection: &FeatureCollection,
    ) -> Result<UploadReceipt, ApiError> {
        let body = serde_json::to_vec(collection).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })?;
        let request = request
            .header(CONTENT_TYPE, GEOJSON)
            .header(ACCEPT, JSON)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .body(body);

        let response = http::send(request, url).await?;
        let status = response.status().as_u16();
        let receipt: UploadReceipt = http::read_json(response, url).await?;
        info!(
            "Feature collection {} accepted for validation (HTTP {})",
            receipt.feature_collection_id, status
        );
        Ok(receipt)
    }

    /// One GET against a status link
    pub async fn poll_status(&self, status_link: &str) -> Result<ValidationReport, ApiError> {
        self.get_json(status_link, JSON).await
    }

    /// Poll until the collection is accepted or rejected
    pub async fn wait_for_validation(
        &self,
        status_link: &str,
        config: &PollConfig,
    ) -> Result<ValidationReport, ApiError> {
        poll_until_terminal(self, status_link, config).await
    }

    /// Upload (or replace) and poll to a final status, recording each step in `session`
    pub async fn submit_and_wait(
        &self,
        session: &mut UploadSession,
        collection: &FeatureCollection,
        replace_id: Option<&str>,
        config: &PollConfig,
    ) -> Result<ValidationReport, ApiError> {
        session.begin_upload()?;
        let contract_id = session.contract_id.clone();
        let receipt = match replace_id {
            Some(id) => self.replace(&contract_id, id, collection).await,
            None => self.upload(&contract_id, collection).await,
        };
        let receipt = match receipt {
            Ok(receipt) => receipt,
            Err(e) => {
                session.upload_failed()?;
                return Err(e);
            }
        };

        let status_link = receipt
            .status_link()
            .map(str::to_string)
            .ok_or_else(|| ApiError::MissingResource {
                collection: receipt.feature_collection_id.clone(),
                rel: "status".to_string(),
            })?;
        session.uploaded(receipt)?;

        poll_until_terminal_with(self, &status_link, config, |report| {
            session.record_status(report).map(|_| ())
        })
        .await
    }

    /// Fetch the GeoJSON payload and current status of one collection
    pub async fn fetch_collection(
        &self,
        summary: &FeatureCollectionSummary,
    ) -> Result<(FeatureCollection, ValidationReport), ApiError> {
        let data_link = summary
            .data_link()
            .ok_or_else(|| ApiError::MissingResource {
                collection: summary.id.clone(),
                rel: "data".to_string(),
            })?;
        let status_link = summary
            .status_link()
            .ok_or_else(|| ApiError::MissingResource {
                collection: summary.id.clone(),
                rel: "status".to_string(),
            })?;

        let collection: FeatureCollection = self.get_json(data_link, GEOJSON).await?;
        let report = self.poll_status(&status_link).await?;
        Ok((collection, report))
    }

    /// Save every collection of a contract as `<dir>/<collection id>.geojson`
    ///
    /// Each feature gets the collection's `validationStatus` in its properties.
    pub async fn download(
        &self,
        contract_id: &str,
        dir: &Path,
    ) -> Result<Vec<DownloadedCollection>, ApiError> {
        let started = Instant::now();
        let contract = self.get_contract(contract_id).await?;
        let list = self.list_feature_collections(contract_id).await?;
        let total = list.feature_collections.len();
        info!(
            "{} feature collections on contract {} ({}), saving to {}",
            total,
            contract.name,
            contract_id,
            dir.display()
        );

        std::fs::create_dir_all(dir).map_err(|source| ApiError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut saved = Vec::with_capacity(total);
        for (idx, summary) in list.feature_collections.iter().enumerate() {
            info!(
                "Fetching feature collection {} of {} ({:.1?} so far)",
                idx + 1,
                total,
                started.elapsed()
            );
            let (mut collection, report) = self.fetch_collection(summary).await?;
            if report.validation_status == ValidationStatus::Unknown {
                warn!("Collection {} has an unrecognised validation status", summary.id);
            }

            features::merge_validation_status(&mut collection, report.validation_status);
            let path = features::save_collection(dir, &summary.id, &collection)?;

            saved.push(DownloadedCollection {
                id: summary.id.clone(),
                path,
                feature_count: collection.features.len(),
                status: report.validation_status,
            });
        }

        info!("Download finished in {:.1?}", started.elapsed());
        Ok(saved)
    }
}

#[async_trait]
impl StatusSource for Df10Client {
    type Status = ValidationReport;

    async fn fetch_status(&self, link: &str) -> Result<ValidationReport, ApiError> {
        self.poll_status(link).await
    }
}
