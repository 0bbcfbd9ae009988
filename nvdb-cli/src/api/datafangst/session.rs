//! Lifecycle of one uploaded feature collection
//!
//! `Created -> Uploading -> Uploaded -> (Pending | Processing)* -> Accepted | Rejected`

use std::fmt;

use super::models::{UploadReceipt, ValidationReport, ValidationStatus};
use crate::api::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionState {
    Created,
    Uploading,
    Uploaded,
    Pending,
    Processing,
    Accepted,
    Rejected,
}

impl CollectionState {
    pub fn label(&self) -> &'static str {
        match self {
            CollectionState::Created => "CREATED",
            CollectionState::Uploading => "UPLOADING",
            CollectionState::Uploaded => "UPLOADED",
            CollectionState::Pending => "PENDING",
            CollectionState::Processing => "PROCESSING",
            CollectionState::Accepted => "ACCEPTED",
            CollectionState::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CollectionState::Accepted | CollectionState::Rejected)
    }

    fn awaits_validation(&self) -> bool {
        matches!(
            self,
            CollectionState::Uploaded | CollectionState::Pending | CollectionState::Processing
        )
    }
}

impl fmt::Display for CollectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tracks one feature collection from upload to final validation status
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub contract_id: String,
    state: CollectionState,
    receipt: Option<UploadReceipt>,
}

impl UploadSession {
    pub fn new(contract_id: impl Into<String>) -> Self {
        Self {
            contract_id: contract_id.into(),
            state: CollectionState::Created,
            receipt: None,
        }
    }

    pub fn state(&self) -> CollectionState {
        self.state
    }

    pub fn collection_id(&self) -> Option<&str> {
        self.receipt
            .as_ref()
            .map(|r| r.feature_collection_id.as_str())
    }

    pub fn status_link(&self) -> Option<&str> {
        self.receipt.as_ref().and_then(|r| r.status_link())
    }

    pub fn begin_upload(&mut self) -> Result<(), ApiError> {
        self.transition(CollectionState::Created, CollectionState::Uploading)
    }

    /// The service queued the collection for validation
    pub fn uploaded(&mut self, receipt: UploadReceipt) -> Result<(), ApiError> {
        self.transition(CollectionState::Uploading, CollectionState::Uploaded)?;
        self.receipt = Some(receipt);
        Ok(())
    }

    /// The upload request failed; the session may be retried
    pub fn upload_failed(&mut self) -> Result<(), ApiError> {
        self.transition(CollectionState::Uploading, CollectionState::Created)
    }

    /// Apply a freshly polled status
    ///
    /// An unrecognised status keeps the current state.
    pub fn record_status(&mut self, report: &ValidationReport) -> Result<CollectionState, ApiError> {
        let next = match report.validation_status {
            ValidationStatus::Pending => CollectionState::Pending,
            ValidationStatus::Processing => CollectionState::Processing,
            ValidationStatus::Accepted => CollectionState::Accepted,
            ValidationStatus::Rejected => CollectionState::Rejected,
            ValidationStatus::Unknown => self.state,
        };

        if !self.state.awaits_validation() {
            return Err(invalid(self.state, next));
        }

        self.state = next;
        Ok(next)
    }

    fn transition(&mut self, from: CollectionState, to: CollectionState) -> Result<(), ApiError> {
        if self.state != from {
            return Err(invalid(self.state, to));
        }
        self.state = to;
        Ok(())
    }
}

fn invalid(from: CollectionState, to: CollectionState) -> ApiError {
    ApiError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}
