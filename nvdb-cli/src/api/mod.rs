//! HTTP clients for the NVDB catalog and the Datafangst platform
//!
//! All clients share the conventions in [`http`]: one request outstanding at
//! a time, an explicit timeout, identifying headers and typed errors.

pub mod auth;
pub mod catalog;
pub mod datafangst;
pub mod error;
pub mod http;
pub mod models;
pub mod resilience;

pub use auth::{ChainedCredentials, CredentialProvider, StaticCredentials};
pub use catalog::{CatalogClient, CatalogSnapshot, Include};
pub use datafangst::{Df10Client, Df20Client};
pub use error::ApiError;
pub use http::HttpSettings;
pub use models::{CredentialTarget, Credentials, Environment};
pub use resilience::{PollConfig, ResilienceConfig};
