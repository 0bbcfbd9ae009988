//! Configuration file handling
//!
//! Settings live in `~/.config/nvdb-cli/config.toml`. Every key has a
//! default, so a partial file (or none at all) is fine.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{ApiError, Environment, HttpSettings, PollConfig, ResilienceConfig};
use crate::services::reconcile::DEFAULT_OFFSETS;
use crate::services::relations::RELATION_MARKER;

/// Environment variable naming an alternative config file
pub const CONFIG_ENV_VAR: &str = "NVDB_CLI_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub http: HttpConfig,
    pub poll: PollSettings,
    pub reconcile: ReconcileConfig,
    pub datafangst: DatafangstConfig,
}

/// Pick the URL configured for `env`; blank counts as unset
fn for_env<'a>(
    env: Environment,
    prod: &'a Option<String>,
    test: &'a Option<String>,
    utv: &'a Option<String>,
) -> Option<&'a str> {
    match env {
        Environment::Prod => prod.as_deref(),
        Environment::Test => test.as_deref(),
        Environment::Utv => utv.as_deref(),
    }
    .filter(|url| !url.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub prod: Option<String>,
    pub test: Option<String>,
    pub utv: Option<String>,
    /// Sent as `X-Client`
    pub client_name: String,
    /// Sent as `X-Kontaktperson`
    pub contact: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            prod: Some("https://nvdbapiles-v3.atlas.vegvesen.no/".to_string()),
            test: Some("https://nvdbapiles-v3.test.atlas.vegvesen.no/".to_string()),
            utv: Some("https://nvdbapiles-v3.utv.atlas.vegvesen.no/".to_string()),
            client_name: HttpSettings::default().client_name,
            contact: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            max_attempts: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Substring marking a property type as a relation
    pub marker: String,
    pub offsets: Vec<i64>,
    pub relation_table: String,
    pub relation_column: String,
    /// Sheet holding the obsolete table in spreadsheet files
    pub obsolete_sheet: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            marker: RELATION_MARKER.to_string(),
            offsets: DEFAULT_OFFSETS.to_vec(),
            relation_table: "feature_association2".to_string(),
            relation_column: "type_id".to_string(),
            obsolete_sheet: "Ark2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatafangstConfig {
    pub v1: Df10Config,
    pub v2: Df20Config,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Df10Config {
    pub prod: Option<String>,
    pub test: Option<String>,
    pub utv: Option<String>,
}

impl Default for Df10Config {
    fn default() -> Self {
        Self {
            prod: Some("https://datafangst.vegvesen.no/api/v1/".to_string()),
            test: None,
            utv: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Df20Config {
    pub prod_api: Option<String>,
    pub test_api: Option<String>,
    pub utv_api: Option<String>,
    pub prod_auth: Option<String>,
    pub test_auth: Option<String>,
    pub utv_auth: Option<String>,
    /// `brukertype` sent on login
    pub user_type: String,
    pub destination: String,
}

impl Default for Df20Config {
    fn default() -> Self {
        Self {
            prod_api: None,
            test_api: Some("https://datafangst-api-gateway.test.atlas.vegvesen.no/api/v2/".to_string()),
            utv_api: None,
            prod_auth: Some("https://nvdbauth.atlas.vegvesen.no/api/v1/auth/autentiser".to_string()),
            test_auth: Some("https://nvdbauth.test.atlas.vegvesen.no/api/v1/auth/autentiser".to_string()),
            utv_auth: None,
            user_type: "ANSATT".to_string(),
            destination: "NVDB".to_string(),
        }
    }
}

impl Config {
    /// `~/.config/nvdb-cli/config.toml`, when a config dir exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nvdb-cli").join("config.toml"))
    }

    /// Load from `explicit`, then `NVDB_CLI_CONFIG`, then the default path
    ///
    /// Only the default path may be missing; a file named explicitly must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        match named {
            Some(path) => Self::from_file(&path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn resilience(&self) -> ResilienceConfig {
        ResilienceConfig::builder()
            .request_timeout(Duration::from_secs(self.http.timeout_secs))
            .poll_interval(Duration::from_secs(self.poll.interval_secs))
            .max_poll_attempts(self.poll.max_attempts)
            .build()
    }

    pub fn poll_config(&self) -> PollConfig {
        self.resilience().poll
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            timeout: self.resilience().request_timeout,
            client_name: self.catalog.client_name.clone(),
            contact: self.catalog.contact.clone(),
        }
    }

    pub fn catalog_url(&self, env: Environment) -> Result<&str, ApiError> {
        let c = &self.catalog;
        for_env(env, &c.prod, &c.test, &c.utv).ok_or_else(|| unsupported("catalog", env))
    }

    pub fn df10_url(&self, env: Environment) -> Result<&str, ApiError> {
        let v1 = &self.datafangst.v1;
        for_env(env, &v1.prod, &v1.test, &v1.utv).ok_or_else(|| unsupported("Datafangst 1.0", env))
    }

    /// API and auth URL for Datafangst 2.0
    pub fn df20_urls(&self, env: Environment) -> Result<(&str, &str), ApiError> {
        let v2 = &self.datafangst.v2;
        let api = for_env(env, &v2.prod_api, &v2.test_api, &v2.utv_api)
            .ok_or_else(|| unsupported("Datafangst 2.0", env))?;
        let auth = for_env(env, &v2.prod_auth, &v2.test_auth, &v2.utv_auth)
            .ok_or_else(|| unsupported("Datafangst 2.0 login", env))?;
        Ok((api, auth))
    }
}

fn unsupported(service: &'static str, env: Environment) -> ApiError {
    ApiError::UnsupportedEnvironment {
        service,
        environment: env.label().to_string(),
    }
}
