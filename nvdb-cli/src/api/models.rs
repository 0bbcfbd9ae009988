//! Shared models for the API clients

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment target shared by the catalog and Datafangst services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Prod,
    /// Also known as ATM
    Test,
    /// Also known as STM
    Utv,
}

impl Environment {
    /// Upper-case label, used in file names and messages
    pub fn label(&self) -> &'static str {
        match self {
            Environment::Prod => "PROD",
            Environment::Test => "TEST",
            Environment::Utv => "UTV",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PROD" | "PRODUKSJON" => Ok(Environment::Prod),
            "TEST" | "ATM" => Ok(Environment::Test),
            "UTV" | "STM" => Ok(Environment::Utv),
            other => Err(format!(
                "unknown environment '{}', expected PROD, TEST or UTV (or ATM, STM)",
                other
            )),
        }
    }
}

/// Username and password for one service
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keeps passwords out of debug logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// What credentials are being requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialTarget {
    /// Host name shown to the operator (e.g. "datafangst.vegvesen.no")
    pub host: String,
    pub environment: Environment,
    /// Username suggested by the caller (e.g. from --user)
    pub username_hint: Option<String>,
}

impl CredentialTarget {
    /// Build a target from a service URL, keeping only the host part
    pub fn for_url(url: &str, environment: Environment, username_hint: Option<String>) -> Self {
        let host = reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url.to_string());

        Self {
            host,
            environment,
            username_hint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_aliases() {
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Prod));
        assert_eq!("Produksjon".parse::<Environment>(), Ok(Environment::Prod));
        assert_eq!("ATM".parse::<Environment>(), Ok(Environment::Test));
        assert_eq!("stm".parse::<Environment>(), Ok(Environment::Utv));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("jajens", "hemmelig");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("jajens"));
        assert!(!printed.contains("hemmelig"));
    }

    #[test]
    fn test_credential_target_host() {
        let target = CredentialTarget::for_url(
            "https://datafangst.vegvesen.no/api/v1/contract/",
            Environment::Prod,
            None,
        );
        assert_eq!(target.host, "datafangst.vegvesen.no");
    }
}
