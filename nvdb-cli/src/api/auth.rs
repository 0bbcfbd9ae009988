//! Credential resolution
//!
//! Clients never prompt on their own. The caller picks a [`CredentialProvider`]
//! (environment variables, an interactive prompt, fixed values or a chain of
//! those), resolves credentials once per run and hands them to the client.

use is_terminal::IsTerminal;
use log::debug;

use super::error::ApiError;
use super::models::{CredentialTarget, Credentials};

pub const DEFAULT_USERNAME_VAR: &str = "NVDB_USERNAME";
pub const DEFAULT_PASSWORD_VAR: &str = "NVDB_PASSWORD";

/// Capability to produce credentials for a service
pub trait CredentialProvider: Send + Sync {
    fn resolve_credentials(&self, target: &CredentialTarget) -> Result<Credentials, ApiError>;
}

/// Reads credentials from environment variables (a `.env` file works too)
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    pub username_var: String,
    pub password_var: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self {
            username_var: DEFAULT_USERNAME_VAR.to_string(),
            password_var: DEFAULT_PASSWORD_VAR.to_string(),
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn resolve_credentials(&self, target: &CredentialTarget) -> Result<Credentials, ApiError> {
        // An explicit --user beats the environment
        let username = target
            .username_hint
            .clone()
            .or_else(|| std::env::var(&self.username_var).ok().filter(|u| !u.is_empty()))
            .ok_or_else(|| ApiError::Credentials(format!("{} is not set", self.username_var)))?;

        let password = std::env::var(&self.password_var)
            .ok()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::Credentials(format!("{} is not set", self.password_var)))?;

        debug!("Using credentials for {} from environment", username);
        Ok(Credentials::new(username, password))
    }
}

/// Asks the operator on the terminal
#[derive(Debug, Clone, Default)]
pub struct PromptCredentials;

impl CredentialProvider for PromptCredentials {
    fn resolve_credentials(&self, target: &CredentialTarget) -> Result<Credentials, ApiError> {
        if !std::io::stdin().is_terminal() {
            return Err(ApiError::Credentials(
                "stdin is not a terminal, cannot prompt for credentials".to_string(),
            ));
        }

        let mut input = dialoguer::Input::<String>::new().with_prompt("Datafangst or NVDB username");
        if let Some(user) = &target.username_hint {
            input = input.with_initial_text(user.as_str());
        }
        let username = input
            .interact_text()
            .map_err(|e| ApiError::Credentials(e.to_string()))?;

        let password =
            rpassword::prompt_password(format!("{}'s password for {}: ", username, target.host))
                .map_err(|e| ApiError::Credentials(e.to_string()))?;

        Ok(Credentials::new(username, password))
    }
}

/// Fixed credentials, for scripting and tests
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credentials);

impl CredentialProvider for StaticCredentials {
    fn resolve_credentials(&self, _target: &CredentialTarget) -> Result<Credentials, ApiError> {
        Ok(self.0.clone())
    }
}

/// Tries each provider in order, the first success wins
#[derive(Default)]
pub struct ChainedCredentials {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainedCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Environment variables first, then the terminal prompt
    pub fn env_then_prompt() -> Self {
        Self::new()
            .with(EnvCredentials::default())
            .with(PromptCredentials)
    }
}

impl CredentialProvider for ChainedCredentials {
    fn resolve_credentials(&self, target: &CredentialTarget) -> Result<Credentials, ApiError> {
        let mut reasons = Vec::new();
        for provider in &self.providers {
            match provider.resolve_credentials(target) {
                Ok(credentials) => return Ok(credentials),
                Err(e) => {
                    debug!("Credential provider declined: {}", e);
                    reasons.push(match e {
                        ApiError::Credentials(reason) => reason,
                        other => other.to_string(),
                    });
                }
            }
        }
        Err(ApiError::Credentials(if reasons.is_empty() {
            "no credential provider configured".to_string()
        } else {
            reasons.join("; ")
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Environment;

    fn target() -> CredentialTarget {
        CredentialTarget {
            host: "datafangst.vegvesen.no".to_string(),
            environment: Environment::Prod,
            username_hint: Some("jajens".to_string()),
        }
    }

    struct Refuses;

    impl CredentialProvider for Refuses {
        fn resolve_credentials(&self, _target: &CredentialTarget) -> Result<Credentials, ApiError> {
            Err(ApiError::Credentials("nope".to_string()))
        }
    }

    #[test]
    fn test_chain_falls_through_to_next_provider() {
        let chain = ChainedCredentials::new()
            .with(Refuses)
            .with(StaticCredentials(Credentials::new("jajens", "pw")));

        let creds = chain.resolve_credentials(&target()).unwrap();
        assert_eq!(creds.username, "jajens");
        assert_eq!(creds.password, "pw");
    }

    #[test]
    fn test_chain_reports_every_refusal() {
        let chain = ChainedCredentials::new().with(Refuses).with(Refuses);
        let err = chain.resolve_credentials(&target()).unwrap_err();
        assert_eq!(err.to_string(), "could not resolve credentials: nope; nope");
    }

    #[test]
    fn test_env_credentials_missing_password() {
        let provider = EnvCredentials {
            username_var: "NVDB_CLI_TEST_UNSET_USER".to_string(),
            password_var: "NVDB_CLI_TEST_UNSET_PASSWORD".to_string(),
        };
        let err = provider.resolve_credentials(&target()).unwrap_err();
        assert!(err.to_string().contains("NVDB_CLI_TEST_UNSET_PASSWORD"));
    }

    #[test]
    fn test_explicit_user_beats_environment_user() {
        // Variable names unique to this test, so parallel tests never see them
        unsafe {
            std::env::set_var("NVDB_CLI_TEST_PRECEDENCE_USER", "alice");
            std::env::set_var("NVDB_CLI_TEST_PRECEDENCE_PASSWORD", "pw");
        }
        let provider = EnvCredentials {
            username_var: "NVDB_CLI_TEST_PRECEDENCE_USER".to_string(),
            password_var: "NVDB_CLI_TEST_PRECEDENCE_PASSWORD".to_string(),
        };

        let mut target = target();
        target.username_hint = Some("bob".to_string());
        assert_eq!(provider.resolve_credentials(&target).unwrap().username, "bob");

        target.username_hint = None;
        assert_eq!(provider.resolve_credentials(&target).unwrap().username, "alice");
    }

    #[test]
    fn test_chain_keeps_other_error_kinds_readable() {
        struct Unsupported;
        impl CredentialProvider for Unsupported {
            fn resolve_credentials(&self, _target: &CredentialTarget) -> Result<Credentials, ApiError> {
                Err(ApiError::UnsupportedEnvironment {
                    service: "Datafangst 2.0",
                    environment: "UTV".to_string(),
                })
            }
        }

        let chain = ChainedCredentials::new().with(Unsupported).with(Refuses);
        let err = chain.resolve_credentials(&target()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not resolve credentials: Datafangst 2.0 is not configured for environment UTV; nope"
        );
    }
}
