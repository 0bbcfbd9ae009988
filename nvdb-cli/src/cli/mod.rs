//! Command-line interface

pub mod commands;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;

use crate::api::{
    ChainedCredentials, CredentialProvider, CredentialTarget, Credentials, Environment,
    StaticCredentials,
};
use crate::config::Config;
use commands::{CatalogCommands, Df10Commands, Df20Commands, ReconcileCommands};

#[derive(Parser, Debug)]
#[command(name = "nvdb-cli", version, about = "NVDB data catalog and Datafangst tooling")]
pub struct Cli {
    /// Deployment target: prod, test (atm) or utv (stm)
    #[arg(long, short, global = true, default_value_t = Environment::Prod)]
    pub env: Environment,

    /// Config file, defaults to ~/.config/nvdb-cli/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Username for Datafangst, skips the username prompt
    #[arg(long, short, global = true)]
    pub user: Option<String>,

    /// Read the password from the first line of stdin, for scripts
    #[arg(long, global = true, requires = "user")]
    pub password_stdin: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read and dump the data catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Find relation types to retire from the operational store
    Reconcile {
        #[command(subcommand)]
        command: ReconcileCommands,
    },
    /// Datafangst 1.0 contracts and feature collections
    Df10 {
        #[command(subcommand)]
        command: Df10Commands,
    },
    /// Datafangst 2.0 file upload and approval
    Df20 {
        #[command(subcommand)]
        command: Df20Commands,
    },
}

/// Everything a command handler needs besides its own arguments
pub struct CommandContext {
    pub config: Config,
    pub env: Environment,
    pub user: Option<String>,
    credentials: Box<dyn CredentialProvider>,
}

impl CommandContext {
    pub fn new(config: Config, env: Environment, user: Option<String>) -> Self {
        Self {
            config,
            env,
            user,
            credentials: Box::new(ChainedCredentials::env_then_prompt()),
        }
    }

    pub fn with_credentials(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.credentials = Box::new(provider);
        self
    }

    /// Resolve credentials for the service behind `url`
    pub fn credentials_for(&self, url: &str) -> Result<Credentials> {
        let target = CredentialTarget::for_url(url, self.env, self.user.clone());
        self.credentials
            .resolve_credentials(&target)
            .with_context(|| format!("No credentials for {}", target.host))
    }
}

/// Parse arguments, load config and dispatch to the command handlers
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let mut context = CommandContext::new(config, cli.env, cli.user.clone());
    if let (true, Some(user)) = (cli.password_stdin, cli.user) {
        let password = read_password_line(std::io::stdin().lock())?;
        context = context.with_credentials(StaticCredentials(Credentials::new(user, password)));
    }

    match cli.command {
        Commands::Catalog { command } => {
            commands::catalog::handle_catalog_command(command, &context).await
        }
        Commands::Reconcile { command } => {
            commands::reconcile::handle_reconcile_command(command, &context).await
        }
        Commands::Df10 { command } => commands::df10::handle_df10_command(command, &context).await,
        Commands::Df20 { command } => commands::df20::handle_df20_command(command, &context).await,
    }
}

fn read_password_line(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read the password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        anyhow::bail!("--password-stdin got an empty password");
    }
    Ok(password.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Cursor;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_and_aliases() {
        let cli = Cli::try_parse_from(["nvdb-cli", "catalog", "dump", "--env", "atm", "-vv"]).unwrap();
        assert_eq!(cli.env, Environment::Test);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Catalog {
                command: CatalogCommands::Dump { .. }
            }
        ));
    }

    #[test]
    fn test_unknown_environment_is_rejected() {
        let err = Cli::try_parse_from(["nvdb-cli", "--env", "staging", "catalog", "dump"]).unwrap_err();
        assert!(err.to_string().contains("unknown environment 'STAGING'"));
    }

    #[test]
    fn test_context_resolves_credentials_by_host() {
        let context = CommandContext::new(Config::default(), Environment::Prod, None)
            .with_credentials(StaticCredentials(Credentials::new("jajens", "pw")));
        let creds = context
            .credentials_for("https://datafangst.vegvesen.no/api/v1/")
            .unwrap();
        assert_eq!(creds.username, "jajens");
    }

    #[test]
    fn test_password_stdin_needs_user() {
        let args = ["df20", "approve", "--contract", "k1", "--files", "a.geojson"];
        let without_user = ["nvdb-cli", "--password-stdin"].iter().chain(&args);
        assert!(Cli::try_parse_from(without_user).is_err());

        let with_user = ["nvdb-cli", "--password-stdin", "-u", "jajens"].iter().chain(&args);
        let cli = Cli::try_parse_from(with_user).unwrap();
        assert!(cli.password_stdin);
        assert_eq!(cli.user.as_deref(), Some("jajens"));
    }

    #[test]
    fn test_password_line_keeps_inner_whitespace() {
        let password = read_password_line(Cursor::new("s3cret pass\r\nignored\n")).unwrap();
        assert_eq!(password, "s3cret pass");
    }

    #[test]
    fn test_empty_password_line_is_rejected() {
        let err = read_password_line(Cursor::new("\n")).unwrap_err();
        assert!(err.to_string().contains("empty password"));
    }
}
