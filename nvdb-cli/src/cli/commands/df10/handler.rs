//! Datafangst 1.0 command handler

use anyhow::{Context, Result};
use colored::*;

use super::Df10Commands;
use crate::api::datafangst::models::{Contract, Severity};
use crate::api::datafangst::{UploadSession, ValidationReport, ValidationStatus};
use crate::api::Df10Client;
use crate::cli::CommandContext;
use crate::services::features::load_collection;

/// Contract search lists at most this many matches
pub const MAX_SEARCH_RESULTS: usize = 10;

pub async fn handle_df10_command(command: Df10Commands, context: &CommandContext) -> Result<()> {
    let client = df10_client(context)?;

    match command {
        Df10Commands::Contracts { search } => {
            let list = client
                .list_contracts()
                .await
                .context("Failed to list contracts")?;
            match search {
                Some(needle) => {
                    let matches = list.search(&needle);
                    println!(
                        "{} of {} contracts match '{}'",
                        matches.len().to_string().bold(),
                        list.contracts.len(),
                        needle
                    );
                    print_contracts(matches.into_iter().take(MAX_SEARCH_RESULTS));
                }
                None => {
                    println!("{} contracts", list.contracts.len().to_string().bold());
                    print_contracts(list.contracts.iter());
                }
            }
        }
        Df10Commands::Collections { contract } => {
            let list = client
                .list_feature_collections(&contract)
                .await
                .with_context(|| format!("Failed to list feature collections on {}", contract))?;
            println!(
                "{} feature collections on {}",
                list.feature_collections.len().to_string().bold(),
                contract.cyan()
            );
            for summary in &list.feature_collections {
                println!(
                    "  {}  {}",
                    summary.id,
                    summary.status_link().unwrap_or_default().dimmed()
                );
            }
        }
        Df10Commands::Upload {
            contract,
            file,
            replace,
            wait,
        } => {
            let collection = load_collection(&file)?;
            println!(
                "Uploading {} features from {} to {}",
                collection.features.len(),
                file.display(),
                contract.cyan()
            );

            if wait {
                let mut session = UploadSession::new(contract.clone());
                let report = client
                    .submit_and_wait(
                        &mut session,
                        &collection,
                        replace.as_deref(),
                        &context.config.poll_config(),
                    )
                    .await
                    .with_context(|| format!("Upload to {} did not complete", contract))?;
                println!(
                    "Feature collection {} is {}",
                    session.collection_id().unwrap_or_default().cyan(),
                    session.state()
                );
                print_report(&report);
            } else {
                let receipt = match replace.as_deref() {
                    Some(id) => client.replace(&contract, id, &collection).await,
                    None => client.upload(&contract, &collection).await,
                }
                .with_context(|| format!("Failed to upload to {}", contract))?;
                println!(
                    "Accepted for validation as {}",
                    receipt.feature_collection_id.cyan()
                );
                if let Some(link) = receipt.status_link() {
                    println!("Status: {}", link);
                }
            }
        }
        Df10Commands::Status { link, wait } => {
            let report = if wait {
                client
                    .wait_for_validation(&link, &context.config.poll_config())
                    .await
            } else {
                client.poll_status(&link).await
            }
            .with_context(|| format!("Failed to read status {}", link))?;
            print_report(&report);
        }
        Df10Commands::Download { contract, dir } => {
            let saved = client
                .download(&contract, &dir)
                .await
                .with_context(|| format!("Failed to download feature collections of {}", contract))?;
            for collection in &saved {
                println!(
                    "  {} {} features, {} -> {}",
                    collection.id,
                    collection.feature_count,
                    status_colored(collection.status),
                    collection.path.display()
                );
            }
            println!(
                "{} feature collections saved to {}",
                saved.len().to_string().bold(),
                dir.display().to_string().cyan()
            );
        }
    }
    Ok(())
}

fn df10_client(context: &CommandContext) -> Result<Df10Client> {
    let url = context.config.df10_url(context.env)?;
    let credentials = context.credentials_for(url)?;
    Ok(Df10Client::new(url, credentials, &context.config.http_settings())?)
}

fn print_contracts<'a>(contracts: impl Iterator<Item = &'a Contract>) {
    for contract in contracts {
        println!("  {}  {}", contract.id.dimmed(), contract.name);
    }
}

fn status_colored(status: ValidationStatus) -> ColoredString {
    match status {
        ValidationStatus::Accepted => status.as_str().green(),
        ValidationStatus::Rejected => status.as_str().red(),
        _ => status.as_str().yellow(),
    }
}

fn print_report(report: &ValidationReport) {
    println!(
        "Validation status {} ({} errors, {} warnings)",
        status_colored(report.validation_status).bold(),
        report.count(Severity::Error),
        report.count(Severity::Warning)
    );
    for issue in &report.validation_issues {
        let severity = match issue.severity {
            Severity::Error => "ERROR".red(),
            Severity::Warning => "WARNING".yellow(),
            Severity::Notabene => "NOTABENE".normal(),
            Severity::Other => "OTHER".dimmed(),
        };
        let location = issue
            .location
            .feature_id
            .as_deref()
            .map(|id| format!(" [{}]", id))
            .unwrap_or_default();
        println!("  {} {}{}: {}", severity, issue.code, location, issue.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Credentials, Environment, StaticCredentials};
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context_for(server: &MockServer) -> CommandContext {
        let mut config = Config::default();
        config.datafangst.v1.test = Some(format!("{}/api/v1/", server.uri()));
        CommandContext::new(config, Environment::Test, Some("jajens".to_string()))
            .with_credentials(StaticCredentials(Credentials::new("jajens", "pw")))
    }

    #[tokio::test]
    async fn test_contract_search_uses_basic_auth() {
        let server = MockServer::start().await;
        let contracts: Vec<_> = (0..15)
            .map(|i| json!({ "id": format!("c{}", i), "name": format!("Tunnel E6 {}", i) }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/api/v1/contract/"))
            .and(header("authorization", "Basic amFqZW5zOnB3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "contracts": contracts })))
            .expect(1)
            .mount(&server)
            .await;

        let command = Df10Commands::Contracts {
            search: Some("tunnel".to_string()),
        };
        handle_df10_command(command, &context_for(&server)).await.unwrap();
    }

    #[tokio::test]
    async fn test_unconfigured_environment_fails_before_any_request() {
        let context = CommandContext::new(Config::default(), Environment::Utv, None)
            .with_credentials(StaticCredentials(Credentials::new("jajens", "pw")));
        let err = handle_df10_command(Df10Commands::Contracts { search: None }, &context)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("UTV"));
    }
}
