//! Datafangst 2.0 command handler

use anyhow::{Context, Result, bail};
use colored::*;
use std::fs;

use super::Df20Commands;
use crate::api::datafangst::split_file_names;
use crate::api::Df20Client;
use crate::cli::CommandContext;

pub async fn handle_df20_command(command: Df20Commands, context: &CommandContext) -> Result<()> {
    let (api_url, auth_url) = context.config.df20_urls(context.env)?;
    let v2 = &context.config.datafangst.v2;
    let mut client = Df20Client::new(
        api_url,
        auth_url,
        v2.user_type.as_str(),
        &context.config.http_settings(),
    )?;

    let credentials = context.credentials_for(auth_url)?;
    client
        .login(&credentials)
        .await
        .with_context(|| format!("Login as {} failed", credentials.username))?;

    match command {
        Df20Commands::Upload {
            contract,
            file,
            name,
            destination,
        } => {
            let geojson = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            serde_json::from_str::<serde_json::Value>(&geojson)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;

            let file_name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("Cannot derive a file name, use --name")?,
            };
            let destination = destination.unwrap_or_else(|| v2.destination.clone());

            client
                .upload_file(&contract, &file_name, &geojson, &destination)
                .await
                .with_context(|| format!("Failed to upload {} to {}", file_name, contract))?;
            println!(
                "Uploaded {} to contract {} (destination {})",
                file_name.cyan(),
                contract.cyan(),
                destination
            );
        }
        Df20Commands::Approve { contract, files } => {
            let names = split_file_names(&files);
            if names.is_empty() {
                bail!("No file names given");
            }
            client
                .approve_files(&contract, &names)
                .await
                .with_context(|| format!("Failed to approve files on {}", contract))?;
            println!(
                "Approved {} on contract {}",
                names.join(", ").green(),
                contract.cyan()
            );
        }
    }
    Ok(())
}
