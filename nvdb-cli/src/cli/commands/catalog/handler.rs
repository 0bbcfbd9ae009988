//! Catalog command handler

use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use std::fs;
use std::path::Path;

use super::CatalogCommands;
use crate::api::{CatalogClient, CatalogSnapshot, Include};
use crate::cli::CommandContext;
use crate::services::relations::{Extraction, RelationType, extract_relations};

pub async fn handle_catalog_command(command: CatalogCommands, context: &CommandContext) -> Result<()> {
    match command {
        CatalogCommands::Dump { output_dir } => dump(context, &output_dir).await,
        CatalogCommands::Relations { csv } => relations(context, csv.as_deref()).await,
    }
}

fn catalog_client(context: &CommandContext) -> Result<CatalogClient> {
    let url = context.config.catalog_url(context.env)?;
    Ok(CatalogClient::new(url, context.env, &context.config.http_settings())?)
}

/// Fetch the catalog and extract its relation types
pub async fn fetch_relations(context: &CommandContext) -> Result<(CatalogSnapshot, Extraction)> {
    let client = catalog_client(context)?;
    let snapshot = client
        .snapshot(Include::PropertyTypes)
        .await
        .with_context(|| format!("Failed to fetch the {} catalog", context.env))?;
    let extraction = extract_relations(&snapshot.object_types, &context.config.reconcile.marker);
    Ok((snapshot, extraction))
}

async fn dump(context: &CommandContext, output_dir: &Path) -> Result<()> {
    let client = catalog_client(context)?;
    let snapshot = client
        .snapshot(Include::All)
        .await
        .with_context(|| format!("Failed to fetch the {} catalog", context.env))?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;
    let path = output_dir.join(snapshot.dump_file_name(Local::now().date_naive()));

    let json = serde_json::to_string_pretty(&snapshot.raw).context("Failed to encode catalog")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "Catalog {} ({}, {} object types) saved to {}",
        snapshot.version.bright_green(),
        context.env,
        snapshot.object_types.len(),
        path.display().to_string().cyan()
    );
    Ok(())
}

async fn relations(context: &CommandContext, csv_path: Option<&Path>) -> Result<()> {
    let (snapshot, extraction) = fetch_relations(context).await?;

    println!(
        "Catalog version {} ({})",
        snapshot.version.bright_green(),
        context.env
    );
    println!();
    print_relations(&extraction.relations);

    if !extraction.anomalies.is_empty() {
        println!();
        println!(
            "{}",
            format!(
                "{} of {} relation properties without a child object type:",
                extraction.anomalies.len(),
                extraction.marker_count()
            )
            .yellow()
            .bold()
        );
        for anomaly in &extraction.anomalies {
            println!(
                "  {} {}: {}",
                anomaly.object_type_id,
                anomaly.object_type_name,
                anomaly.property.to_string().dimmed()
            );
        }
    }

    if let Some(path) = csv_path {
        write_relations_csv(path, &extraction.relations)?;
        println!();
        println!("Relations written to {}", path.display().to_string().cyan());
    }
    Ok(())
}

fn print_relations(relations: &[RelationType]) {
    println!(
        "{:>8}  {:<32} {:>8}  {:<40} {:>8}  {}",
        "mor".bold(),
        "morObjTypeNavn".bold(),
        "type_id".bold(),
        "relasjonNavn".bold(),
        "datter".bold(),
        "datatype".bold()
    );
    for r in relations {
        println!(
            "{:>8}  {:<32} {:>8}  {:<40} {:>8}  {}",
            r.parent_type_id,
            r.parent_type_name,
            r.type_id,
            r.relation_name,
            r.child_type_id,
            r.data_type.as_deref().unwrap_or("-")
        );
    }
    println!();
    println!("{} relation types", relations.len().to_string().bold());
}

pub(crate) fn write_relations_csv(path: &Path, relations: &[RelationType]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    for relation in relations {
        writer
            .serialize(relation)
            .context("Failed to write relation row")?;
    }
    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}
