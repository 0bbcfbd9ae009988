//! Reconciliation command handler

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use super::{OffsetsArgs, ReconcileCommands};
use crate::cli::CommandContext;
use crate::cli::commands::catalog::fetch_relations;
use crate::services::maintenance::render_delete_statement;
use crate::services::reconcile::{
    CandidateReport, ReconcileContext, ReconcileOptions, RetirementCandidate, direct_diff,
    reconcile_offsets,
};
use crate::services::relations::catalog_identifiers;
use crate::sources::{read_obsolete_table, read_observed_ids};

pub async fn handle_reconcile_command(
    command: ReconcileCommands,
    context: &CommandContext,
) -> Result<()> {
    match command {
        ReconcileCommands::Offsets(args) => offsets(context, args).await.map(|_| ()),
        ReconcileCommands::Diff { observed } => diff(context, &observed).await.map(|_| ()),
    }
}

/// Returns the ids proposed for retirement
async fn offsets(context: &CommandContext, args: OffsetsArgs) -> Result<Vec<i64>> {
    let settings = &context.config.reconcile;
    let sheet = args.sheet.as_deref().unwrap_or(&settings.obsolete_sheet);

    let table = read_obsolete_table(&args.obsolete, sheet)?;
    let observed = read_observed_ids(&args.observed)?;
    println!(
        "{} obsolete rows ({} skipped), {} observed ids",
        table.rows.len(),
        table.skipped,
        observed.len()
    );

    let current = if args.check_catalog {
        let (snapshot, extraction) = fetch_relations(context).await?;
        println!(
            "Checking against catalog {} ({})",
            snapshot.version.bright_green(),
            context.env
        );
        Some(catalog_identifiers(&extraction.relations))
    } else {
        None
    };

    let source = args
        .obsolete
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.obsolete.display().to_string());

    let options = ReconcileOptions {
        offsets: if args.offsets.is_empty() {
            settings.offsets.clone()
        } else {
            args.offsets
        },
        version_filter: args.catalog_version,
    };
    let results = reconcile_offsets(
        &ReconcileContext {
            obsolete: &table.rows,
            source: &source,
            observed: &observed,
            current: current.as_ref(),
        },
        &options,
    );

    println!(
        "{} of {} rows considered, {} retirement candidates (offsets {:?})",
        results.rows_considered,
        table.rows.len(),
        results.candidates.len().to_string().bold(),
        options.offsets
    );
    println!();
    print_candidates(&results.candidates);

    if let Some(path) = &args.report {
        write_report(path, &results.candidates)?;
        println!();
        println!("Report written to {}", path.display().to_string().cyan());
    }

    let ids = results.type_ids();
    print_statement(context, &ids)?;
    Ok(ids)
}

async fn diff(context: &CommandContext, observed_path: &Path) -> Result<Vec<i64>> {
    let observed = read_observed_ids(observed_path)?;
    let (snapshot, extraction) = fetch_relations(context).await?;
    let current = catalog_identifiers(&extraction.relations);

    let retired = direct_diff(&observed, &current);
    println!(
        "{} observed ids, {} relation ids in catalog {} ({}), {} no longer in the catalog",
        observed.len(),
        current.len(),
        snapshot.version.bright_green(),
        context.env,
        retired.len().to_string().bold()
    );
    for id in &retired {
        println!("  {}", id);
    }

    print_statement(context, &retired)?;
    Ok(retired)
}

fn print_candidates(candidates: &[RetirementCandidate]) {
    if candidates.is_empty() {
        return;
    }
    println!(
        "{:>6} {:<24} {:>6} {:<24} {:>6} {:<8} {:<6} {:<36} {:>7} {:>8} {}",
        "VT_Id".bold(),
        "VT_navn".bold(),
        "VT_Id".bold(),
        "VT_navn".bold(),
        "TS_Id".bold(),
        "versjon".bold(),
        "gyldig".bold(),
        "SHT_Navn".bold(),
        "offset".bold(),
        "type_id".bold(),
        "i katalog".bold()
    );
    for c in candidates {
        let row = &c.row;
        let in_catalog = match c.in_current_catalog {
            Some(true) => "ja".yellow(),
            Some(false) => "nei".normal(),
            None => "-".dimmed(),
        };
        println!(
            "{:>6} {:<24} {:>6} {:<24} {:>6} {:<8} {:<6} {:<36} {:>7} {:>8} {}",
            id_or_dash(row.parent_type_id),
            row.parent_name,
            id_or_dash(row.child_type_id),
            row.child_name,
            row.legacy_id,
            row.catalog_version,
            row.validity,
            row.relation_name,
            c.offset,
            c.type_id,
            in_catalog
        );
    }
}

fn id_or_dash(id: Option<i64>) -> String {
    id.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string())
}

fn write_report(path: &Path, candidates: &[RetirementCandidate]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    for candidate in candidates {
        writer
            .serialize(CandidateReport::from(candidate))
            .context("Failed to write report row")?;
    }
    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}

/// Print the delete statement for manual review, never run it
fn print_statement(context: &CommandContext, ids: &[i64]) -> Result<()> {
    let settings = &context.config.reconcile;
    let statement = render_delete_statement(&settings.relation_table, &settings.relation_column, ids)
        .context("Invalid relation table settings")?;

    println!();
    match statement {
        Some(sql) => {
            println!(
                "{}",
                "Review and run by hand, then COMMIT or ROLLBACK:".yellow().bold()
            );
            println!("{}", sql);
        }
        None => println!("{}", "Nothing to retire.".green()),
    }
    Ok(())
}
