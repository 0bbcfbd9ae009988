pub mod handler;

use clap::{Args, Subcommand};
use std::path::PathBuf;

pub use handler::handle_reconcile_command;

#[derive(Subcommand, Debug)]
pub enum ReconcileCommands {
    /// Match the obsolete table against observed ids through the id offsets
    Offsets(OffsetsArgs),
    /// Retire observed ids the current catalog no longer has
    Diff {
        /// Observed relation type ids (CSV or one id per line)
        #[arg(long)]
        observed: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct OffsetsArgs {
    /// Obsolete relation table (xlsx, xls, ods or csv)
    #[arg(long)]
    pub obsolete: PathBuf,

    /// Observed relation type ids (CSV or one id per line)
    #[arg(long)]
    pub observed: PathBuf,

    /// Sheet holding the obsolete table, defaults to the configured one
    #[arg(long)]
    pub sheet: Option<String>,

    /// Only use rows whose dakat_versjon contains this
    #[arg(long)]
    pub catalog_version: Option<String>,

    /// Id offset, repeat for several; replaces the configured offsets
    #[arg(long = "offset")]
    pub offsets: Vec<i64>,

    /// Look each candidate up in the current catalog of --env
    #[arg(long)]
    pub check_catalog: bool,

    /// Write the candidates to this CSV file
    #[arg(long)]
    pub report: Option<PathBuf>,
}
