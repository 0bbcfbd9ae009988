pub mod handler;

use clap::Subcommand;
use std::path::PathBuf;

pub use handler::{fetch_relations, handle_catalog_command};

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Save the complete catalog as indented JSON
    Dump {
        /// Directory for the dump file
        #[arg(long, short, default_value = ".")]
        output_dir: PathBuf,
    },
    /// List relation types and catalog entries that could not be resolved
    Relations {
        /// Also write the relation types to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}
