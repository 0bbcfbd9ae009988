pub mod handler;

use clap::Subcommand;
use std::path::PathBuf;

pub use handler::handle_df10_command;

#[derive(Subcommand, Debug)]
pub enum Df10Commands {
    /// List contracts, optionally filtered by name
    Contracts {
        /// Case-insensitive part of the contract name
        #[arg(long, short)]
        search: Option<String>,
    },
    /// List the feature collections of a contract
    Collections {
        #[arg(long, short)]
        contract: String,
    },
    /// Upload a GeoJSON feature collection to a contract
    Upload {
        #[arg(long, short)]
        contract: String,
        /// GeoJSON file with a FeatureCollection
        #[arg(long, short)]
        file: PathBuf,
        /// Replace this existing feature collection instead of adding one
        #[arg(long)]
        replace: Option<String>,
        /// Poll until validation is finished
        #[arg(long)]
        wait: bool,
    },
    /// Show the validation status behind a status link
    Status {
        #[arg(long)]
        link: String,
        /// Poll until validation is finished
        #[arg(long)]
        wait: bool,
    },
    /// Save every feature collection of a contract with its validation status
    Download {
        #[arg(long, short)]
        contract: String,
        /// Target directory, created if missing
        #[arg(long, short, default_value = ".")]
        dir: PathBuf,
    },
}
