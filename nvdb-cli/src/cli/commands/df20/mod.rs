pub mod handler;

use clap::Subcommand;
use std::path::PathBuf;

pub use handler::handle_df20_command;

#[derive(Subcommand, Debug)]
pub enum Df20Commands {
    /// Upload a GeoJSON file to a contract
    Upload {
        #[arg(long, short)]
        contract: String,
        #[arg(long, short)]
        file: PathBuf,
        /// File name on the contract, defaults to the local file name
        #[arg(long)]
        name: Option<String>,
        /// Target system, defaults to the configured one
        #[arg(long)]
        destination: Option<String>,
    },
    /// Approve uploaded files
    Approve {
        #[arg(long, short)]
        contract: String,
        /// Comma-separated file names
        #[arg(long)]
        files: String,
    },
}
