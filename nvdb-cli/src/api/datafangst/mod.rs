//! Datafangst field-collection platform, generations 1.0 and 2.0

pub mod models;
pub mod session;
pub mod v1;
pub mod v2;

pub use models::{ValidationReport, ValidationStatus};
pub use session::UploadSession;
pub use v1::Df10Client;
pub use v2::{Df20Client, split_file_names};
