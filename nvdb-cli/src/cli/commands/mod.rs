pub mod catalog;
pub mod df10;
pub mod df20;
pub mod reconcile;

pub use catalog::CatalogCommands;
pub use df10::Df10Commands;
pub use df20::Df20Commands;
pub use reconcile::ReconcileCommands;
