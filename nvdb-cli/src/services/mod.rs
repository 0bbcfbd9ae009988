// Business logic services layer
//
// Pure logic shared by the command handlers. The only I/O here is reading
// and writing local feature collection files.

pub mod features;
pub mod maintenance;
pub mod reconcile;
pub mod relations;
