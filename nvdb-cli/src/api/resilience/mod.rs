//! Timeouts and bounded polling
//!
//! Requests are strictly sequential, so there is no rate or concurrency
//! limiting here: only the per-request timeout and the explicit poll loop
//! used while a feature collection is validated.

pub mod config;
pub mod poll;

pub use config::{PollConfig, ResilienceConfig};
pub use poll::{PollStatus, StatusSource, poll_until_terminal, poll_until_terminal_with};
