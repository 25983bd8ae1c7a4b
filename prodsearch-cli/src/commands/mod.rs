//! Subcommand implementations

mod serve;

pub use serve::{run_serve, ServeArgs};
