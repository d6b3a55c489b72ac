//! CLI subcommand implementations.

pub mod load;
pub mod phases;
pub mod report;
pub mod timeline;
pub mod util;
