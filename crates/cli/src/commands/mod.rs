//! CLI subcommand implementations.

pub mod invoice;
pub mod links;
