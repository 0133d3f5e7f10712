//! CLI module for clinidoc
//!
//! Provides the `extract` subcommand: run the ingestion pipeline over a
//! document on disk and print the normalized text.

pub mod extract;

use clap::{Parser, Subcommand};

/// clinidoc - clinical document ingestion and normalization pipeline
#[derive(Parser)]
#[command(name = "clinidoc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract normalized plain text from a clinical document
    Extract(extract::ExtractArgs),
}
