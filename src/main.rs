//! Stylometer - AI-text detection and rewriting CLI
//!
//! A fast, local-first writing analysis tool that walks a document
//! through six numbered analysis steps to flag AI-like uniformity
//! and suggest rewrites.

// Allow dead code for public API methods exposed for library users and future features
#![allow(dead_code)]

pub mod ai;
mod cli;
pub mod config;
pub mod document;
pub mod models;
mod reporters;
pub mod scoring;
pub mod session;
pub mod stats;
mod steps;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run(cli)
}
