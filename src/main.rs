//! Swaggerify - Command-line tool for generating Swagger documents.
//!
//! Reads route manifests (route rules, methods and handler documentation), compiles the
//! documentation into a Swagger 2.0 document and writes it as JSON or YAML.
//!
//! # Usage
//!
//! ```bash
//! swaggerify [OPTIONS] <MANIFEST_PATH>
//! ```
//!
//! # Examples
//!
//! Generate JSON documentation:
//! ```bash
//! swaggerify ./routes -o swagger.json
//! ```
//!
//! Generate YAML with a configuration file and a public host:
//! ```bash
//! swaggerify ./routes -c swagger.yaml -f yaml --url-root https://api.example.com/
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use swaggerify::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Swaggerify starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
