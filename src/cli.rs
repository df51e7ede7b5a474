use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Swaggerify - Generate a Swagger document from documented route handlers
#[derive(Parser, Debug)]
#[command(name = "swaggerify")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Route manifest file, or a directory of manifests
    #[arg(value_name = "MANIFEST_PATH")]
    pub manifest_path: PathBuf,

    /// Configuration file (yaml or json)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// URL root the document is published under; its host becomes the document host
    #[arg(long = "url-root", default_value = "http://localhost:5000/")]
    pub url_root: String,

    /// API title (overrides the configuration)
    #[arg(long = "title")]
    pub title: Option<String>,

    /// API version (overrides the configuration)
    #[arg(long = "api-version")]
    pub api_version: Option<String>,

    /// API description (overrides the configuration)
    #[arg(long = "description")]
    pub description: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.exists() {
        anyhow::bail!(
            "Manifest path does not exist: {}",
            args.manifest_path.display()
        );
    }

    if let Some(ref config) = args.config_path {
        if !config.is_file() {
            anyhow::bail!("Configuration file does not exist: {}", config.display());
        }
    }

    info!("Manifest path: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::build_swagger;
    use crate::config::SwaggerConfig;
    use crate::manifest::ManifestLoader;
    use crate::publisher::SchemaPublisher;
    use crate::scanner::ManifestScanner;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};

    // Step 1: Load configuration
    let mut config = match &args.config_path {
        Some(path) => SwaggerConfig::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => SwaggerConfig::default(),
    };
    if args.title.is_some() {
        config.name = args.title.clone();
    }
    if args.api_version.is_some() {
        config.version = args.api_version.clone();
    }
    if args.description.is_some() {
        config.description = args.description.clone();
    }

    // Step 2: Find manifests
    info!("Scanning for route manifests...");
    let scan_result = ManifestScanner::new(args.manifest_path.clone()).scan()?;
    for warning in &scan_result.warnings {
        log::warn!("{}", warning);
    }
    if scan_result.manifest_files.is_empty() {
        anyhow::bail!("No route manifests found in {}", args.manifest_path.display());
    }
    info!("Found {} manifests", scan_result.manifest_files.len());

    // Step 3: Load route descriptors
    let (routes, errors) = ManifestLoader::load_files(&scan_result.manifest_files);
    if routes.is_empty() && !errors.is_empty() {
        anyhow::bail!("No manifest could be loaded");
    }
    info!("Loaded {} routes", routes.len());

    // Step 4: Build the document
    info!("Building Swagger document...");
    let builder = build_swagger(&routes, &config);

    // Step 5: Publish with the host of the URL root
    let document = SchemaPublisher::new(builder.document())
        .publish(&args.url_root)
        .with_context(|| format!("Invalid URL root: {}", args.url_root))?;

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    // Step 6: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Successfully wrote Swagger document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Summary:");
    info!("  - Manifests loaded: {}", scan_result.manifest_files.len() - errors.len());
    info!("  - Routes: {}", routes.len());
    info!("  - Paths documented: {}", document.paths.len());
    info!("  - Definitions: {}", document.definitions.len());

    Ok(())
}
