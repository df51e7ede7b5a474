//! Swaggerify - Swagger documents from route handler documentation.
//!
//! This library compiles the structured documentation attached to REST route handlers
//! into a Swagger 2.0 document: paths, parameters, response schemas, definitions and
//! tags, without anyone writing the description by hand.
//!
//! # Architecture
//!
//! The build pass runs once, synchronously, over every registered route:
//!
//! 1. [`docblock`] - Parses documentation text (Google sections or flat field lists)
//!    into a structured-text tree
//! 2. [`fields`] - Extracts normalized [`fields::Field`] records from the tree
//! 3. [`tables`] - Combines fields with routing metadata into one [`tables::Table`] per
//!    route and method
//! 4. [`swagger_builder`] - Folds tables into the [`swagger_builder::SchemaDocument`]
//! 5. [`publisher`] - Serves the finished document, filling in the request host
//!
//! Route descriptors come from [`manifest`] files found by the [`scanner`], and
//! [`config`] holds the options shared by the stages.
//!
//! # Example Usage
//!
//! ```
//! use swaggerify::{build_swagger, config::SwaggerConfig, manifest::RouteDescriptor};
//!
//! let routes = vec![RouteDescriptor::new(
//!     "blueprint.item",
//!     "/item/<item_id>/",
//!     "Get an item's details\n\nArgs:\n    item_id (str): item ID\n",
//! )];
//! let builder = build_swagger(&routes, &SwaggerConfig::default());
//!
//! assert!(builder.document().paths.contains_key("/item/{item_id}"));
//! assert!(builder.document().definitions.contains_key("item_result"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod config;
pub mod docblock;
pub mod error;
pub mod fields;
pub mod manifest;
pub mod publisher;
pub mod scanner;
pub mod schema;
pub mod serializer;
pub mod swagger_builder;
pub mod tables;

use config::SwaggerConfig;
use log::debug;
use manifest::RouteDescriptor;
use swagger_builder::SwaggerBuilder;
use tables::TableBuilder;

/// Runs the build pass over `routes`, in registration order.
///
/// A route whose documentation yields no table is skipped; it never stops the pass.
pub fn build_swagger(routes: &[RouteDescriptor], config: &SwaggerConfig) -> SwaggerBuilder {
    let mut builder = SwaggerBuilder::from_config(config);
    let tables = TableBuilder::new(config).build(routes);
    debug!("Built {} tables from {} routes", tables.len(), routes.len());

    for table in &tables {
        builder.create_docs(table, config);
    }

    builder
}
