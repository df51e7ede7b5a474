//! Route table building.
//!
//! A [`Table`] is the complete documentation of one (route, HTTP method) pair: the
//! extracted [`Field`]s plus the routing metadata needed to synthesize the path,
//! parameters, response schema and definition of the operation.

use crate::config::SwaggerConfig;
use crate::docblock::parse_docblock;
use crate::fields::{gen_fields, Field};
use crate::manifest::{rule_arguments, RouteDescriptor};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Methods never documented.
const EXCLUDED_METHODS: &[&str] = &["OPTIONS", "HEAD"];

/// Shape of a route's JSON response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResponseShape {
    /// `{objects: {results: {<id>: T}, pages, message}, status}`
    Dict,
    /// `{objects: [T], status}`
    List,
    /// `{objects: {results: T}, status}`
    Wrapped,
    /// `{objects: string}`
    Simple,
    /// A bare `T`
    Other,
    /// An unrecognised tag; the operation gets no response schema
    Unknown(String),
}

impl ResponseShape {
    pub fn as_str(&self) -> &str {
        match self {
            ResponseShape::Dict => "dict",
            ResponseShape::List => "list",
            ResponseShape::Wrapped => "wrapped",
            ResponseShape::Simple => "simple",
            ResponseShape::Other => "other",
            ResponseShape::Unknown(tag) => tag,
        }
    }
}

impl From<&str> for ResponseShape {
    fn from(s: &str) -> Self {
        match s {
            "dict" => ResponseShape::Dict,
            "list" => ResponseShape::List,
            "wrapped" => ResponseShape::Wrapped,
            "simple" => ResponseShape::Simple,
            "other" => ResponseShape::Other,
            unknown => ResponseShape::Unknown(unknown.to_string()),
        }
    }
}

impl From<String> for ResponseShape {
    fn from(s: String) -> Self {
        ResponseShape::from(s.as_str())
    }
}

impl From<ResponseShape> for String {
    fn from(shape: ResponseShape) -> Self {
        shape.as_str().to_string()
    }
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Documentation of one (route, HTTP method) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Extracted fields, in source order
    pub columns: Vec<Field>,
    /// Route name
    pub name: String,
    /// Upper-case HTTP method
    pub method: String,
    /// First paragraph of the documentation
    pub desc: Option<String>,
    /// Group tag
    pub tag: String,
    /// Name of the result type definition, `{name}_result`
    pub rtype: String,
    pub ftype: ResponseShape,
}

impl Table {
    /// Creates a table with no columns for `name`, deriving `rtype` from it.
    pub fn new(name: &str, method: &str, tag: &str, ftype: ResponseShape) -> Self {
        Self {
            columns: Vec::new(),
            name: name.to_string(),
            method: method.to_uppercase(),
            desc: None,
            tag: tag.to_string(),
            rtype: format!("{}_result", name),
            ftype,
        }
    }
}

/// Builds [`Table`]s from route descriptors.
pub struct TableBuilder<'a> {
    config: &'a SwaggerConfig,
}

impl<'a> TableBuilder<'a> {
    pub fn new(config: &'a SwaggerConfig) -> Self {
        Self { config }
    }

    /// Builds the tables of every route, in registration order.
    pub fn build(&self, routes: &[RouteDescriptor]) -> Vec<Table> {
        routes.iter().flat_map(|route| self.tables_for(route)).collect()
    }

    /// Builds one table per documented (rule, method) pair of `route`.
    ///
    /// Excluded routes, alias rules, `OPTIONS`/`HEAD` and methods without documentation
    /// produce nothing.
    pub fn tables_for(&self, route: &RouteDescriptor) -> Vec<Table> {
        if self.config.exclude_routes.contains(&route.endpoint) {
            debug!("Skipping excluded route: {}", route.endpoint);
            return Vec::new();
        }

        let name = route.name();
        let ftype = route
            .ftype
            .clone()
            .unwrap_or_else(|| self.config.response_shape(name));
        let tag = self.config.tag_for(name);
        let mut tables = Vec::new();

        for rule in &route.rules {
            if let Some(marker) = &self.config.exclude_rule_marker {
                if rule.contains(marker.as_str()) {
                    continue;
                }
            }

            let arguments = rule_arguments(rule);

            for method in documented_methods(&route.methods) {
                let Some(source) = route.doc_for(&method).filter(|doc| !doc.trim().is_empty())
                else {
                    debug!("No documentation for {} {}", method, route.endpoint);
                    continue;
                };

                let tree = parse_docblock(source);
                if tree.is_empty() {
                    debug!("Unparsable documentation for {} {}", method, route.endpoint);
                    continue;
                }

                let mut table = Table::new(name, &method, tag, ftype.clone());
                table.columns = gen_fields(&tree, Some(&arguments)).collect();
                table.desc = tree.first_paragraph().map(str::to_string);

                debug!(
                    "Built table for {} {} with {} columns",
                    table.method,
                    rule,
                    table.columns.len()
                );
                tables.push(table);
            }
        }

        tables
    }
}

/// Upper-cased, de-duplicated methods minus the excluded ones, in declaration order.
fn documented_methods(methods: &[String]) -> Vec<String> {
    let mut documented: Vec<String> = Vec::new();

    for method in methods.iter().map(|m| m.to_uppercase()) {
        if !EXCLUDED_METHODS.contains(&method.as_str()) && !documented.contains(&method) {
            documented.push(method);
        }
    }

    documented
}
