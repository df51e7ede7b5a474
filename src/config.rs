//! Generator configuration.
//!
//! Every key is optional; missing keys fall back to the defaults below, so an empty
//! file (or no file at all) yields a usable configuration.

use crate::error::{Error, Result};
use crate::tables::ResponseShape;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Options consumed by the table builder and the schema synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwaggerConfig {
    /// Application name, published as `info.title`
    pub name: Option<String>,
    /// Application version, published as `info.version`
    pub version: Option<String>,
    /// Application description, published as `info.description`
    pub description: Option<String>,
    /// Prefix prepended to every generated path
    pub url_prefix: String,
    /// Column names never added to a definition
    pub exclude_columns: BTreeSet<String>,
    /// Endpoints never documented
    pub exclude_routes: BTreeSet<String>,
    /// Rules containing this text are aliases of another rule and are not documented
    pub exclude_rule_marker: Option<String>,
    /// Response shape per route name; unlisted routes are `simple`
    pub response_shapes: BTreeMap<String, ResponseShape>,
    /// Routes grouped under `other_tag` instead of `default_tag`
    pub other_routes: BTreeSet<String>,
    pub other_tag: String,
    pub default_tag: String,
    /// Do not emit definitions
    pub skip_definitions: bool,
    /// Do not emit paths
    pub skip_paths: bool,
}

fn string_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|item| item.to_string()).collect()
}

impl Default for SwaggerConfig {
    fn default() -> Self {
        let response_shapes = [
            ("search", ResponseShape::Dict),
            ("ship", ResponseShape::Wrapped),
            ("item", ResponseShape::Wrapped),
            ("category", ResponseShape::List),
            ("sub_category", ResponseShape::List),
        ]
        .into_iter()
        .map(|(name, shape)| (name.to_string(), shape))
        .collect();

        Self {
            name: None,
            version: None,
            description: None,
            url_prefix: String::new(),
            exclude_columns: string_set(&["utc_created", "utc_updated"]),
            exclude_routes: string_set(&["static", "swagger.swagger_json", "home"]),
            exclude_rule_marker: Some("api".to_string()),
            response_shapes,
            other_routes: string_set(&["cached", "lorem"]),
            other_tag: "Other".to_string(),
            default_tag: "Amazon".to_string(),
            skip_definitions: false,
            skip_paths: false,
        }
    }
}

impl SwaggerConfig {
    /// Loads a configuration file, YAML or JSON depending on its extension.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "unsupported configuration format: {}",
                    path.display()
                )))
            }
        };

        Ok(config)
    }

    /// Response shape of the named route.
    pub fn response_shape(&self, route_name: &str) -> ResponseShape {
        self.response_shapes
            .get(route_name)
            .cloned()
            .unwrap_or(ResponseShape::Simple)
    }

    /// Group tag of the named route.
    pub fn tag_for(&self, route_name: &str) -> &str {
        if self.other_routes.contains(route_name) {
            &self.other_tag
        } else {
            &self.default_tag
        }
    }
}
