use crate::error::{Error, Result};
use crate::tables::ResponseShape;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static RULE_ARGUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:[^<>:]+:)?([^<>:]+)>").unwrap());

/// A registered route and the documentation of its handler(s).
///
/// Route descriptors are plain data supplied by whatever routing layer registers the
/// handlers; nothing here depends on a particular web framework.
///
/// # Example
///
/// ```yaml
/// routes:
///   - endpoint: blueprint.ship
///     rules: ["/ship/<item_id>/", "/api/ship/<item_id>/"]
///     doc: |
///       Calculate an item's shipping cost
///
///       Args:
///           item_id (str): ID of item to ship
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Endpoint identifier, optionally prefixed by its blueprint (`blueprint.search`)
    pub endpoint: String,
    /// URL rules in `<arg>` or `<converter:arg>` syntax
    #[serde(default)]
    pub rules: Vec<String>,
    /// HTTP methods accepted by the route
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
    /// Documentation of a single handler serving every method
    #[serde(default)]
    pub doc: Option<String>,
    /// Documentation of per-method handlers, keyed by method name
    #[serde(default)]
    pub method_docs: BTreeMap<String, String>,
    /// Response shape, overriding the configured table
    #[serde(default)]
    pub ftype: Option<ResponseShape>,
}

/// Prefix of endpoints registered on the application blueprint.
const BLUEPRINT_PREFIX: &str = "blueprint.";

fn default_methods() -> Vec<String> {
    vec!["GET".to_string()]
}

/// Accepted manifest layouts: a `routes:` mapping or a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestFile {
    Wrapped { routes: Vec<RouteDescriptor> },
    Bare(Vec<RouteDescriptor>),
}

impl RouteDescriptor {
    pub fn new(endpoint: &str, rule: &str, doc: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            rules: vec![rule.to_string()],
            methods: default_methods(),
            doc: Some(doc.to_string()),
            method_docs: BTreeMap::new(),
            ftype: None,
        }
    }

    /// Name under which the route is documented: the endpoint without its `blueprint.`
    /// prefix. Other dotted endpoints keep their full name.
    pub fn name(&self) -> &str {
        self.endpoint
            .strip_prefix(BLUEPRINT_PREFIX)
            .unwrap_or(&self.endpoint)
    }

    /// True when the route is backed by per-method handlers.
    pub fn is_class_based(&self) -> bool {
        !self.method_docs.is_empty()
    }

    /// Documentation for `method`.
    ///
    /// Per-method handlers win; a route without them falls back to its single handler.
    pub fn doc_for(&self, method: &str) -> Option<&str> {
        if self.is_class_based() {
            self.method_docs
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(method))
                .map(|(_, doc)| doc.as_str())
        } else {
            self.doc.as_deref()
        }
    }
}

/// Path parameter names of a URL rule, e.g. `{"cid"}` for `/category/<int:cid>/`.
pub fn rule_arguments(rule: &str) -> BTreeSet<String> {
    RULE_ARGUMENT
        .captures_iter(rule)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// Loads route descriptors from manifest files.
pub struct ManifestLoader;

impl ManifestLoader {
    /// Loads one manifest file, YAML or JSON depending on its extension.
    pub fn load_file(path: &Path) -> Result<Vec<RouteDescriptor>> {
        debug!("Loading manifest: {}", path.display());
        let content = fs::read_to_string(path)?;
        let invalid = |message: String| Error::Manifest {
            file: path.to_path_buf(),
            message,
        };

        let manifest: ManifestFile = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?,
            _ => serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?,
        };

        let routes = match manifest {
            ManifestFile::Wrapped { routes } | ManifestFile::Bare(routes) => routes,
        };
        debug!("Loaded {} routes from {}", routes.len(), path.display());
        Ok(routes)
    }

    /// Loads every manifest, in order, skipping files that fail to load.
    ///
    /// Failures are logged and returned alongside the routes so a single bad manifest
    /// never hides the routes of the others.
    pub fn load_files(paths: &[PathBuf]) -> (Vec<RouteDescriptor>, Vec<Error>) {
        let mut routes = Vec::new();
        let mut errors = Vec::new();

        for path in paths {
            match Self::load_file(path) {
                Ok(loaded) => routes.extend(loaded),
                Err(e) => {
                    warn!("Failed to load {}: {}", path.display(), e);
                    errors.push(e);
                }
            }
        }

        (routes, errors)
    }
}
