use crate::config::SwaggerConfig;
use crate::schema::{column_schema, parameter_schema, Schema};
use crate::tables::{ResponseShape, Table};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Swagger version emitted in every document.
pub const SWAGGER_VERSION: &str = "2.0";

/// Swagger builder.
///
/// Owns the [`SchemaDocument`] and folds [`Table`]s into it one at a time. The document is
/// written only while the build pass runs; afterwards it is read through [`document`].
///
/// [`document`]: SwaggerBuilder::document
pub struct SwaggerBuilder {
    document: SchemaDocument,
    exclude_columns: BTreeSet<String>,
    url_prefix: String,
}

/// Swagger Info object. Unset values are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Swagger Tag object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub description: String,
}

/// Swagger PathItem object. Only GET and DELETE operations are documented.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

/// Swagger Operation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code
    pub responses: BTreeMap<String, Response>,
}

/// Swagger Parameter object for path and query parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Parameter location (path or query)
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    /// Type and format of the parameter
    #[serde(flatten)]
    pub schema: Schema,
}

/// Swagger Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    /// Absent when the route's response shape is not recognised
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Complete Swagger document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub swagger: String,
    pub info: Info,
    /// Filled in at publication time from the request origin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Tags in order of first appearance
    pub tags: Vec<Tag>,
    pub schemes: Vec<String>,
    #[serde(rename = "basePath")]
    pub base_path: String,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub paths: BTreeMap<String, PathItem>,
    pub definitions: BTreeMap<String, Schema>,
}

impl Default for SchemaDocument {
    fn default() -> Self {
        Self {
            swagger: SWAGGER_VERSION.to_string(),
            info: Info::default(),
            host: None,
            tags: Vec::new(),
            schemes: vec!["https".to_string(), "http".to_string()],
            base_path: "/".to_string(),
            consumes: vec!["application/json".to_string()],
            produces: vec!["application/json".to_string()],
            paths: BTreeMap::new(),
            definitions: BTreeMap::new(),
        }
    }
}

impl SchemaDocument {
    /// Names of the tags collected so far.
    pub fn tag_names(&self) -> BTreeSet<&str> {
        self.tags.iter().map(|tag| tag.name.as_str()).collect()
    }
}

impl SwaggerBuilder {
    /// Creates a builder with an empty document and no info.
    pub fn new() -> Self {
        debug!("Initializing SwaggerBuilder");
        Self {
            document: SchemaDocument::default(),
            exclude_columns: BTreeSet::new(),
            url_prefix: String::new(),
        }
    }

    /// Creates a builder using the info, column exclusions and url prefix of `config`.
    pub fn from_config(config: &SwaggerConfig) -> Self {
        Self::new()
            .with_info(
                config.name.clone(),
                config.version.clone(),
                config.description.clone(),
            )
            .with_exclude_columns(config.exclude_columns.clone())
            .with_url_prefix(&config.url_prefix)
    }

    pub fn with_info(
        mut self,
        title: Option<String>,
        version: Option<String>,
        description: Option<String>,
    ) -> Self {
        self.document.info = Info {
            title,
            version,
            description,
        };
        self
    }

    pub fn with_exclude_columns(mut self, exclude_columns: BTreeSet<String>) -> Self {
        self.exclude_columns = exclude_columns;
        self
    }

    pub fn with_url_prefix(mut self, url_prefix: &str) -> Self {
        self.url_prefix = url_prefix.trim_end_matches('/').to_string();
        self
    }

    /// The document built so far.
    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    /// Adds both the definition and the path of `table`, unless skipped by `config`.
    pub fn create_docs(&mut self, table: &Table, config: &SwaggerConfig) {
        if !config.skip_definitions {
            self.add_definition(table);
        }

        if !config.skip_paths {
            self.add_path(table);
        }
    }

    /// Adds the result type definition of `table`.
    ///
    /// The definition is stored under `table.rtype`, the same name the response schema of
    /// [`add_path`](Self::add_path) refers to. Every column becomes a property, except
    /// excluded column names.
    pub fn add_definition(&mut self, table: &Table) {
        let mut properties = BTreeMap::new();

        for column in &table.columns {
            if self.exclude_columns.contains(&column.name) {
                debug!("Excluding column {} from {}", column.name, table.rtype);
                continue;
            }

            properties.insert(
                column.name.clone(),
                column_schema(column).with_description(&column.desc),
            );
        }

        self.document
            .definitions
            .insert(table.rtype.clone(), Schema::object(properties));
    }

    /// Adds the operation of `table` to its path.
    ///
    /// The path is `{url_prefix}/{name}` followed by one `/{arg}` segment per positional
    /// column. Positional columns become required path parameters and keyword columns
    /// optional query parameters.
    pub fn add_path(&mut self, table: &Table) {
        let path = self.path_for(table);
        let parameters = parameters(table);
        let schema = response_schema(&table.ftype, &Schema::definition_ref(&table.rtype));

        let (status, verb) = match table.method.as_str() {
            "GET" => ("200", "get"),
            "DELETE" => ("204", "delete"),
            other => {
                debug!("Not documenting {} {}", other, path);
                return;
            }
        };

        let mut responses = BTreeMap::new();
        responses.insert(
            status.to_string(),
            Response {
                description: format!("{} result", table.name),
                schema,
            },
        );

        let operation = Operation {
            summary: table
                .desc
                .clone()
                .unwrap_or_else(|| format!("{} {}", verb, table.name)),
            description: table.desc.clone(),
            tags: vec![table.tag.clone()],
            parameters,
            responses,
        };

        debug!("Adding {} {}", table.method, path);
        let path_item = self.document.paths.entry(path).or_default();
        match verb {
            "get" => path_item.get = Some(operation),
            _ => path_item.delete = Some(operation),
        }

        self.add_tag(&table.tag);
    }

    fn add_tag(&mut self, name: &str) {
        if self.document.tag_names().contains(name) {
            return;
        }

        self.document.tags.push(Tag {
            name: name.to_string(),
            description: format!("{} operations", name),
        });
    }

    fn path_for(&self, table: &Table) -> String {
        table
            .columns
            .iter()
            .filter(|column| column.kind.is_positional())
            .fold(
                format!("{}/{}", self.url_prefix, table.name),
                |path, column| format!("{}/{{{}}}", path, column.name),
            )
    }
}

impl Default for SwaggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parameters(table: &Table) -> Vec<Parameter> {
    table
        .columns
        .iter()
        .filter_map(|column| {
            let (location, required) = if column.kind.is_positional() {
                ("path", true)
            } else if column.kind.is_keyword() {
                ("query", false)
            } else {
                return None;
            };

            Some(Parameter {
                name: column.name.clone(),
                location: location.to_string(),
                required,
                description: column.desc.clone(),
                schema: parameter_schema(column),
            })
        })
        .collect()
}

/// Response schema for a response shape wrapping `reference`.
fn response_schema(ftype: &ResponseShape, reference: &Schema) -> Option<Schema> {
    let status = || ("status".to_string(), Schema::string());
    let enveloped = |objects: Schema| Schema::object([("objects".to_string(), objects), status()]);

    let schema = match ftype {
        ResponseShape::Dict => {
            let results = Schema::object([("<id>".to_string(), reference.clone())]);
            enveloped(Schema::object([
                ("message".to_string(), Schema::string()),
                ("pages".to_string(), Schema::string()),
                ("results".to_string(), results),
            ]))
        }
        ResponseShape::List => enveloped(Schema::array(reference.clone())),
        ResponseShape::Wrapped => {
            enveloped(Schema::object([("results".to_string(), reference.clone())]))
        }
        ResponseShape::Simple => Schema::object([("objects".to_string(), Schema::string())]),
        ResponseShape::Other => reference.clone(),
        ResponseShape::Unknown(tag) => {
            debug!("Unknown response shape: {}", tag);
            return None;
        }
    };

    Some(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Field, FieldKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn search_table() -> Table {
        let mut table = Table::new("search", "GET", "Amazon", ResponseShape::Dict);
        table.desc = Some("Perform an eBay site search".to_string());
        table.columns = vec![Field::new("q", "The search term(s)", "str", FieldKind::KwType)];
        table
    }

    fn ship_table() -> Table {
        let mut table = Table::new("ship", "GET", "Amazon", ResponseShape::Wrapped);
        table.columns = vec![
            Field::new("item_id", "ID of item to ship", "str", FieldKind::Type),
            Field::new("quantity", "quantity to ship", "int", FieldKind::KwType),
            Field::new("utc_created", "creation time", "datetime", FieldKind::KwType),
            Field::new("rvalue", "shipping cost", "float", FieldKind::Result),
        ];
        table
    }

    fn response_json(builder: &SwaggerBuilder, path: &str) -> serde_json::Value {
        let doc = serde_json::to_value(builder.document()).unwrap();
        doc["paths"][path]["get"]["responses"]["200"]["schema"].clone()
    }

    #[test]
    fn test_new_document_is_empty() {
        let builder = SwaggerBuilder::new();
        let doc = serde_json::to_value(builder.document()).unwrap();

        assert_eq!(doc["swagger"], "2.0");
        assert_eq!(doc["info"], json!({}));
        assert_eq!(doc["basePath"], "/");
        assert_eq!(doc["schemes"], json!(["https", "http"]));
        assert!(doc.get("host").is_none());
        assert_eq!(doc["paths"], json!({}));
    }

    #[test]
    fn test_dict_response_shape() {
        let mut builder = SwaggerBuilder::new();
        builder.add_path(&search_table());

        assert_eq!(
            response_json(&builder, "/search"),
            json!({
                "type": "object",
                "properties": {
                    "objects": {
                        "type": "object",
                        "properties": {
                            "message": {"type": "string"},
                            "pages": {"type": "string"},
                            "results": {
                                "type": "object",
                                "properties": {
                                    "<id>": {"$ref": "#/definitions/search_result"}
                                }
                            }
                        }
                    },
                    "status": {"type": "string"}
                }
            })
        );
    }

    #[test]
    fn test_list_and_simple_response_shapes() {
        let mut builder = SwaggerBuilder::new();
        builder.add_path(&Table::new("category", "GET", "Amazon", ResponseShape::List));
        builder.add_path(&Table::new("lorem", "GET", "Other", ResponseShape::Simple));

        let list = response_json(&builder, "/category");
        assert_eq!(list["properties"]["objects"]["type"], "array");
        assert_eq!(
            list["properties"]["objects"]["items"]["$ref"],
            "#/definitions/category_result"
        );

        let simple = response_json(&builder, "/lorem");
        assert_eq!(
            simple,
            json!({"type": "object", "properties": {"objects": {"type": "string"}}})
        );
    }

    #[test]
    fn test_wrapped_and_other_response_shapes() {
        let mut builder = SwaggerBuilder::new();
        builder.add_path(&Table::new("item", "GET", "Amazon", ResponseShape::Wrapped));
        builder.add_path(&Table::new("raw", "GET", "Amazon", ResponseShape::Other));

        assert_eq!(
            response_json(&builder, "/item")["properties"]["objects"],
            json!({"type": "object", "properties": {"results": {"$ref": "#/definitions/item_result"}}})
        );
        assert_eq!(
            response_json(&builder, "/raw"),
            json!({"$ref": "#/definitions/raw_result"})
        );
    }

    #[test]
    fn test_unknown_shape_keeps_operation_without_schema() {
        let mut builder = SwaggerBuilder::new();
        let mut table = ship_table();
        table.ftype = ResponseShape::Unknown("paged".to_string());
        builder.add_path(&table);

        let doc = serde_json::to_value(builder.document()).unwrap();
        let get = &doc["paths"]["/ship/{item_id}"]["get"];

        assert_eq!(get["responses"]["200"], json!({"description": "ship result"}));
        assert_eq!(get["parameters"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_path_and_parameters() {
        let mut builder = SwaggerBuilder::new().with_url_prefix("/api/v1/");
        builder.add_path(&ship_table());

        let doc = serde_json::to_value(builder.document()).unwrap();
        let get = &doc["paths"]["/api/v1/ship/{item_id}"]["get"];

        assert_eq!(get["summary"], "get ship");
        assert_eq!(get["tags"], json!(["Amazon"]));
        assert_eq!(
            get["parameters"][0],
            json!({
                "name": "item_id",
                "in": "path",
                "required": true,
                "description": "ID of item to ship",
                "type": "string"
            })
        );
        assert_eq!(get["parameters"][1]["in"], "query");
        assert_eq!(get["parameters"][1]["required"], false);
        assert_eq!(get["parameters"][1]["type"], "integer");
    }

    #[test]
    fn test_non_primitive_parameters_are_valid() {
        let mut builder = SwaggerBuilder::new();
        let mut table = Table::new("memo", "GET", "Amazon", ResponseShape::Simple);
        table.columns = vec![
            Field::new("opts", "options", "dict", FieldKind::KwType),
            Field::new("tags", "tags", "list", FieldKind::KwType),
        ];
        builder.create_docs(&table, &SwaggerConfig::default());

        let doc = serde_json::to_value(builder.document()).unwrap();
        let parameters = &doc["paths"]["/memo"]["get"]["parameters"];

        assert_eq!(
            parameters[0],
            json!({"name": "opts", "in": "query", "required": false, "description": "options", "type": "string"})
        );
        assert_eq!(parameters[1]["type"], "array");
        assert_eq!(parameters[1]["items"], json!({"type": "string"}));
        assert_eq!(
            doc["definitions"]["memo_result"]["properties"]["opts"],
            json!({"type": "object", "properties": {}, "description": "options"})
        );
    }

    #[test]
    fn test_delete_uses_204() {
        let mut builder = SwaggerBuilder::new();
        let mut table = Table::new("cached", "DELETE", "Other", ResponseShape::Simple);
        table.desc = Some("Reset all caches".to_string());
        builder.add_path(&table);

        let doc = serde_json::to_value(builder.document()).unwrap();
        let delete = &doc["paths"]["/cached"]["delete"];

        assert_eq!(delete["summary"], "Reset all caches");
        assert!(delete["responses"]["204"].is_object());
        assert!(doc["paths"]["/cached"].get("get").is_none());
    }

    #[test]
    fn test_get_and_delete_share_path() {
        let mut builder = SwaggerBuilder::new();
        builder.add_path(&Table::new("memo", "GET", "Amazon", ResponseShape::Simple));
        builder.add_path(&Table::new("memo", "DELETE", "Amazon", ResponseShape::Simple));

        let item = &builder.document().paths["/memo"];
        assert!(item.get.is_some());
        assert!(item.delete.is_some());
    }

    #[test]
    fn test_other_methods_are_ignored() {
        let mut builder = SwaggerBuilder::new();
        builder.add_path(&Table::new("memo", "POST", "Amazon", ResponseShape::Simple));

        assert!(builder.document().paths.is_empty());
        assert!(builder.document().tags.is_empty());
    }

    #[test]
    fn test_tags_are_collected_once_in_order() {
        let mut builder = SwaggerBuilder::new();
        builder.add_path(&search_table());
        builder.add_path(&Table::new("lorem", "GET", "Other", ResponseShape::Simple));
        builder.add_path(&ship_table());

        assert_eq!(
            builder.document().tags,
            vec![
                Tag {
                    name: "Amazon".to_string(),
                    description: "Amazon operations".to_string()
                },
                Tag {
                    name: "Other".to_string(),
                    description: "Other operations".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_definition_excludes_columns_and_sorts() {
        let exclude = ["utc_created".to_string()].into_iter().collect();
        let mut builder = SwaggerBuilder::new().with_exclude_columns(exclude);
        builder.add_definition(&ship_table());

        let doc = serde_json::to_value(builder.document()).unwrap();
        let definition = &doc["definitions"]["ship_result"];
        let names: Vec<_> = definition["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();

        assert_eq!(definition["type"], "object");
        assert_eq!(names, vec!["item_id", "quantity", "rvalue"]);
        assert_eq!(
            definition["properties"]["rvalue"],
            json!({"type": "number", "format": "float", "description": "shipping cost"})
        );
    }

    #[test]
    fn test_create_docs_honours_skip_flags() {
        let config = SwaggerConfig {
            skip_paths: true,
            ..SwaggerConfig::default()
        };
        let mut builder = SwaggerBuilder::from_config(&config);
        builder.create_docs(&search_table(), &config);

        assert!(builder.document().paths.is_empty());
        assert!(builder.document().definitions.contains_key("search_result"));
    }

    #[test]
    fn test_from_config_sets_info() {
        let config = SwaggerConfig {
            name: Some("ebay-search".to_string()),
            version: Some("0.4.0".to_string()),
            ..SwaggerConfig::default()
        };
        let builder = SwaggerBuilder::from_config(&config);
        let info = serde_json::to_value(&builder.document().info).unwrap();

        assert_eq!(info, json!({"title": "ebay-search", "version": "0.4.0"}));
    }
}
