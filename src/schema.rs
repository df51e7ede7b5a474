use crate::fields::Field;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Swagger schema object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format qualifier for primitive types (e.g. "date", "float")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Reference to a definition
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Schema {
    /// A primitive schema with an optional format.
    pub fn primitive(schema_type: &str, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            format: format.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::primitive("string", None)
    }

    /// An object schema with the given properties.
    pub fn object<I>(properties: I) -> Self
    where
        I: IntoIterator<Item = (String, Schema)>,
    {
        Self {
            schema_type: Some("object".to_string()),
            properties: Some(properties.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// A `$ref` to `#/definitions/{name}`.
    pub fn definition_ref(name: &str) -> Self {
        Self {
            reference: Some(format!("#/definitions/{}", name)),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        if !description.is_empty() {
            self.description = Some(description.to_string());
        }
        self
    }
}

/// Maps a documented type name to a schema.
///
/// A trailing qualifier such as `, optional` is ignored. Unknown names, including `n/a`,
/// map to an empty object.
pub fn type_schema(type_name: &str) -> Schema {
    match base_type(type_name).as_str() {
        "bool" | "boolean" => Schema::primitive("boolean", None),
        "int" | "integer" | "long" => Schema::primitive("integer", None),
        "dec" | "decimal" | "number" => Schema::primitive("number", None),
        "float" => Schema::primitive("number", Some("float")),
        "str" | "string" => Schema::string(),
        "binary" | "bytes" => Schema::primitive("string", Some("binary")),
        "date" => Schema::primitive("string", Some("date")),
        "time" => Schema::primitive("string", Some("time")),
        "datetime" | "date-time" => Schema::primitive("string", Some("date-time")),
        _ => Schema::object(Vec::new()),
    }
}

/// Lowercased type name without a trailing qualifier.
fn base_type(type_name: &str) -> String {
    type_name
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Schema of a table column, as used in definitions.
pub fn column_schema(column: &Field) -> Schema {
    type_schema(&column.ty)
}

/// Schema of a table column used as a path or query parameter.
///
/// Parameters only take primitive types or arrays. Sequence types become an array of
/// strings and any other non-primitive type is sent as a string.
pub fn parameter_schema(column: &Field) -> Schema {
    let schema = type_schema(&column.ty);
    if schema.schema_type.as_deref() != Some("object") {
        return schema;
    }

    match base_type(&column.ty).as_str() {
        "list" | "array" | "tuple" | "set" => Schema::array(Schema::string()),
        _ => Schema::string(),
    }
}
