use pretty_assertions::assert_eq;
use serde_json::json;
use swaggerify::{
    build_swagger,
    config::SwaggerConfig,
    docblock::parse_docblock,
    fields::{gen_fields, Field, FieldKind},
    manifest::{ManifestLoader, RouteDescriptor},
    publisher::SchemaPublisher,
    scanner::ManifestScanner,
    serializer::{serialize_json, serialize_yaml},
};
use tempfile::TempDir;

/// Helper function to create a temporary directory of manifests
fn create_manifest_dir(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write manifest");
    }

    temp_dir
}

fn build_fixture() -> serde_json::Value {
    let temp_dir = create_manifest_dir(vec![(
        "views/routes.yaml",
        include_str!("fixtures/routes.yaml"),
    )]);

    let scan_result = ManifestScanner::new(temp_dir.path().to_path_buf())
        .scan()
        .expect("Failed to scan manifests");
    assert_eq!(scan_result.manifest_files.len(), 1);

    let (routes, errors) = ManifestLoader::load_files(&scan_result.manifest_files);
    assert!(errors.is_empty(), "Unexpected errors: {:?}", errors);

    let config = SwaggerConfig {
        name: Some("ebay-search".to_string()),
        version: Some("0.4.0".to_string()),
        ..SwaggerConfig::default()
    };
    let builder = build_swagger(&routes, &config);
    let document = SchemaPublisher::new(builder.document())
        .publish("https://ebay-search.example.com/")
        .expect("Failed to publish");

    serde_json::to_value(&document).unwrap()
}

#[test]
fn test_google_docblock_fields() {
    let source = "Args:\n    arg1 (int): Description of arg1\nReturns:\n    str: Description of return value.";
    let tree = parse_docblock(source);
    let fields: Vec<Field> = gen_fields(&tree, None).collect();

    assert_eq!(
        fields,
        vec![
            Field::new("arg1", "Description of arg1", "int", FieldKind::Type),
            Field::new("rvalue", "Description of return value.", "str", FieldKind::Result),
        ]
    );
}

#[test]
fn test_dict_route_end_to_end() {
    let route = RouteDescriptor::new(
        "search",
        "/search/",
        "Perform a site search\n\nKwargs:\n    q (str): The search term(s)\n",
    );
    let builder = build_swagger(&[route], &SwaggerConfig::default());
    let doc = serde_json::to_value(builder.document()).unwrap();

    let results = &doc["paths"]["/search"]["get"]["responses"]["200"]["schema"]["properties"]
        ["objects"]["properties"]["results"]["properties"];
    assert_eq!(results["<id>"], json!({"$ref": "#/definitions/search_result"}));

    assert_eq!(
        doc["definitions"]["search_result"],
        json!({
            "type": "object",
            "properties": {
                "q": {"type": "string", "description": "The search term(s)"}
            }
        })
    );
}

#[test]
fn test_excluded_route_is_never_documented() {
    let routes = vec![
        RouteDescriptor::new("home", "/", "Home\n\nKwargs:\n    q (str): query\n"),
        RouteDescriptor::new("lorem", "/lorem/", "Lorem"),
    ];
    let builder = build_swagger(&routes, &SwaggerConfig::default());
    let paths: Vec<_> = builder.document().paths.keys().cloned().collect();

    assert_eq!(paths, vec!["/lorem".to_string()]);
    assert!(!builder.document().definitions.contains_key("home_result"));
}

#[test]
fn test_bad_documentation_does_not_stop_the_pass() {
    let routes = vec![
        RouteDescriptor::new("broken", "/broken/", ":::\n\u{0}\n:param x"),
        RouteDescriptor::new("empty", "/empty/", "\n\n"),
        RouteDescriptor::new("lorem", "/lorem/", "Lorem"),
    ];
    let builder = build_swagger(&routes, &SwaggerConfig::default());

    assert!(builder.document().paths.contains_key("/lorem"));
    assert!(!builder.document().paths.contains_key("/empty"));
}

#[test]
fn test_fixture_paths() {
    let doc = build_fixture();
    let paths: Vec<_> = doc["paths"].as_object().unwrap().keys().cloned().collect();

    assert_eq!(
        paths,
        vec![
            "/cached",
            "/cached/{base}",
            "/category",
            "/item/{item_id}",
            "/lorem",
            "/search",
            "/ship/{item_id}",
            "/sub_category/{cid}",
            "/sub_category/{name}",
        ]
    );
}

#[test]
fn test_fixture_document_header() {
    let doc = build_fixture();

    assert_eq!(doc["swagger"], "2.0");
    assert_eq!(doc["host"], "ebay-search.example.com");
    assert_eq!(doc["info"], json!({"title": "ebay-search", "version": "0.4.0"}));
    assert_eq!(
        doc["tags"],
        json!([
            {"name": "Amazon", "description": "Amazon operations"},
            {"name": "Other", "description": "Other operations"}
        ])
    );
}

#[test]
fn test_fixture_ship_operation() {
    let doc = build_fixture();
    let get = &doc["paths"]["/ship/{item_id}"]["get"];

    assert_eq!(get["summary"], "Calculate an item's shipping cost");
    let parameters: Vec<_> = get["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["name"].as_str().unwrap(), p["in"].as_str().unwrap()))
        .collect();
    assert_eq!(
        parameters,
        vec![
            ("item_id", "path"),
            ("country", "query"),
            ("dest", "query"),
            ("code", "query"),
            ("details", "query"),
            ("quantity", "query"),
        ]
    );
    assert_eq!(
        get["parameters"][2]["description"],
        "destination country (see http://www.airlinecodes.co.uk/country.asp for valid codes, default: 'US')"
    );
    assert_eq!(get["parameters"][4]["type"], "boolean");
    assert_eq!(
        get["responses"]["200"]["schema"]["properties"]["objects"]["properties"]["results"],
        json!({"$ref": "#/definitions/ship_result"})
    );
}

#[test]
fn test_fixture_sub_category_allow_list() {
    let doc = build_fixture();

    let by_cid = &doc["paths"]["/sub_category/{cid}"]["get"]["parameters"];
    let names: Vec<_> = by_cid
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, vec!["cid", "country"]);
    assert_eq!(by_cid[0]["type"], "integer");
    assert_eq!(
        doc["paths"]["/category"]["get"]["responses"]["200"]["schema"]["properties"]["objects"]
            ["type"],
        "array"
    );
}

#[test]
fn test_fixture_delete_and_simple_routes() {
    let doc = build_fixture();

    let delete = &doc["paths"]["/cached/{base}"]["delete"];
    assert_eq!(delete["tags"], json!(["Other"]));
    assert_eq!(
        delete["responses"]["204"]["schema"],
        json!({"type": "object", "properties": {"objects": {"type": "string"}}})
    );

    assert_eq!(
        doc["definitions"]["lorem_result"]["properties"]["rvalue"],
        json!({"type": "string", "description": "A bacon ipsum sentence"})
    );
    assert!(doc["paths"]["/lorem"].get("head").is_none());
}

#[test]
fn test_fixture_serializes_to_both_formats() {
    let temp_dir = create_manifest_dir(vec![("routes.yaml", include_str!("fixtures/routes.yaml"))]);
    let routes = ManifestLoader::load_file(&temp_dir.path().join("routes.yaml")).unwrap();
    let builder = build_swagger(&routes, &SwaggerConfig::default());

    let json = serialize_json(builder.document()).unwrap();
    let yaml = serialize_yaml(builder.document()).unwrap();

    assert!(json.contains("\"/search\""));
    assert!(yaml.contains("/search:"));
    assert!(yaml.contains("$ref: '#/definitions/search_result'"));
}

fn assert_valid_parameters(doc: &serde_json::Value) {
    const PARAMETER_TYPES: &[&str] = &["string", "number", "integer", "boolean", "array", "file"];

    for (path, item) in doc["paths"].as_object().unwrap() {
        for operation in item.as_object().unwrap().values() {
            for parameter in operation["parameters"].as_array().unwrap() {
                let ty = parameter["type"].as_str().unwrap_or_default();
                assert!(
                    PARAMETER_TYPES.contains(&ty),
                    "{} {} has type {:?}",
                    path,
                    parameter["name"],
                    ty
                );
                assert!(parameter.get("properties").is_none());
            }
        }
    }
}

#[test]
fn test_fixture_parameters_use_parameter_types() {
    assert_valid_parameters(&build_fixture());
}

#[test]
fn test_collection_kwargs_become_valid_parameters() {
    let route = RouteDescriptor::new(
        "blueprint.memo",
        "/memo/<key>/",
        "Fetch a memo\n\nArgs:\n    key (dict): memo key\n\nKwargs:\n    opts (dict): options\n    tags (list): tags\n",
    );
    let builder = build_swagger(&[route], &SwaggerConfig::default());
    let doc = serde_json::to_value(builder.document()).unwrap();

    assert_valid_parameters(&doc);
    let parameters = &doc["paths"]["/memo/{key}"]["get"]["parameters"];
    assert_eq!(parameters[0]["type"], "string");
    assert_eq!(parameters[2]["items"], json!({"type": "string"}));
}
