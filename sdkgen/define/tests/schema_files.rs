use std::fs;

use sdkgen_define::{FieldType, ParseError, RelationKind, parse_file};
use tempfile::TempDir;

#[test]
fn reads_yaml_file_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shop.yaml");
    fs::write(
        &path,
        "
restApiRoot: /v2
models:
  - name: Store
    properties:
      - name: location
        type: geopoint
    relations:
      - name: tags
        type: hasAndBelongsToMany
        model: Store
",
    )
    .unwrap();

    let model = parse_file(&path).unwrap();
    assert_eq!(model.api_root, "/v2");
    let store = &model.entities[0];
    assert_eq!(store.fields[0].ty, FieldType::Unsupported("geopoint".into()));
    assert_eq!(store.relations[0].kind, RelationKind::HasAndBelongsToMany);
    assert!(!store.relations[0].kind.is_supported());
}

#[test]
fn reads_json_file_and_keeps_source() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shop.json");
    fs::write(&path, r#"{ "name": "Shop", "models": [ { "name": "Customer" } ] }"#).unwrap();

    let model = parse_file(&path).unwrap();
    assert_eq!(model.source["name"], "Shop");
    assert_eq!(model.entities[0].plural, None);
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = parse_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}
