//! Catalog parsing tests.

use querycanvas::catalog::{Catalog, CatalogError};
use serde_json::{json, Map, Value};

fn grid_catalog(schemas: usize, tables: usize, columns: usize) -> Value {
    let mut root = Map::new();
    for s in 0..schemas {
        let mut table_map = Map::new();
        for t in 0..tables {
            let cols: Vec<Value> = (0..columns)
                .map(|c| json!({ "name": format!("c{}_{}", t, c), "pk": c == 0 }))
                .collect();
            table_map.insert(format!("t{}", t), Value::Array(cols));
        }
        root.insert(format!("s{}", s), Value::Object(table_map));
    }
    Value::Object(root)
}

// ============================================================================
// Shape
// ============================================================================

#[test]
fn test_parse_grid_shape() {
    let catalog = Catalog::from_value(grid_catalog(3, 4, 5)).unwrap();

    assert_eq!(catalog.schemas().len(), 3);
    assert_eq!(catalog.tables().len(), 12);
    for schema in catalog.schemas() {
        assert_eq!(schema.tables.len(), 4);
        for table_id in &schema.tables {
            let table = catalog.table(*table_id);
            assert_eq!(table.schema, schema.id);
            assert_eq!(table.columns.len(), 5);
        }
    }
}

#[test]
fn test_column_order_and_pk_flags_preserved() {
    let catalog = Catalog::parse(
        r#"{"sales": {"orders": [
            {"name": "zeta", "pk": false},
            {"name": "alpha", "pk": true},
            {"name": "mid", "pk": true},
            {"name": "beta", "pk": false}
        ]}}"#,
    )
    .unwrap();

    let orders = catalog.find_table("sales", "orders").unwrap();
    let columns: Vec<(&str, bool)> = catalog
        .columns_of(orders.id)
        .map(|c| (c.name.as_str(), c.is_pk))
        .collect();

    assert_eq!(
        columns,
        vec![("zeta", false), ("alpha", true), ("mid", true), ("beta", false)]
    );
}

#[test]
fn test_schema_and_table_document_order() {
    let catalog = Catalog::parse(r#"{"zoo": {"b": [], "a": []}, "app": {"x": []}}"#).unwrap();

    let schemas: Vec<&str> = catalog.schemas().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(schemas, vec!["zoo", "app"]);

    let zoo_tables: Vec<&str> = catalog.schemas()[0]
        .tables
        .iter()
        .map(|id| catalog.table(*id).name.as_str())
        .collect();
    assert_eq!(zoo_tables, vec!["b", "a"]);
}

#[test]
fn test_table_without_columns() {
    let catalog = Catalog::parse(r#"{"s": {"empty": []}}"#).unwrap();
    let table = catalog.find_table("s", "empty").unwrap();
    assert_eq!(catalog.columns_of(table.id).count(), 0);
    assert_eq!(catalog.full_name(table.id), "s.empty");
}

#[test]
fn test_empty_catalog() {
    let catalog = Catalog::parse("{}").unwrap();
    assert!(catalog.schemas().is_empty());
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn test_missing_column_name() {
    let err = Catalog::parse(r#"{"s": {"t": [{"pk": true}]}}"#).unwrap_err();
    assert!(matches!(err, CatalogError::Malformed(_)));
}

#[test]
fn test_tables_not_an_object() {
    let err = Catalog::parse(r#"{"s": ["t"]}"#).unwrap_err();
    assert!(matches!(err, CatalogError::Malformed(_)));
}

#[test]
fn test_columns_not_a_list() {
    let err = Catalog::parse(r#"{"s": {"t": {"name": "id", "pk": true}}}"#).unwrap_err();
    assert!(matches!(err, CatalogError::Malformed(_)));
}

#[test]
fn test_pk_wrong_type() {
    let err = Catalog::parse(r#"{"s": {"t": [{"name": "id", "pk": "yes"}]}}"#).unwrap_err();
    assert!(matches!(err, CatalogError::Malformed(_)));
}

#[test]
fn test_invalid_json() {
    let err = Catalog::parse("{not json").unwrap_err();
    assert!(err.to_string().starts_with("Malformed catalog"));
}
