//! Query compilation tests: canvas + column specs to clause bundle.

use querycanvas::canvas::Canvas;
use querycanvas::catalog::Catalog;
use querycanvas::column_spec::{Aggregate, ColumnSpec, SortDir};
use querycanvas::compile::{compile, ClauseBundle, CompileError, QueryCompiler};
use querycanvas::relationship::{JoinKind, JoinPlanError};
use querycanvas::sql::{RenderOptions, WhereComposition};

fn catalog() -> Catalog {
    Catalog::parse(
        r#"{"sales": {
            "customers": [{"name": "id", "pk": true}, {"name": "region", "pk": false}],
            "orders": [
                {"name": "id", "pk": true},
                {"name": "customer_id", "pk": false},
                {"name": "total", "pk": false}
            ]
        }}"#,
    )
    .unwrap()
}

fn canvas(catalog: &Catalog) -> Canvas<'_> {
    let mut canvas = Canvas::new(catalog);
    let customers = canvas.place_table(catalog.find_table("sales", "customers").unwrap().id);
    let orders = canvas.place_table(catalog.find_table("sales", "orders").unwrap().id);
    canvas
        .connect((orders, "customer_id"), (customers, "id"), JoinKind::Left)
        .unwrap();
    canvas
}

fn specs() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("customers.region")
            .with_aggregate(Aggregate::GroupBy)
            .with_sort(SortDir::Asc)
            .with_criteria(["'north'", "'south'"]),
        ColumnSpec::new("orders.total")
            .with_aggregate(Aggregate::Sum)
            .with_sort(SortDir::Desc)
            .with_criteria(["100", "200"]),
        ColumnSpec::new("orders.id")
            .with_aggregate(Aggregate::Count)
            .with_visible(false),
    ]
}

// ============================================================================
// Bundles
// ============================================================================

#[test]
fn test_bundle_with_totals() {
    let catalog = catalog();
    let canvas = canvas(&catalog);

    let bundle = QueryCompiler::new(&catalog)
        .with_totals(true)
        .compile(&specs(), canvas.graph())
        .unwrap();

    assert_eq!(
        bundle,
        ClauseBundle {
            select: vec![
                "customers.region".to_string(),
                "sum(orders.total)".to_string()
            ],
            from: "customers LEFT JOIN orders ON id = customer_id ".to_string(),
            where_groups: vec![
                "customers.region = 'north' OR customers.region = 'south'".to_string(),
                "sum(orders.total) = 100 OR sum(orders.total) = 200".to_string(),
            ],
            group_by: vec!["customers.region".to_string()],
            order_by: vec![
                "customers.region asc".to_string(),
                "orders.total desc".to_string()
            ],
        }
    );
}

#[test]
fn test_bundle_without_totals() {
    let catalog = catalog();
    let canvas = canvas(&catalog);

    let bundle = compile(&catalog, &specs(), canvas.graph(), false).unwrap();

    assert_eq!(bundle.select, vec!["customers.region", "orders.total"]);
    assert!(bundle.group_by.is_empty());
    assert_eq!(
        bundle.where_groups[1],
        "orders.total = 100 OR orders.total = 200"
    );
}

#[test]
fn test_toggle_totals() {
    let catalog = catalog();
    let canvas = canvas(&catalog);
    let mut compiler = QueryCompiler::new(&catalog);
    assert!(!compiler.totals_enabled());

    compiler.toggle_totals();
    let with_totals = compiler.compile(&specs(), canvas.graph()).unwrap();
    compiler.toggle_totals();
    let without = compiler.compile(&specs(), canvas.graph()).unwrap();

    assert_eq!(with_totals.group_by.len(), 1);
    assert!(without.group_by.is_empty());
    assert_eq!(with_totals.from, without.from);
}

#[test]
fn test_column_order_preserved() {
    let catalog = catalog();
    let canvas = canvas(&catalog);
    let mut reversed = specs();
    reversed.reverse();

    let bundle = compile(&catalog, &reversed, canvas.graph(), true).unwrap();
    assert_eq!(bundle.select, vec!["sum(orders.total)", "customers.region"]);
    assert_eq!(bundle.order_by, vec!["orders.total desc", "customers.region asc"]);
}

#[test]
fn test_empty_graph_propagates() {
    let catalog = catalog();
    let canvas = Canvas::new(&catalog);

    let err = compile(&catalog, &specs(), canvas.graph(), true).unwrap_err();
    assert_eq!(err, CompileError::JoinPlan(JoinPlanError::EmptyGraph));
    assert_eq!(
        err.to_string(),
        "Cannot build a join plan: no relationships defined"
    );
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_render_pretty_sql() {
    let catalog = catalog();
    let canvas = canvas(&catalog);
    let bundle = compile(&catalog, &specs(), canvas.graph(), true).unwrap();

    let options = RenderOptions::default().with_pretty(true);
    insta::assert_snapshot!(bundle.to_sql(&options), @r"
    SELECT customers.region, sum(orders.total)
    FROM customers LEFT JOIN orders ON id = customer_id
    WHERE (customers.region = 'north' OR customers.region = 'south') AND (sum(orders.total) = 100 OR sum(orders.total) = 200)
    GROUP BY customers.region
    ORDER BY customers.region asc, orders.total desc
    ");
}

#[test]
fn test_render_or_composition() {
    let catalog = catalog();
    let canvas = canvas(&catalog);
    let bundle = compile(&catalog, &specs(), canvas.graph(), false).unwrap();

    let options = RenderOptions::default().with_where_composition(WhereComposition::Or);
    assert_eq!(
        bundle.where_predicate(options.where_composition).unwrap(),
        "(customers.region = 'north' OR customers.region = 'south') OR \
         (orders.total = 100 OR orders.total = 200)"
    );
}

#[test]
fn test_bundle_serializes_where_key() {
    let catalog = catalog();
    let canvas = canvas(&catalog);
    let bundle = compile(&catalog, &specs(), canvas.graph(), true).unwrap();

    let value = serde_json::to_value(&bundle).unwrap();
    assert_eq!(value["where"].as_array().unwrap().len(), 2);
    assert_eq!(value["from"], "customers LEFT JOIN orders ON id = customer_id ");
}
