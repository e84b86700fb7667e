//! Row-shape normalization for the SQL-over-HTTP datastore.
//!
//! Depending on driver version and transaction mode, the query endpoint
//! returns row data in one of several wrappers:
//!
//! - `{ "rows": [ {…}, … ] }`
//! - a bare array of record objects
//! - `[ { "rows": [ … ] } ]`
//! - an object keyed by numeric indexes (`{ "0": {…}, "1": {…} }`)
//! - nested arrays (`[ [ {…}, … ] ]`)
//!
//! [`normalize_rows`] reduces all of these to one flat sequence of record
//! objects. Non-record leaves are dropped; shapes outside the list above
//! yield an empty set rather than an error, since downstream code treats
//! "no rows" and "unrecognized payload" the same way.

use serde_json::{Map, Value};

/// A single normalized record.
pub type Row = Map<String, Value>;

/// Flattens any documented result shape into a list of record objects.
pub fn normalize_rows(payload: &Value) -> Vec<Row> {
    match payload {
        Value::Array(items) => flatten_items(items),
        Value::Object(map) => flatten_object(map),
        _ => Vec::new(),
    }
}

fn flatten_object(map: &Map<String, Value>) -> Vec<Row> {
    // `rows` wins over everything else when present.
    if let Some(rows) = map.get("rows") {
        return normalize_rows(rows);
    }

    // Numeric-indexed wrapper: treat the values, in index order, as items.
    if !map.is_empty() && map.keys().all(|k| k.parse::<usize>().is_ok()) {
        let mut indexed: Vec<(usize, &Value)> = map
            .iter()
            .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
            .collect();
        indexed.sort_by_key(|(i, _)| *i);

        let mut out = Vec::new();
        for (_, value) in indexed {
            out.extend(normalize_rows(value));
        }
        return out;
    }

    // A plain object is a single record.
    vec![map.clone()]
}

fn flatten_items(items: &[Value]) -> Vec<Row> {
    let mut out = Vec::new();
    for item in items {
        match item {
            Value::Object(map) => out.extend(flatten_object(map)),
            Value::Array(inner) => out.extend(flatten_items(inner)),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Value {
        json!([
            { "id": 1, "status": "paid" },
            { "id": 2, "status": "refunded" }
        ])
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn rows_wrapper() {
        let rows = normalize_rows(&json!({ "rows": records() }));
        assert_eq!(ids(&rows), vec![1, 2]);
    }

    #[test]
    fn bare_array() {
        let rows = normalize_rows(&records());
        assert_eq!(ids(&rows), vec![1, 2]);
    }

    #[test]
    fn array_of_rows_wrappers() {
        let rows = normalize_rows(&json!([ { "rows": records() } ]));
        assert_eq!(ids(&rows), vec![1, 2]);
    }

    #[test]
    fn numeric_indexed_wrapper() {
        // Index order, not insertion order.
        let rows = normalize_rows(&json!({
            "1": { "id": 2, "status": "refunded" },
            "0": { "id": 1, "status": "paid" }
        }));
        assert_eq!(ids(&rows), vec![1, 2]);
    }

    #[test]
    fn nested_arrays() {
        let rows = normalize_rows(&json!([ records() ]));
        assert_eq!(ids(&rows), vec![1, 2]);
    }

    #[test]
    fn all_shapes_agree() {
        let shapes = vec![
            json!({ "rows": records() }),
            records(),
            json!([ { "rows": records() } ]),
            json!({ "0": { "id": 1, "status": "paid" }, "1": { "id": 2, "status": "refunded" } }),
            json!([ records() ]),
        ];

        let expected = normalize_rows(&records());
        for shape in shapes {
            assert_eq!(normalize_rows(&shape), expected, "shape {shape}");
        }
    }

    #[test]
    fn single_record_object() {
        let rows = normalize_rows(&json!({ "id": 7, "status": "paid" }));
        assert_eq!(ids(&rows), vec![7]);
    }

    #[test]
    fn scalar_leaves_are_dropped() {
        let rows = normalize_rows(&json!([1, "two", null, { "id": 3, "status": "paid" }]));
        assert_eq!(ids(&rows), vec![3]);
    }

    #[test]
    fn unrecognized_shapes_yield_empty() {
        assert!(normalize_rows(&json!("rows")).is_empty());
        assert!(normalize_rows(&json!(42)).is_empty());
        assert!(normalize_rows(&json!(null)).is_empty());
        assert!(normalize_rows(&json!([])).is_empty());
    }
}
