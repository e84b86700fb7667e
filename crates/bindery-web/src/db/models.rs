use serde::{Deserialize, Serialize};

use bindery_core::rows::Row;

/// One order row. Serialized camelCase for the admin API; the aliases keep
/// deserialization working against the snake_case column names coming back
/// from the datastore.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    pub id: i64,
    #[serde(alias = "session_id")]
    pub session_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "amount_total")]
    pub amount_total: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "created_at")]
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRow {
    #[serde(alias = "order_id")]
    pub order_id: i64,
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, alias = "changed_at")]
    pub changed_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRow {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default, alias = "published_at")]
    pub published_at: String,
}

/// Maps normalized rows onto a typed struct, dropping rows that do not fit.
///
/// A row that fails to deserialize is a data problem worth a log line, not a
/// reason to fail the whole listing.
pub fn rows_to<T: serde::de::DeserializeOwned>(rows: Vec<Row>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| {
            serde_json::from_value(serde_json::Value::Object(row))
                .map_err(|e| tracing::warn!("Dropping malformed row: {e}"))
                .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_row_from_snake_case_columns() {
        let rows = bindery_core::normalize_rows(&json!({ "rows": [{
            "id": 3,
            "session_id": "cs_123",
            "email": "reader@example.com",
            "amount_total": 2400,
            "currency": "usd",
            "status": "paid",
            "created_at": "2026-01-05T10:00:00Z"
        }]}));

        let orders: Vec<OrderRow> = rows_to(rows);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].session_id, "cs_123");
        assert_eq!(orders[0].amount_total, 2400);
    }

    #[test]
    fn order_row_serializes_camel_case() {
        let order = OrderRow {
            id: 1,
            session_id: "cs_1".into(),
            email: None,
            amount_total: 100,
            currency: "usd".into(),
            status: "paid".into(),
            created_at: "2026-01-05T10:00:00Z".into(),
        };
        let value = serde_json::to_value(&order).unwrap();
        assert!(value.get("sessionId").is_some());
        assert!(value.get("amountTotal").is_some());
    }

    #[test]
    fn malformed_rows_are_dropped() {
        let rows = bindery_core::normalize_rows(&json!([
            { "id": 1, "session_id": "cs_1" },
            { "slug": "not-an-order" }
        ]));
        let orders: Vec<OrderRow> = rows_to(rows);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, 1);
    }
}
