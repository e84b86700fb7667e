//! Parameterized statements against the datastore.
//!
//! Handlers never build SQL themselves; everything flows through these
//! wrappers so placeholders stay positional and typed rows come back.

use serde_json::json;

use crate::db::models::{rows_to, OrderRow, PostRow, StatusChangeRow};
use crate::db::Database;

/// Records a paid order keyed by its checkout session id. Replaying the
/// thank-you page must not duplicate the row.
pub async fn insert_order(
    db: &Database,
    session_id: &str,
    email: Option<&str>,
    amount_total: i64,
    currency: &str,
    status: &str,
) -> anyhow::Result<()> {
    db.execute(
        "INSERT INTO orders (session_id, email, amount_total, currency, status) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (session_id) DO NOTHING",
        vec![
            json!(session_id),
            json!(email),
            json!(amount_total),
            json!(currency),
            json!(status),
        ],
    )
    .await
}

pub async fn list_orders(db: &Database) -> anyhow::Result<Vec<OrderRow>> {
    let rows = db
        .query(
            "SELECT id, session_id, email, amount_total, currency, status, created_at \
             FROM orders ORDER BY created_at DESC LIMIT 200",
            vec![],
        )
        .await?;
    Ok(rows_to(rows))
}

/// Status mutation is two statements: the UPDATE and the history INSERT.
/// They run sequentially without a transaction; a failed INSERT leaves the
/// order updated but unhistorized, which the admin UI tolerates.
pub async fn update_order_status(
    db: &Database,
    order_id: i64,
    status: &str,
    note: Option<&str>,
) -> anyhow::Result<()> {
    db.execute(
        "UPDATE orders SET status = $2 WHERE id = $1",
        vec![json!(order_id), json!(status)],
    )
    .await?;

    db.execute(
        "INSERT INTO order_status_history (order_id, status, note) VALUES ($1, $2, $3)",
        vec![json!(order_id), json!(status), json!(note)],
    )
    .await
}

pub async fn list_status_history(db: &Database) -> anyhow::Result<Vec<StatusChangeRow>> {
    let rows = db
        .query(
            "SELECT order_id, status, note, changed_at \
             FROM order_status_history ORDER BY changed_at DESC LIMIT 500",
            vec![],
        )
        .await?;
    Ok(rows_to(rows))
}

pub async fn insert_listen_event(
    db: &Database,
    chapter: u32,
    position_seconds: u64,
) -> anyhow::Result<()> {
    db.execute(
        "INSERT INTO listen_events (chapter, position_seconds) VALUES ($1, $2)",
        vec![json!(chapter), json!(position_seconds)],
    )
    .await
}

pub async fn list_published_posts(db: &Database) -> anyhow::Result<Vec<PostRow>> {
    let rows = db
        .query(
            "SELECT slug, title, excerpt, published_at \
             FROM posts WHERE published = TRUE ORDER BY published_at DESC",
            vec![],
        )
        .await?;
    Ok(rows_to(rows))
}
