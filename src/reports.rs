//! Analytical queries over a loaded database.
//!
//! These only read. Revenue for an order line is
//! `quantity * item_price - item_discount` and may be negative.

use sqlx::{FromRow, SqliteConnection};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProductRevenue {
    pub product_id: String,
    pub product_name: String,
    pub units_sold: Option<i64>,
    pub revenue: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CustomerRevenue {
    pub customer_id: String,
    pub name: String,
    pub order_count: i64,
    pub total_revenue: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RecentOrder {
    pub order_id: String,
    pub customer_id: String,
    pub order_date: Option<String>,
    pub order_total: Option<f64>,
    /// Product names in the order, comma separated; `None` for an order with no lines.
    pub products: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProductRating {
    pub product_id: String,
    pub product_name: String,
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

/// Products ranked by net line revenue, highest first.
pub async fn top_products_by_revenue(
    conn: &mut SqliteConnection,
    limit: i64,
) -> Result<Vec<ProductRevenue>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT p.product_id,
               p.product_name,
               SUM(oi.quantity) AS units_sold,
               CAST(SUM(oi.quantity * oi.item_price - COALESCE(oi.item_discount, 0)) AS REAL) AS revenue
        FROM order_items oi
        JOIN products p ON p.product_id = oi.product_id
        GROUP BY p.product_id, p.product_name
        ORDER BY revenue DESC, p.product_id
        LIMIT ?1
        "#,
    )
    .bind(limit)
    .fetch_all(conn)
    .await
}

/// Order count and summed `order_total` for every customer with at least one order.
pub async fn revenue_per_customer(
    conn: &mut SqliteConnection,
) -> Result<Vec<CustomerRevenue>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT c.customer_id,
               c.name,
               COUNT(o.order_id) AS order_count,
               CAST(SUM(o.order_total) AS REAL) AS total_revenue
        FROM customers c
        JOIN orders o ON o.customer_id = c.customer_id
        GROUP BY c.customer_id, c.name
        ORDER BY total_revenue DESC, c.customer_id
        "#,
    )
    .fetch_all(conn)
    .await
}

/// Latest orders by `order_date`, each with the names of the products it contains.
pub async fn recent_orders(
    conn: &mut SqliteConnection,
    limit: i64,
) -> Result<Vec<RecentOrder>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT o.order_id,
               o.customer_id,
               o.order_date,
               CAST(o.order_total AS REAL) AS order_total,
               GROUP_CONCAT(p.product_name, ', ') AS products
        FROM orders o
        LEFT JOIN order_items oi ON oi.order_id = o.order_id
        LEFT JOIN products p ON p.product_id = oi.product_id
        GROUP BY o.order_id
        ORDER BY o.order_date DESC, o.order_id
        LIMIT ?1
        "#,
    )
    .bind(limit)
    .fetch_all(conn)
    .await
}

/// Mean rating and review count for every product that has been reviewed.
pub async fn average_rating_per_product(
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductRating>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT p.product_id,
               p.product_name,
               AVG(r.rating) AS average_rating,
               COUNT(r.review_id) AS review_count
        FROM reviews r
        JOIN products p ON p.product_id = r.product_id
        GROUP BY p.product_id, p.product_name
        ORDER BY average_rating DESC, p.product_id
        "#,
    )
    .fetch_all(conn)
    .await
}
