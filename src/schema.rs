//! Fixed relational schema for the five loaded tables.
//!
//! `inventory_events.csv` ships with the dataset but is intentionally not part
//! of the schema: no table is created for it and no code path reads it.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::db_utils::table_columns;
use crate::errors::IngestError;

/// CSV file that is shipped with the dataset but never loaded.
pub const UNLOADED_FILE: &str = "inventory_events.csv";

/// One of the loaded tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Customers,
    Products,
    Orders,
    OrderItems,
    Reviews,
}

/// Insert order. Parents come before the tables that reference them.
pub const LOAD_SEQUENCE: [Table; 5] = [
    Table::Customers,
    Table::Products,
    Table::Orders,
    Table::OrderItems,
    Table::Reviews,
];

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Customers => "customers",
            Table::Products => "products",
            Table::Orders => "orders",
            Table::OrderItems => "order_items",
            Table::Reviews => "reviews",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Table::Customers => "customers.csv",
            Table::Products => "products.csv",
            Table::Orders => "orders.csv",
            Table::OrderItems => "order_items.csv",
            Table::Reviews => "reviews.csv",
        }
    }

    /// Column names in table order. CSV headers must contain all of them.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Customers => &[
                "customer_id",
                "name",
                "email",
                "city",
                "state",
                "signup_date",
                "loyalty_tier",
            ],
            Table::Products => &[
                "product_id",
                "product_name",
                "category",
                "price",
                "cost",
                "currency",
                "stock_status",
            ],
            Table::Orders => &[
                "order_id",
                "customer_id",
                "order_date",
                "order_status",
                "payment_method",
                "order_total",
                "ship_city",
                "ship_state",
            ],
            Table::OrderItems => &[
                "order_id",
                "product_id",
                "quantity",
                "item_price",
                "item_discount",
            ],
            Table::Reviews => &[
                "review_id",
                "order_id",
                "customer_id",
                "product_id",
                "rating",
                "review_text",
                "review_date",
            ],
        }
    }

    pub fn create_sql(self) -> &'static str {
        match self {
            Table::Customers => {
                r#"
                CREATE TABLE IF NOT EXISTS customers (
                    customer_id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    city TEXT,
                    state TEXT,
                    signup_date TEXT,
                    loyalty_tier TEXT
                )
                "#
            }
            Table::Products => {
                r#"
                CREATE TABLE IF NOT EXISTS products (
                    product_id TEXT PRIMARY KEY,
                    product_name TEXT NOT NULL,
                    category TEXT,
                    price REAL,
                    cost REAL,
                    currency TEXT,
                    stock_status TEXT
                )
                "#
            }
            Table::Orders => {
                r#"
                CREATE TABLE IF NOT EXISTS orders (
                    order_id TEXT PRIMARY KEY,
                    customer_id TEXT NOT NULL,
                    order_date TEXT,
                    order_status TEXT,
                    payment_method TEXT,
                    order_total REAL,
                    ship_city TEXT,
                    ship_state TEXT,
                    FOREIGN KEY (customer_id) REFERENCES customers(customer_id)
                )
                "#
            }
            Table::OrderItems => {
                r#"
                CREATE TABLE IF NOT EXISTS order_items (
                    order_id TEXT NOT NULL,
                    product_id TEXT NOT NULL,
                    quantity INTEGER,
                    item_price REAL,
                    item_discount REAL,
                    PRIMARY KEY (order_id, product_id),
                    FOREIGN KEY (order_id) REFERENCES orders(order_id),
                    FOREIGN KEY (product_id) REFERENCES products(product_id)
                )
                "#
            }
            Table::Reviews => {
                r#"
                CREATE TABLE IF NOT EXISTS reviews (
                    review_id TEXT PRIMARY KEY,
                    order_id TEXT NOT NULL,
                    customer_id TEXT NOT NULL,
                    product_id TEXT NOT NULL,
                    rating INTEGER,
                    review_text TEXT,
                    review_date TEXT,
                    FOREIGN KEY (order_id) REFERENCES orders(order_id),
                    FOREIGN KEY (customer_id) REFERENCES customers(customer_id),
                    FOREIGN KEY (product_id) REFERENCES products(product_id)
                )
                "#
            }
        }
    }

    /// `INSERT` statement with one positional placeholder per column.
    pub fn insert_sql(self) -> String {
        let columns = self.columns();
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name(),
            columns.join(", "),
            placeholders
        )
    }
}

/// Create any missing tables and check that existing ones have the expected
/// columns.
pub async fn create_tables(conn: &mut SqliteConnection) -> Result<(), IngestError> {
    for table in LOAD_SEQUENCE {
        sqlx::query(table.create_sql())
            .execute(&mut *conn)
            .await
            .map_err(|source| IngestError::Schema {
                table: table.name(),
                source,
            })?;

        let found = table_columns(&mut *conn, table.name()).await?;
        let expected: Vec<String> = table.columns().iter().map(|c| c.to_string()).collect();
        if found != expected {
            return Err(IngestError::SchemaMismatch {
                table: table.name(),
                expected,
                found,
            });
        }
        debug!(table = table.name(), "Table ready");
    }
    Ok(())
}

/// Delete every row, children first so foreign keys stay satisfied.
pub async fn clear_tables(conn: &mut SqliteConnection) -> Result<(), IngestError> {
    for table in LOAD_SEQUENCE.iter().rev() {
        sqlx::query(&format!("DELETE FROM {}", table.name()))
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_sql_lists_every_column() {
        assert_eq!(
            Table::OrderItems.insert_sql(),
            "INSERT INTO order_items (order_id, product_id, quantity, item_price, item_discount) \
             VALUES (?1, ?2, ?3, ?4, ?5)"
        );
    }

    #[test]
    fn ddl_declares_every_column() {
        for table in LOAD_SEQUENCE {
            let ddl = table.create_sql();
            assert!(ddl.contains(&format!("EXISTS {} (", table.name())));
            for column in table.columns() {
                assert!(ddl.contains(&format!("{column} ")), "{column} missing");
            }
        }
    }

    #[test]
    fn inventory_events_is_not_a_loaded_table() {
        assert!(LOAD_SEQUENCE
            .iter()
            .all(|t| t.file_name() != UNLOADED_FILE));
    }
}
