use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::ConnectOptions;

/// Opens the single connection used for a reload run.
///
/// # Arguments
///
/// * `path` - SQLite database file; created if it does not exist yet.
///
/// # Returns
///
/// * `Ok(SqliteConnection)` - An open connection with foreign keys enforced.
/// * `Err` - If the file cannot be opened or created.
///
/// # Notes
///
/// Foreign-key enforcement is a per-connection setting in SQLite, so it is
/// set on the connect options rather than issued as a separate `PRAGMA`.
pub async fn connect(path: &Path) -> Result<SqliteConnection, sqlx::Error> {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .connect()
        .await
}

/// Lists the column names of `table` in declaration order.
///
/// # Arguments
///
/// * `conn` - Open connection (or transaction) to inspect.
/// * `table` - Table name.
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Column names, empty if the table does not exist.
/// * `Err` - If the pragma query fails.
pub async fn table_columns(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
        .bind(table)
        .fetch_all(conn)
        .await
}

/// Returns whether a table called `table` exists.
pub async fn table_exists(conn: &mut SqliteConnection, table: &str) -> Result<bool, sqlx::Error> {
    let exists: (i64,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
    )
    .bind(table)
    .fetch_one(conn)
    .await?;

    Ok(exists.0 != 0)
}

/// Counts the rows in `table`.
///
/// # Notes
///
/// The table name is interpolated into the SQL, so callers must only pass
/// names from the fixed schema.
pub async fn row_count(conn: &mut SqliteConnection, table: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(conn)
        .await
}
