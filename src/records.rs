//! Typed rows for each loaded table.
//!
//! Rows are deserialized from CSV by header name, checked by
//! [`Record::validate`], then bound onto the table's `INSERT` statement.
//! Empty fields arrive as `None` and are stored as SQL NULL.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

use crate::schema::Table;

type Insert<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A CSV row that maps onto one table.
pub trait Record: DeserializeOwned {
    const TABLE: Table;

    /// Checks required fields and date formats. Returns a human-readable
    /// reason on failure.
    fn validate(&self) -> Result<(), String>;

    /// Binds every column, in [`Table::columns`] order.
    fn bind<'q>(&'q self, query: Insert<'q>) -> Insert<'q>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub signup_date: Option<String>,
    pub loyalty_tier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub currency: Option<String>,
    pub stock_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    pub order_date: Option<String>,
    pub order_status: Option<String>,
    pub payment_method: Option<String>,
    pub order_total: Option<f64>,
    pub ship_city: Option<String>,
    pub ship_state: Option<String>,
}

/// Line of an order. No pricing rules apply: a discount larger than
/// `quantity * item_price` is accepted as is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderItem {
    pub order_id: String,
    pub product_id: String,
    pub quantity: Option<i64>,
    pub item_price: Option<f64>,
    pub item_discount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Review {
    pub review_id: String,
    pub order_id: String,
    pub customer_id: String,
    pub product_id: String,
    pub rating: Option<i64>,
    pub review_text: Option<String>,
    pub review_date: Option<String>,
}

impl Record for Customer {
    const TABLE: Table = Table::Customers;

    fn validate(&self) -> Result<(), String> {
        required("customer_id", &self.customer_id)?;
        required("name", &self.name)?;
        required("email", &self.email)?;
        date("signup_date", self.signup_date.as_deref())
    }

    fn bind<'q>(&'q self, query: Insert<'q>) -> Insert<'q> {
        query
            .bind(&self.customer_id)
            .bind(&self.name)
            .bind(&self.email)
            .bind(&self.city)
            .bind(&self.state)
            .bind(&self.signup_date)
            .bind(&self.loyalty_tier)
    }
}

impl Record for Product {
    const TABLE: Table = Table::Products;

    fn validate(&self) -> Result<(), String> {
        required("product_id", &self.product_id)?;
        required("product_name", &self.product_name)
    }

    fn bind<'q>(&'q self, query: Insert<'q>) -> Insert<'q> {
        query
            .bind(&self.product_id)
            .bind(&self.product_name)
            .bind(&self.category)
            .bind(self.price)
            .bind(self.cost)
            .bind(&self.currency)
            .bind(&self.stock_status)
    }
}

impl Record for Order {
    const TABLE: Table = Table::Orders;

    fn validate(&self) -> Result<(), String> {
        required("order_id", &self.order_id)?;
        required("customer_id", &self.customer_id)?;
        date("order_date", self.order_date.as_deref())
    }

    fn bind<'q>(&'q self, query: Insert<'q>) -> Insert<'q> {
        query
            .bind(&self.order_id)
            .bind(&self.customer_id)
            .bind(&self.order_date)
            .bind(&self.order_status)
            .bind(&self.payment_method)
            .bind(self.order_total)
            .bind(&self.ship_city)
            .bind(&self.ship_state)
    }
}

impl Record for OrderItem {
    const TABLE: Table = Table::OrderItems;

    fn validate(&self) -> Result<(), String> {
        required("order_id", &self.order_id)?;
        required("product_id", &self.product_id)
    }

    fn bind<'q>(&'q self, query: Insert<'q>) -> Insert<'q> {
        query
            .bind(&self.order_id)
            .bind(&self.product_id)
            .bind(self.quantity)
            .bind(self.item_price)
            .bind(self.item_discount)
    }
}

impl Record for Review {
    const TABLE: Table = Table::Reviews;

    fn validate(&self) -> Result<(), String> {
        required("review_id", &self.review_id)?;
        required("order_id", &self.order_id)?;
        required("customer_id", &self.customer_id)?;
        required("product_id", &self.product_id)?;
        date("review_date", self.review_date.as_deref())
    }

    fn bind<'q>(&'q self, query: Insert<'q>) -> Insert<'q> {
        query
            .bind(&self.review_id)
            .bind(&self.order_id)
            .bind(&self.customer_id)
            .bind(&self.product_id)
            .bind(self.rating)
            .bind(&self.review_text)
            .bind(&self.review_date)
    }
}

fn required(column: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        Err(format!("required column `{column}` is empty"))
    } else {
        Ok(())
    }
}

fn date(column: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(v) if parse_date(v).is_none() => {
            Err(format!("column `{column}` has unparsable date {v:?}"))
        }
        _ => Ok(()),
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            customer_id: "C001".into(),
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            city: None,
            state: None,
            signup_date: Some("2023-04-01".into()),
            loyalty_tier: None,
        }
    }

    #[test]
    fn accepts_common_date_shapes() {
        assert!(parse_date("2024-02-29").is_some());
        assert!(parse_date("2024-02-29 13:45:00").is_some());
        assert!(parse_date("2024-02-29T13:45:00").is_some());
        assert!(parse_date("2024-02-29T13:45:00+02:00").is_some());
        assert!(parse_date("29/02/2024").is_none());
        assert!(parse_date("2023-02-29").is_none());
    }

    #[test]
    fn empty_required_field_is_rejected() {
        let mut c = customer();
        c.email.clear();
        let reason = c.validate().unwrap_err();
        assert!(reason.contains("`email`"), "{reason}");
    }

    #[test]
    fn bad_date_is_rejected_but_missing_date_is_fine() {
        let mut c = customer();
        c.signup_date = Some("yesterday".into());
        assert!(c.validate().is_err());

        c.signup_date = None;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn oversized_discount_passes_validation() {
        let item = OrderItem {
            order_id: "O1".into(),
            product_id: "P1".into(),
            quantity: Some(1),
            item_price: Some(5.0),
            item_discount: Some(50.0),
        };
        assert!(item.validate().is_ok());
    }
}
