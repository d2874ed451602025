use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// The four tables populated by the seeder, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Products,
    Orders,
    OrderItems,
}

impl Table {
    /// All tables in the order they must be populated.
    pub const ALL: [Table; 4] = [Table::Users, Table::Products, Table::Orders, Table::OrderItems];

    /// SQL table name.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Products => "products",
            Table::Orders => "orders",
            Table::OrderItems => "orderitems",
        }
    }

    /// Columns written by a bulk insert. The id column is assigned by the backend.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Users => &["email", "created_at"],
            Table::Products => &["name", "price"],
            Table::Orders => &["user_id", "created_at", "status"],
            Table::OrderItems => &["order_id", "product_id", "quantity", "price"],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Status written to every generated order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    /// Unit price, sampled independently of the product's own price.
    pub price: Decimal,
}

/// Rows of a single bulk insert.
#[derive(Debug, Clone, PartialEq)]
pub enum RowBatch {
    Users(Vec<NewUser>),
    Products(Vec<NewProduct>),
    Orders(Vec<NewOrder>),
    OrderItems(Vec<NewOrderItem>),
}

impl RowBatch {
    pub fn table(&self) -> Table {
        match self {
            RowBatch::Users(_) => Table::Users,
            RowBatch::Products(_) => Table::Products,
            RowBatch::Orders(_) => Table::Orders,
            RowBatch::OrderItems(_) => Table::OrderItems,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RowBatch::Users(rows) => rows.len(),
            RowBatch::Products(rows) => rows.len(),
            RowBatch::Orders(rows) => rows.len(),
            RowBatch::OrderItems(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_match_schema() {
        let names: Vec<&str> = Table::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["users", "products", "orders", "orderitems"]);
        assert_eq!(Table::OrderItems.to_string(), "orderitems");
    }

    #[test]
    fn test_batch_reports_table_and_len() {
        let batch = RowBatch::Products(vec![NewProduct {
            name: "Product 1".to_string(),
            price: Decimal::new(1999, 2),
        }]);
        assert_eq!(batch.table(), Table::Products);
        assert_eq!(batch.len(), 1);
        assert!(!batch.is_empty());
        assert!(RowBatch::Orders(Vec::new()).is_empty());
    }
}
