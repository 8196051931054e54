use diesel::prelude::*;

use crate::schema::{customers, order_items, orders, products};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderRow {
    pub id: String,
    pub customer_id: String,
    pub total: String,
}

/// Columns of an order row that `update` rewrites.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChangeset<'a> {
    pub customer_id: &'a str,
    pub total: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderItemRow {
    pub id: String,
    pub name: String,
    pub price: String,
    pub quantity: i32,
    pub order_id: String,
    pub product_id: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub price: String,
    pub quantity: i32,
    pub order_id: &'a str,
    pub product_id: &'a str,
}

// Customers and products are owned by other repositories; these rows exist
// so orders have something to reference.

#[derive(Debug, Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomerRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub price: String,
}
