use std::str::FromStr;

use bigdecimal::BigDecimal;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, OrderChangeset, OrderItemRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Row mapping ──────────────────────────────────────────────────────────────

fn parse_decimal(column: &str, value: &str) -> Result<BigDecimal, DomainError> {
    BigDecimal::from_str(value)
        .map_err(|e| DomainError::Internal(format!("invalid {} '{}': {}", column, value, e)))
}

fn new_item_row<'a>(order_id: &'a str, item: &'a OrderItem) -> NewOrderItemRow<'a> {
    NewOrderItemRow {
        id: &item.id,
        name: &item.name,
        price: item.price.to_plain_string(),
        quantity: item.quantity,
        order_id,
        product_id: &item.product_id,
    }
}

fn to_entity(order: OrderRow, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
    let items = items
        .into_iter()
        .map(|i| {
            let price = parse_decimal("order_items.price", &i.price)?;
            Ok(OrderItem::new(i.id, i.name, price, i.product_id, i.quantity))
        })
        .collect::<Result<Vec<_>, DomainError>>()?;
    Ok(Order::new(order.id, order.customer_id, items))
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: &Order) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.immediate_transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order with its computed total
            diesel::insert_into(orders::table)
                .values(&OrderRow {
                    id: order.id().to_string(),
                    customer_id: order.customer_id().to_string(),
                    total: order.total().to_plain_string(),
                })
                .execute(conn)?;

            // 2. Insert its items, keyed to the order
            let rows: Vec<NewOrderItemRow> = order
                .items()
                .iter()
                .map(|item| new_item_row(order.id(), item))
                .collect();
            if !rows.is_empty() {
                diesel::insert_into(order_items::table)
                    .values(&rows)
                    .execute(conn)?;
            }

            Ok(())
        })?;

        log::debug!(
            "Created order {} with {} item(s)",
            order.id(),
            order.items().len()
        );
        Ok(())
    }

    fn find(&self, id: &str) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order = orders::table
                .find(id)
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound)?;

            let items = OrderItemRow::belonging_to(&order)
                .select(OrderItemRow::as_select())
                .load(conn)?;

            to_entity(order, items)
        })
    }

    fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let rows = orders::table.select(OrderRow::as_select()).load(conn)?;

            let items = OrderItemRow::belonging_to(&rows)
                .select(OrderItemRow::as_select())
                .load(conn)?;

            items
                .grouped_by(&rows)
                .into_iter()
                .zip(rows)
                .map(|(items, order)| to_entity(order, items))
                .collect()
        })
    }

    fn update(&self, order: &Order) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let applied = conn.immediate_transaction::<_, DomainError, _>(|conn| {
            // 1. Load the stored order; nothing to do when it was never created
            let Some(existing) = orders::table
                .find(order.id())
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?
            else {
                return Ok(false);
            };

            // 2. Find-or-create each item by id. Rows that already exist keep
            //    their stored attributes.
            for item in order.items() {
                let stored = order_items::table
                    .find(&item.id)
                    .select(order_items::id)
                    .first::<String>(conn)
                    .optional()?;

                if stored.is_none() {
                    diesel::insert_into(order_items::table)
                        .values(&new_item_row(&existing.id, item))
                        .execute(conn)?;
                }
            }

            // 3. Refresh the order row from the aggregate
            diesel::update(&existing)
                .set(&OrderChangeset {
                    customer_id: order.customer_id(),
                    total: order.total().to_plain_string(),
                })
                .execute(conn)?;

            Ok(true)
        })?;

        if applied {
            log::debug!("Updated order {}", order.id());
        } else {
            log::warn!("Update skipped: order {} does not exist", order.id());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use diesel::prelude::*;

    use super::DieselOrderRepository;
    use crate::db::{create_pool, run_migrations, DbPool};
    use crate::domain::errors::DomainError;
    use crate::domain::order::{Order, OrderItem};
    use crate::domain::ports::OrderRepository;
    use crate::infrastructure::models::{NewCustomerRow, NewProductRow, OrderItemRow, OrderRow};
    use crate::schema::{customers, order_items, orders, products};

    fn setup_db() -> DbPool {
        let pool = create_pool(":memory:", 1).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");

        let mut conn = pool.get().expect("Failed to get connection");
        diesel::insert_into(customers::table)
            .values(&NewCustomerRow {
                id: "123",
                name: "Customer 1",
            })
            .execute(&mut conn)
            .expect("insert customer");
        diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: "123",
                name: "Product 1",
                price: "10".to_string(),
            })
            .execute(&mut conn)
            .expect("insert product");
        drop(conn);

        pool
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn make_item(id: &str, price: &str, quantity: i32) -> OrderItem {
        OrderItem::new(id, "Product 1", dec(price), "123", quantity)
    }

    fn stored_order(pool: &DbPool, id: &str) -> (OrderRow, Vec<OrderItemRow>) {
        let mut conn = pool.get().expect("Failed to get connection");
        let order = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .expect("order row");
        let items = order_items::table
            .filter(order_items::order_id.eq(id))
            .select(OrderItemRow::as_select())
            .load(&mut conn)
            .expect("item rows");
        (order, items)
    }

    #[test]
    fn create_writes_order_and_item_rows() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool.clone());
        let order = Order::new("123", "123", vec![make_item("1", "10", 2)]);

        repo.create(&order).expect("create failed");

        let (row, items) = stored_order(&pool, "123");
        assert_eq!(row.customer_id, "123");
        assert_eq!(dec(&row.total), order.total());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "1");
        assert_eq!(items[0].name, "Product 1");
        assert_eq!(dec(&items[0].price), dec("10"));
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].order_id, "123");
        assert_eq!(items[0].product_id, "123");
    }

    #[test]
    fn create_and_find_roundtrip() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool);
        let order = Order::new(
            "123",
            "123",
            vec![make_item("1", "10", 2), make_item("2", "4.25", 3)],
        );

        repo.create(&order).expect("create failed");
        let found = repo.find("123").expect("find failed");

        assert_eq!(found, order);
        assert_eq!(found.total(), dec("32.75"));
    }

    #[test]
    fn create_with_duplicate_id_propagates_store_error() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool);
        let order = Order::new("123", "123", vec![make_item("1", "10", 1)]);

        repo.create(&order).expect("first create failed");
        let again = Order::new("123", "123", vec![make_item("9", "10", 1)]);
        let err = repo.create(&again).expect_err("duplicate id must fail");

        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn create_is_all_or_nothing() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool);
        let bad_item = OrderItem::new("2", "Ghost", dec("1"), "no-such-product", 1);
        let order = Order::new("123", "123", vec![make_item("1", "10", 1), bad_item]);

        let err = repo.create(&order).expect_err("unknown product must fail");
        assert!(matches!(err, DomainError::Internal(_)));

        let lookup = repo.find("123");
        assert!(matches!(lookup, Err(DomainError::NotFound)));
    }

    #[test]
    fn find_unknown_id_is_not_found() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool);

        let err = repo.find("nonexistent-id").expect_err("must fail");

        assert!(matches!(err, DomainError::NotFound));
        assert_eq!(err.to_string(), "Order not found");
    }

    #[test]
    fn find_all_returns_empty_when_no_orders() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool);

        assert!(repo.find_all().expect("find_all failed").is_empty());
    }

    #[test]
    fn find_all_returns_every_order_with_its_items() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool);
        let order_one = Order::new("123", "123", vec![make_item("1", "10", 2)]);
        let order_two = Order::new("321", "123", vec![make_item("2", "10", 2)]);

        repo.create(&order_one).expect("create failed");
        repo.create(&order_two).expect("create failed");

        let all = repo.find_all().expect("find_all failed");

        assert_eq!(all.len(), 2);
        assert!(all.contains(&order_one));
        assert!(all.contains(&order_two));
    }

    #[test]
    fn update_appends_new_items_and_refreshes_total() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool.clone());
        let item_one = make_item("1", "10", 2);
        repo.create(&Order::new("123", "123", vec![item_one.clone()]))
            .expect("create failed");

        let updated = Order::new("123", "123", vec![item_one, make_item("2", "10", 2)]);
        repo.update(&updated).expect("update failed");

        let (row, items) = stored_order(&pool, "123");
        assert_eq!(dec(&row.total), dec("40"));
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.order_id == "123"));
        assert_eq!(repo.find("123").expect("find failed"), updated);
    }

    #[test]
    fn update_leaves_existing_items_untouched() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool.clone());
        repo.create(&Order::new("123", "123", vec![make_item("1", "10", 2)]))
            .expect("create failed");

        let repriced = Order::new("123", "123", vec![make_item("1", "99", 5)]);
        repo.update(&repriced).expect("update failed");

        let (row, items) = stored_order(&pool, "123");
        assert_eq!(items.len(), 1);
        assert_eq!(dec(&items[0].price), dec("10"));
        assert_eq!(items[0].quantity, 2);
        // The order row follows the incoming aggregate.
        assert_eq!(dec(&row.total), repriced.total());
    }

    #[test]
    fn update_keeps_items_missing_from_the_aggregate() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool.clone());
        repo.create(&Order::new(
            "123",
            "123",
            vec![make_item("1", "10", 1), make_item("2", "10", 1)],
        ))
        .expect("create failed");

        repo.update(&Order::new("123", "123", vec![make_item("1", "10", 1)]))
            .expect("update failed");

        let (_, items) = stored_order(&pool, "123");
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn update_is_all_or_nothing() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool.clone());
        repo.create(&Order::new("123", "123", vec![make_item("1", "10", 2)]))
            .expect("create failed");

        let ghost = OrderItem::new("3", "Ghost", dec("1"), "no-such-product", 1);
        let err = repo
            .update(&Order::new(
                "123",
                "123",
                vec![make_item("1", "10", 2), make_item("2", "10", 1), ghost],
            ))
            .expect_err("unknown product must fail");
        assert!(matches!(err, DomainError::Internal(_)));

        let (row, items) = stored_order(&pool, "123");
        assert_eq!(dec(&row.total), dec("20"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "1");
    }

    #[test]
    fn decimals_are_stored_in_plain_notation() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool.clone());
        let order = Order::new("123", "123", vec![make_item("1", "0.0000001", 1)]);

        repo.create(&order).expect("create failed");

        let (row, items) = stored_order(&pool, "123");
        assert_eq!(items[0].price, "0.0000001");
        assert_eq!(row.total, "0.0000001");
        assert_eq!(repo.find("123").expect("find failed"), order);
    }

    #[test]
    fn update_unknown_order_is_a_noop() {
        let pool = setup_db();
        let repo = DieselOrderRepository::new(pool);

        repo.update(&Order::new("999", "123", vec![make_item("1", "10", 1)]))
            .expect("update of unknown order must not fail");

        assert!(matches!(repo.find("999"), Err(DomainError::NotFound)));
        assert!(repo.find_all().expect("find_all failed").is_empty());
    }
}
