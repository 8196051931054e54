use bigdecimal::BigDecimal;

/// A line of an order: a snapshot of the product at the time it was ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub price: BigDecimal,
    pub product_id: String,
    pub quantity: i32,
}

impl OrderItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: BigDecimal,
        product_id: impl Into<String>,
        quantity: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            product_id: product_id.into(),
            quantity,
        }
    }

    pub fn order_item_total(&self) -> BigDecimal {
        &self.price * BigDecimal::from(self.quantity)
    }
}

/// Order aggregate root. The total is always derived from the items.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: String,
    customer_id: String,
    items: Vec<OrderItem>,
}

impl Order {
    pub fn new(id: impl Into<String>, customer_id: impl Into<String>, items: Vec<OrderItem>) -> Self {
        Self {
            id: id.into(),
            customer_id: customer_id.into(),
            items,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total(&self) -> BigDecimal {
        self.items
            .iter()
            .map(OrderItem::order_item_total)
            .fold(BigDecimal::from(0), |acc, t| acc + t)
    }
}
