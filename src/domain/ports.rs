use super::errors::DomainError;
use super::order::Order;

pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, order: &Order) -> Result<(), DomainError>;
    /// Fails with [`DomainError::NotFound`] when no order has this id.
    fn find(&self, id: &str) -> Result<Order, DomainError>;
    fn find_all(&self) -> Result<Vec<Order>, DomainError>;
    /// Appends items not yet persisted and refreshes the order row.
    /// Existing item rows are never modified; an unknown order id is a no-op.
    fn update(&self, order: &Order) -> Result<(), DomainError>;
}
