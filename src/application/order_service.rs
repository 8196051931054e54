use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::OrderRepository;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn place_order(&self, order: &Order) -> Result<(), DomainError> {
        self.repo.create(order)
    }

    pub fn get_order(&self, id: &str) -> Result<Order, DomainError> {
        self.repo.find(id)
    }

    pub fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.repo.find_all()
    }

    pub fn amend_order(&self, order: &Order) -> Result<(), DomainError> {
        self.repo.update(order)
    }
}
