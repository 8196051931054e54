use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::order::{Order, OrderItem};
use crate::errors::AppError;
use crate::infrastructure::order_repo::DieselOrderRepository;

pub type Orders = OrderService<DieselOrderRepository>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    /// Generated when omitted on create. Required on update.
    pub id: Option<String>,
    pub name: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub id: Option<String>,
    pub customer_id: String,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub customer_id: String,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: String,
    pub name: String,
    pub price: String,
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub total: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id().to_string(),
            customer_id: order.customer_id().to_string(),
            total: order.total().to_plain_string(),
            items: order
                .items()
                .iter()
                .map(|i| OrderItemResponse {
                    id: i.id.clone(),
                    name: i.name.clone(),
                    price: i.price.to_plain_string(),
                    product_id: i.product_id.clone(),
                    quantity: i.quantity,
                })
                .collect(),
        }
    }
}

/// Prices may carry at most this many decimal places.
const MAX_PRICE_SCALE: i64 = 18;
/// Upper bound on significant digits of a price.
const MAX_PRICE_DIGITS: u64 = 38;

fn to_item(req: OrderItemRequest, id_required: bool) -> Result<OrderItem, AppError> {
    let price = BigDecimal::from_str(&req.price)
        .map_err(|e| AppError::BadRequest(format!("Invalid price '{}': {}", req.price, e)))?;
    // Unbounded exponents make totals arbitrarily expensive to compute.
    let (_, scale) = price.as_bigint_and_exponent();
    if !(0..=MAX_PRICE_SCALE).contains(&scale) || price.digits() > MAX_PRICE_DIGITS {
        return Err(AppError::BadRequest(format!(
            "Price '{}' is out of range",
            req.price
        )));
    }
    if req.quantity <= 0 {
        return Err(AppError::BadRequest(format!(
            "Quantity must be positive, got {}",
            req.quantity
        )));
    }
    let id = match req.id {
        Some(id) => id,
        None if id_required => {
            return Err(AppError::BadRequest("Item id is required".to_string()))
        }
        None => Uuid::new_v4().to_string(),
    };
    Ok(OrderItem::new(id, req.name, price, req.product_id, req.quantity))
}

fn to_items(items: Vec<OrderItemRequest>, id_required: bool) -> Result<Vec<OrderItem>, AppError> {
    items
        .into_iter()
        .map(|i| to_item(i, id_required))
        .collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Persists a new order together with its items in one transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderResponse),
        (status = 400, description = "Malformed item"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<Orders>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let id = body.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let order = Order::new(id, body.customer_id, to_items(body.items, false)?);

    let order = web::block(move || service.place_order(&order).map(|()| order))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "id": order.id() })))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = String, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<Orders>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.get_order(&order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Returns every order with its items. No pagination.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders", body = Vec<OrderResponse>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(service: web::Data<Orders>) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || service.list_orders())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /orders/{id}
///
/// Adds items that are not stored yet and refreshes the customer and total.
/// Stored items are never modified, and an unknown order id is ignored.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(
        ("id" = String, Path, description = "Order id"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 204, description = "Update applied (or order unknown)"),
        (status = 400, description = "Malformed item"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<Orders>,
    path: web::Path<String>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let order = Order::new(
        path.into_inner(),
        body.customer_id,
        to_items(body.items, true)?,
    );

    web::block(move || service.amend_order(&order))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// Register the `/orders` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(list_orders))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}", web::put().to(update_order)),
    );
}
