use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::orders::{
        OrderLineRequest, OrderList, OrderWithItems, PlaceOrderRequest, UpdateOrderStatusRequest,
    },
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
        sea_orm_active_enums::{OrderStatus, Role},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure_capability},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    rules::eligibility::{OrderTerms, check_order_quantity},
    state::AppState,
};

/// Places a single-producer order. Every line must pass the eligibility
/// rules; unit prices are copied from the products as they are now.
/// Stock is left untouched.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_capability(user, Capability::PlaceOrders)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let lines_by_product = merge_lines(&payload.items);
    let ids: Vec<Uuid> = lines_by_product.iter().map(|(id, _)| *id).collect();
    let products: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut producer_id: Option<Uuid> = None;
    let mut currency: Option<String> = None;
    let mut total_amount = Decimal::ZERO;
    let mut lines = Vec::with_capacity(lines_by_product.len());

    for &(product_id, quantity) in &lines_by_product {
        let product = match products.get(&product_id) {
            Some(p) => p,
            None => {
                return Err(AppError::BadRequest(format!(
                    "Product {} not found",
                    product_id
                )));
            }
        };

        match producer_id {
            Some(id) if id != product.producer_id => {
                return Err(AppError::BadRequest(
                    "All items must come from the same producer".into(),
                ));
            }
            _ => producer_id = Some(product.producer_id),
        }
        match currency.as_deref() {
            Some(c) if c != product.currency => {
                return Err(AppError::BadRequest(
                    "All items must share one currency".into(),
                ));
            }
            _ => currency = Some(product.currency.clone()),
        }

        check_order_quantity(&OrderTerms::from(product), quantity)
            .map_err(|reason| AppError::BadRequest(format!("{}: {}", product.name, reason)))?;

        let line_total = product.price * Decimal::from(quantity);
        total_amount += line_total;
        lines.push((product.id, quantity, product.price, line_total));
    }

    let (producer_id, currency) = match (producer_id, currency) {
        (Some(p), Some(c)) => (p, c),
        _ => return Err(AppError::BadRequest("Order has no items".into())),
    };

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        consumer_id: Set(user.user_id),
        producer_id: Set(producer_id),
        total_amount: Set(total_amount),
        currency: Set(currency),
        status: Set(OrderStatus::Pending),
        shipping_address: Set(payload.shipping_address),
        notes: Set(payload.notes),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (position, (product_id, quantity, unit_price, total_price)) in lines.into_iter().enumerate()
    {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product_id),
            position: Set(position as i32),
            quantity: Set(quantity),
            unit_price: Set(unit_price),
            total_price: Set(total_price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from(item));
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        consumer_id = %order.consumer_id,
        producer_id = %order.producer_id,
        total = %order.total_amount,
        "order placed"
    );

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Orders the caller bought or sold; admins see every order.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = visible_to(user);
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let finder = Orders::find().filter(condition);
    let finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    }
    .order_by_asc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(visible_to(user).add(OrderCol::Id.eq(id)))
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let data = with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

/// Only the order's producer or an admin may move it along the status flow.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if user.role != Role::Admin && order.producer_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let from = order.status;
    let to = payload.status;
    if from.is_terminal() {
        return Err(AppError::BadRequest(format!(
            "Order is already {}",
            from.as_str()
        )));
    }
    if !from.can_transition_to(to) {
        return Err(AppError::BadRequest(format!(
            "Cannot change order status from {} to {}",
            from.as_str(),
            to.as_str()
        )));
    }

    let mut active: OrderActive = order.into();
    active.status = Set(to);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    let data = with_items(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %id,
        from = from.as_str(),
        to = to.as_str(),
        "order status changed"
    );

    Ok(ApiResponse::success(
        "Order status updated",
        data,
        Some(Meta::empty()),
    ))
}

/// Sums quantities of repeated products so each product is checked once
/// against its limits. Keeps the first-seen order.
fn merge_lines(items: &[OrderLineRequest]) -> Vec<(Uuid, i32)> {
    let mut merged: Vec<(Uuid, i32)> = Vec::with_capacity(items.len());
    for line in items {
        match merged.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, quantity)) => *quantity = quantity.saturating_add(line.quantity),
            None => merged.push((line.product_id, line.quantity)),
        }
    }
    merged
}

fn visible_to(user: &AuthUser) -> Condition {
    if user.role == Role::Admin {
        return Condition::all();
    }
    Condition::all().add(
        Condition::any()
            .add(OrderCol::ConsumerId.eq(user.user_id))
            .add(OrderCol::ProducerId.eq(user.user_id)),
    )
}

async fn with_items<C>(conn: &C, order: OrderModel) -> AppResult<OrderWithItems>
where
    C: sea_orm::ConnectionTrait,
{
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Position)
        .all(conn)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(OrderWithItems {
        order: Order::from(order),
        items,
    })
}
