//! Customer handlers

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::ApiResponse;
use crate::models::customer::CustomerRequest;
use crate::policy;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

/// List all customers
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let customers = state.customer_repository.list_all().await?;
    Ok(Json(ApiResponse::ok(
        "Customers fetched successfully",
        customers,
    )))
}

/// Fetch a single customer
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let customer = state
        .customer_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer not found"))?;

    Ok(Json(ApiResponse::ok("Customer fetched successfully", customer)))
}

/// Create a customer (admin only)
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CustomerRequest>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Customer name cannot be empty"));
    }

    let customer = state.customer_repository.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Customer created successfully", customer)),
    ))
}

/// Replace a customer (admin only)
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerRequest>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if !state.customer_repository.update(id, &payload).await? {
        return Err(ApiError::not_found("Customer not found"));
    }

    let customer = state
        .customer_repository
        .find_by_id(id)
        .await?
        .ok_or(ApiError::Internal)?;

    Ok(Json(ApiResponse::ok("Customer updated successfully", customer)))
}

/// Delete a customer (admin only)
pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    policy::require_admin(current_user.role)?;

    if !state.customer_repository.delete(id).await? {
        return Err(ApiError::not_found("Customer not found"));
    }

    Ok(Json(ApiResponse::<()>::message_only(
        "Customer deleted successfully",
    )))
}
