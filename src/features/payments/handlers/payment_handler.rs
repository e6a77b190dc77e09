use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::payments::dtos::{
    CreatePaymentDto, PaymentListQuery, PaymentResponseDto, UpdatePaymentDto,
};
use crate::features::payments::services::PaymentService;
use crate::shared::types::{ApiResponse, Meta, NameSearchQuery};

/// Create a payment
#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = CreatePaymentDto,
    responses(
        (status = 201, description = "Payment created", body = ApiResponse<PaymentResponseDto>),
        (status = 400, description = "Validation error or unknown category")
    ),
    tag = "payments"
)]
pub async fn create_payment(
    State(service): State<Arc<PaymentService>>,
    AppJson(dto): AppJson<CreatePaymentDto>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let payment = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(payment), None, None)),
    ))
}

/// List payments
#[utoipa::path(
    get,
    path = "/api/payments",
    params(PaymentListQuery),
    responses(
        (status = 200, description = "List of payments", body = ApiResponse<Vec<PaymentResponseDto>>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "payments"
)]
pub async fn list_payments(
    State(service): State<Arc<PaymentService>>,
    AppQuery(query): AppQuery<PaymentListQuery>,
) -> Result<Json<ApiResponse<Vec<PaymentResponseDto>>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (payments, total) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(payments),
        None,
        Some(Meta { total }),
    )))
}

/// Get payment by ID
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    params(
        ("id" = i64, Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "Payment found", body = ApiResponse<PaymentResponseDto>),
        (status = 404, description = "Payment not found")
    ),
    tag = "payments"
)]
pub async fn get_payment(
    State(service): State<Arc<PaymentService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<PaymentResponseDto>>> {
    let payment = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(payment), None, None)))
}

/// Replace a payment
#[utoipa::path(
    put,
    path = "/api/payments/{id}",
    params(
        ("id" = i64, Path, description = "Payment ID")
    ),
    request_body = UpdatePaymentDto,
    responses(
        (status = 200, description = "Payment updated", body = ApiResponse<PaymentResponseDto>),
        (status = 400, description = "Validation error or unknown category"),
        (status = 404, description = "Payment not found")
    ),
    tag = "payments"
)]
pub async fn update_payment(
    State(service): State<Arc<PaymentService>>,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdatePaymentDto>,
) -> Result<Json<ApiResponse<PaymentResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let payment = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(payment), None, None)))
}

/// Delete a payment
#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    params(
        ("id" = i64, Path, description = "Payment ID")
    ),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 404, description = "Payment not found")
    ),
    tag = "payments"
)]
pub async fn delete_payment(
    State(service): State<Arc<PaymentService>>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search payments by name prefix
#[utoipa::path(
    get,
    path = "/api/search/payments",
    params(NameSearchQuery),
    responses(
        (status = 200, description = "Matching payments", body = ApiResponse<Vec<PaymentResponseDto>>)
    ),
    tag = "payments"
)]
pub async fn search_payments(
    State(service): State<Arc<PaymentService>>,
    AppQuery(query): AppQuery<NameSearchQuery>,
) -> Result<Json<ApiResponse<Vec<PaymentResponseDto>>>> {
    let payments = service.search(query.prefix()).await?;
    Ok(Json(ApiResponse::success(Some(payments), None, None)))
}

/// Search payments by the name prefix of their category
#[utoipa::path(
    get,
    path = "/api/search/payments-by-category",
    params(NameSearchQuery),
    responses(
        (status = 200, description = "Payments in matching categories", body = ApiResponse<Vec<PaymentResponseDto>>),
        (status = 404, description = "No category matches the prefix")
    ),
    tag = "payments"
)]
pub async fn search_payments_by_category(
    State(service): State<Arc<PaymentService>>,
    AppQuery(query): AppQuery<NameSearchQuery>,
) -> Result<Json<ApiResponse<Vec<PaymentResponseDto>>>> {
    let payments = service.search_by_category(query.prefix()).await?;
    Ok(Json(ApiResponse::success(Some(payments), None, None)))
}
