use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::payments::models::Payment;
use crate::shared::constants::DEFAULT_PAYMENT_LIMIT;

fn default_limit() -> i64 {
    DEFAULT_PAYMENT_LIMIT
}

/// Query params for listing payments
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentListQuery {
    /// Number of payments to skip (default: 0)
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must not be negative"))]
    #[param(minimum = 0)]
    pub skip: i64,

    /// Maximum number of payments to return (default: 200)
    #[serde(default = "default_limit")]
    #[validate(range(min = 0, message = "limit must not be negative"))]
    #[param(minimum = 0)]
    pub limit: i64,
}

impl Default for PaymentListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAYMENT_LIMIT,
        }
    }
}

/// Request DTO for creating a payment
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentDto {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    /// Free-form date text, stored as given
    pub date: String,

    pub value: f64,

    #[serde(default)]
    pub is_recurring: bool,

    /// Owning category, must already exist
    pub category_id: i64,
}

/// Request DTO for updating a payment
///
/// Every field is replaced; omitted optional fields fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentDto {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    pub date: String,

    pub value: f64,

    #[serde(default)]
    pub is_recurring: bool,

    pub category_id: i64,
}

/// Response DTO for payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponseDto {
    pub id: i64,
    pub name: String,
    pub date: String,
    pub value: f64,
    pub is_recurring: bool,
    pub category_id: i64,
}

impl From<Payment> for PaymentResponseDto {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            name: p.name,
            date: p.date,
            value: p.value,
            is_recurring: p.is_recurring,
            category_id: p.category_id,
        }
    }
}
