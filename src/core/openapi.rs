use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::payments::{dtos as payments_dtos, handlers as payments_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories
        categories_handlers::create_category,
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        categories_handlers::search_categories,
        // Payments
        payments_handlers::create_payment,
        payments_handlers::list_payments,
        payments_handlers::get_payment,
        payments_handlers::update_payment,
        payments_handlers::delete_payment,
        payments_handlers::search_payments,
        payments_handlers::search_payments_by_category,
    ),
    components(
        schemas(
            Meta,
            // Categories
            categories_dtos::SortDirection,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::CategoryResponseDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            // Payments
            payments_dtos::CreatePaymentDto,
            payments_dtos::UpdatePaymentDto,
            payments_dtos::PaymentResponseDto,
            ApiResponse<payments_dtos::PaymentResponseDto>,
            ApiResponse<Vec<payments_dtos::PaymentResponseDto>>,
        )
    ),
    tags(
        (name = "categories", description = "Expense categories and the payments filed under them"),
        (name = "payments", description = "Individual payments"),
    ),
    info(
        title = "Expense Tracker API",
        version = "0.1.0",
        description = "API documentation for the expense tracker",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
