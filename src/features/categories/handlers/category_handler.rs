use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::categories::dtos::{
    CategoryListQuery, CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ApiResponse, Meta, NameSearchQuery};

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Category name already taken")
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(category), None, None)),
    ))
}

/// List categories ordered by name
#[utoipa::path(
    get,
    path = "/api/categories",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<CategoryListQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (categories, total) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Replace a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category name already taken")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Delete a category and all of its payments
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search categories by name prefix
#[utoipa::path(
    get,
    path = "/api/search/categories",
    params(NameSearchQuery),
    responses(
        (status = 200, description = "Matching categories", body = ApiResponse<Vec<CategoryResponseDto>>)
    ),
    tag = "categories"
)]
pub async fn search_categories(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<NameSearchQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories = service.search(query.prefix()).await?;
    Ok(Json(ApiResponse::success(Some(categories), None, None)))
}
