use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::categories::models::Category;
use crate::features::payments::dtos::PaymentResponseDto;
use crate::shared::constants::DEFAULT_CATEGORY_LIMIT;

fn default_limit() -> i64 {
    DEFAULT_CATEGORY_LIMIT
}

/// Sort direction for category names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Query params for listing categories
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    /// Number of categories to skip (default: 0)
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must not be negative"))]
    #[param(minimum = 0)]
    pub skip: i64,

    /// Maximum number of categories to return (default: 100)
    #[serde(default = "default_limit")]
    #[validate(range(min = 0, message = "limit must not be negative"))]
    #[param(minimum = 0)]
    pub limit: i64,

    /// Name ordering (default: asc)
    #[serde(default)]
    pub order: SortDirection,
}

impl Default for CategoryListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_CATEGORY_LIMIT,
            order: SortDirection::Asc,
        }
    }
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    /// Unique category name
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    pub description: Option<String>,

    /// Display hint, not validated
    pub color: Option<String>,
}

/// Request DTO for updating a category (full replacement)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    pub description: Option<String>,

    pub color: Option<String>,
}

/// Response DTO for category, including the payments filed under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    /// Payments in insertion order
    pub payments: Vec<PaymentResponseDto>,
}

impl CategoryResponseDto {
    pub fn new(category: Category, payments: Vec<PaymentResponseDto>) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            color: category.color,
            payments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_may_be_omitted() {
        let dto: CreateCategoryDto =
            serde_json::from_value(serde_json::json!({ "name": "Food" })).unwrap();

        assert_eq!(dto.name, "Food");
        assert_eq!(dto.description, None);
        assert_eq!(dto.color, None);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let dto = UpdateCategoryDto {
            name: String::new(),
            description: None,
            color: Some("#ff0000".to_string()),
        };

        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: CategoryListQuery = serde_json::from_value(serde_json::json!({})).unwrap();

        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, DEFAULT_CATEGORY_LIMIT);
        assert_eq!(query.order, SortDirection::Asc);
    }
}
