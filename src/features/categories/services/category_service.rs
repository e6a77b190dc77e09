use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryListQuery, CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::Category;
use crate::features::payments::dtos::PaymentResponseDto;
use crate::features::payments::services::payments_for_categories;

/// Pair each category with its payments, keeping the category order.
async fn with_payments(
    conn: &mut SqliteConnection,
    categories: Vec<Category>,
) -> std::result::Result<Vec<CategoryResponseDto>, sqlx::Error> {
    let ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
    let payments = payments_for_categories(conn, &ids).await?;

    let mut by_category: HashMap<i64, Vec<PaymentResponseDto>> = HashMap::new();
    for payment in payments {
        by_category
            .entry(payment.category_id)
            .or_default()
            .push(payment.into());
    }

    Ok(categories
        .into_iter()
        .map(|category| {
            let payments = by_category.remove(&category.id).unwrap_or_default();
            CategoryResponseDto::new(category, payments)
        })
        .collect())
}

fn single(mut categories: Vec<CategoryResponseDto>, id: i64) -> Result<CategoryResponseDto> {
    categories.pop().ok_or_else(|| {
        AppError::Internal(format!("Category {} vanished while loading payments", id))
    })
}

fn category_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Category {} not found", id))
}

/// Convert database error to more specific AppError with user-friendly messages
fn handle_db_error(e: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(format!(
                "A category named '{}' already exists. Please use a different name.",
                name
            ));
        }
    }

    tracing::error!("Category write failed: {:?}", e);
    AppError::Database(e)
}

/// Service for category operations
pub struct CategoryService {
    pool: SqlitePool,
}

impl CategoryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new category
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, color)
            VALUES (?, ?, ?)
            RETURNING id, name, description, color
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, &dto.name))?;

        tracing::info!(category_id = category.id, name = %category.name, "Category created");
        Ok(CategoryResponseDto::new(category, Vec::new()))
    }

    /// Get category by ID, with its payments
    pub async fn get(&self, id: i64) -> Result<CategoryResponseDto> {
        let mut conn = self.pool.acquire().await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, color
            FROM categories
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| category_not_found(id))?;

        let categories = with_payments(&mut conn, vec![category]).await?;
        single(categories, id)
    }

    /// List a window of categories ordered by name, returning it with the
    /// total number of categories
    pub async fn list(
        &self,
        query: &CategoryListQuery,
    ) -> Result<(Vec<CategoryResponseDto>, i64)> {
        // One read transaction so the total matches the page
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&mut *tx)
            .await?;

        let sql = format!(
            r#"
            SELECT id, name, description, color
            FROM categories
            ORDER BY name {}
            LIMIT ? OFFSET ?
            "#,
            query.order.as_sql()
        );

        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(query.limit)
            .bind(query.skip)
            .fetch_all(&mut *tx)
            .await?;

        let categories = with_payments(&mut tx, categories).await?;
        tx.commit().await?;

        Ok((categories, total))
    }

    /// Categories whose name starts with `prefix`, ordered by name
    pub async fn search(&self, prefix: Option<&str>) -> Result<Vec<CategoryResponseDto>> {
        let mut conn = self.pool.acquire().await?;

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, color
            FROM categories
            WHERE ? IS NULL OR substr(name, 1, length(?)) = ?
            ORDER BY name ASC
            "#,
        )
        .bind(prefix)
        .bind(prefix)
        .bind(prefix)
        .fetch_all(&mut *conn)
        .await?;

        Ok(with_payments(&mut conn, categories).await?)
    }

    /// Replace every mutable field of a category
    pub async fn update(&self, id: i64, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let mut tx = self.pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = ?, description = ?, color = ?
            WHERE id = ?
            RETURNING id, name, description, color
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.color)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| handle_db_error(e, &dto.name))?
        .ok_or_else(|| category_not_found(id))?;

        let categories = with_payments(&mut tx, vec![category]).await?;
        tx.commit().await?;

        tracing::debug!(category_id = id, "Category updated");
        single(categories, id)
    }

    /// Delete a category together with all of its payments
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let payments = sqlx::query("DELETE FROM payments WHERE category_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // Dropping the transaction rolls back the payment delete
        if result.rows_affected() == 0 {
            return Err(category_not_found(id));
        }

        tx.commit().await?;

        tracing::info!(
            category_id = id,
            payments_deleted = payments.rows_affected(),
            "Category deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::dtos::SortDirection;
    use crate::features::payments::dtos::CreatePaymentDto;
    use crate::features::payments::PaymentService;
    use crate::shared::test_helpers::{create_file_test_pool, create_test_pool};
    use fake::{faker::lorem::en::Sentence, Fake};
    use std::sync::Arc;
    use tokio::task::JoinSet;

    fn new_category(name: &str) -> CreateCategoryDto {
        CreateCategoryDto {
            name: name.to_string(),
            description: None,
            color: None,
        }
    }

    fn new_payment(name: &str, category_id: i64) -> CreatePaymentDto {
        CreatePaymentDto {
            name: name.to_string(),
            date: "2024-01-01".to_string(),
            value: 12.5,
            is_recurring: false,
            category_id,
        }
    }

    async fn services() -> (CategoryService, PaymentService) {
        let pool = create_test_pool().await;
        (CategoryService::new(pool.clone()), PaymentService::new(pool))
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_category() {
        let (categories, _) = services().await;
        let description: String = Sentence(3..6).fake();

        let created = categories
            .create(CreateCategoryDto {
                name: "Food".to_string(),
                description: Some(description.clone()),
                color: Some("#00ff00".to_string()),
            })
            .await
            .unwrap();

        let fetched = categories.get(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.description, Some(description));
        assert!(fetched.payments.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_category_is_not_found() {
        let (categories, _) = services().await;

        let result = categories.get(42).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let (categories, _) = services().await;
        categories.create(new_category("Food")).await.unwrap();

        let result = categories.create(new_category("Food")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_names_are_case_sensitive() {
        let (categories, _) = services().await;
        categories.create(new_category("Food")).await.unwrap();

        let result = categories.create(new_category("food")).await;

        assert!(result.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_creates_allow_one() {
        let db = create_file_test_pool(8).await;
        let categories = Arc::new(CategoryService::new(db.pool.clone()));

        let mut tasks = JoinSet::new();
        for _ in 0..16 {
            let categories = Arc::clone(&categories);
            tasks.spawn(async move { categories.create(new_category("Rent")).await });
        }

        let mut created = 0;
        let mut conflicts = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(_) => created += 1,
                Err(AppError::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {:?}", e),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(categories.search(Some("Rent")).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_distinct_creates_all_succeed() {
        let db = create_file_test_pool(8).await;
        let categories = Arc::new(CategoryService::new(db.pool.clone()));

        let mut tasks = JoinSet::new();
        for i in 0..50 {
            let categories = Arc::clone(&categories);
            tasks.spawn(async move {
                categories
                    .create(new_category(&format!("Category {:02}", i)))
                    .await
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let (_, total) = categories
            .list(&CategoryListQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 50);
    }

    #[tokio::test]
    async fn test_search_handles_more_categories_than_bind_limit() {
        let (categories, payments) = services().await;
        sqlx::query(
            r#"
            WITH RECURSIVE seq(n) AS (
                SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < 33000
            )
            INSERT INTO categories (name) SELECT printf('c%05d', n) FROM seq
            "#,
        )
        .execute(&categories.pool)
        .await
        .unwrap();
        let last = categories.search(Some("c33000")).await.unwrap();
        let lunch = payments
            .create(new_payment("Lunch", last[0].id))
            .await
            .unwrap();

        let all = categories.search(None).await.unwrap();

        assert_eq!(all.len(), 33000);
        let last = all.last().unwrap();
        assert_eq!(last.name, "c33000");
        assert_eq!(last.payments.len(), 1);
        assert_eq!(last.payments[0].id, lunch.id);

        let found = payments.search_by_category(Some("c")).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_get_includes_payments_in_insertion_order() {
        let (categories, payments) = services().await;
        let food = categories.create(new_category("Food")).await.unwrap();
        let first = payments.create(new_payment("Lunch", food.id)).await.unwrap();
        let second = payments
            .create(new_payment("Breakfast", food.id))
            .await
            .unwrap();

        let fetched = categories.get(food.id).await.unwrap();

        let ids: Vec<i64> = fetched.payments.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_list_orders_by_name_within_window() {
        let (categories, _) = services().await;
        for name in ["Travel", "Food", "Rent", "Bills"] {
            categories.create(new_category(name)).await.unwrap();
        }

        let (all, total) = categories.list(&CategoryListQuery::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bills", "Food", "Rent", "Travel"]);
        assert_eq!(total, 4);

        let window = CategoryListQuery {
            skip: 1,
            limit: 2,
            order: SortDirection::Asc,
        };
        let (page, total) = categories.list(&window).await.unwrap();
        let names: Vec<&str> = page.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Rent"]);
        assert_eq!(total, 4);
    }

    #[tokio::test]
    async fn test_list_descending() {
        let (categories, _) = services().await;
        for name in ["Food", "Bills"] {
            categories.create(new_category(name)).await.unwrap();
        }

        let query = CategoryListQuery {
            order: SortDirection::Desc,
            ..Default::default()
        };
        let (all, _) = categories.list(&query).await.unwrap();

        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Bills"]);
    }

    #[tokio::test]
    async fn test_search_matches_prefix_only() {
        let (categories, _) = services().await;
        for name in ["Food", "Fuel", "Fitness", "Seafood", "fun"] {
            categories.create(new_category(name)).await.unwrap();
        }

        let found = categories.search(Some("F")).await.unwrap();
        let names: Vec<&str> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Fitness", "Food", "Fuel"]);

        let found = categories.search(Some("Foo")).await.unwrap();
        let names: Vec<&str> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food"]);

        assert!(categories.search(Some("Zzz")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_without_prefix_returns_all_sorted() {
        let (categories, _) = services().await;
        for name in ["Rent", "Food"] {
            categories.create(new_category(name)).await.unwrap();
        }

        let found = categories.search(None).await.unwrap();

        let names: Vec<&str> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Rent"]);
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let (categories, _) = services().await;
        let created = categories
            .create(CreateCategoryDto {
                name: "Food".to_string(),
                description: Some("Groceries".to_string()),
                color: Some("red".to_string()),
            })
            .await
            .unwrap();

        let updated = categories
            .update(
                created.id,
                UpdateCategoryDto {
                    name: "Eating out".to_string(),
                    description: None,
                    color: Some("blue".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Eating out");
        assert_eq!(updated.description, None);
        assert_eq!(updated.color, Some("blue".to_string()));
        assert_eq!(categories.get(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_keeping_own_name_is_allowed() {
        let (categories, _) = services().await;
        let created = categories.create(new_category("Food")).await.unwrap();

        let updated = categories
            .update(
                created.id,
                UpdateCategoryDto {
                    name: "Food".to_string(),
                    description: Some("Still food".to_string()),
                    color: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.description, Some("Still food".to_string()));
    }

    #[tokio::test]
    async fn test_update_to_taken_name_is_conflict() {
        let (categories, _) = services().await;
        categories.create(new_category("Food")).await.unwrap();
        let rent = categories.create(new_category("Rent")).await.unwrap();

        let result = categories
            .update(
                rent.id,
                UpdateCategoryDto {
                    name: "Food".to_string(),
                    description: None,
                    color: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(categories.get(rent.id).await.unwrap().name, "Rent");
    }

    #[tokio::test]
    async fn test_update_missing_category_is_not_found() {
        let (categories, _) = services().await;

        let result = categories
            .update(
                7,
                UpdateCategoryDto {
                    name: "Food".to_string(),
                    description: None,
                    color: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_payments() {
        let (categories, payments) = services().await;
        let food = categories.create(new_category("Food")).await.unwrap();
        let rent = categories.create(new_category("Rent")).await.unwrap();
        let lunch = payments.create(new_payment("Lunch", food.id)).await.unwrap();
        let dinner = payments.create(new_payment("Dinner", food.id)).await.unwrap();
        let march = payments.create(new_payment("March", rent.id)).await.unwrap();

        categories.delete(food.id).await.unwrap();

        assert!(matches!(
            categories.get(food.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            payments.get(lunch.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            payments.get(dinner.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(payments.get(march.id).await.unwrap(), march);
    }

    #[tokio::test]
    async fn test_delete_missing_category_is_not_found() {
        let (categories, _) = services().await;

        let result = categories.delete(99).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
