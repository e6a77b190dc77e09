use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::core::error::{AppError, Result};
use crate::features::payments::dtos::{
    CreatePaymentDto, PaymentListQuery, PaymentResponseDto, UpdatePaymentDto,
};
use crate::features::payments::models::Payment;
use crate::shared::constants::MAX_IDS_PER_QUERY;

/// Load every payment filed under one of `category_ids`, in insertion order
/// within each category.
///
/// Ids are bound in chunks to stay under SQLite's bound-variable limit. A
/// category's payments always come from a single chunk.
pub(crate) async fn payments_for_categories(
    conn: &mut SqliteConnection,
    category_ids: &[i64],
) -> std::result::Result<Vec<Payment>, sqlx::Error> {
    let mut payments = Vec::new();

    for chunk in category_ids.chunks(MAX_IDS_PER_QUERY) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, name, date, value, is_recurring, category_id FROM payments WHERE category_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id ASC");

        payments.extend(
            builder
                .build_query_as::<Payment>()
                .fetch_all(&mut *conn)
                .await?,
        );
    }

    Ok(payments)
}

fn category_missing(category_id: i64) -> AppError {
    AppError::BadRequest(format!(
        "Category {} not found or does not exist",
        category_id
    ))
}

/// Convert database error to a more specific AppError
fn handle_db_error(e: sqlx::Error, category_id: i64) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return category_missing(category_id);
        }
    }

    tracing::error!("Payment write failed: {:?}", e);
    AppError::Database(e)
}

/// Service for payment operations
///
/// Writes are single statements: the `category_id` foreign key decides
/// whether the category exists, atomically with the write itself.
pub struct PaymentService {
    pool: SqlitePool,
}

impl PaymentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a payment under an existing category
    pub async fn create(&self, dto: CreatePaymentDto) -> Result<PaymentResponseDto> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (name, date, value, is_recurring, category_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, date, value, is_recurring, category_id
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.date)
        .bind(dto.value)
        .bind(dto.is_recurring)
        .bind(dto.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, dto.category_id))?;

        tracing::info!(
            payment_id = payment.id,
            category_id = payment.category_id,
            "Payment created"
        );
        Ok(payment.into())
    }

/// Get payment by ID
    pub async fn get(&self, id: i64) -> Result<PaymentResponseDto> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, name, date, value, is_recurring, category_id
            FROM payments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(PaymentResponseDto::from)
        .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", id)))
    }

    /// List a window of payments, returning it with the total number of payments
    pub async fn list(&self, query: &PaymentListQuery) -> Result<(Vec<PaymentResponseDto>, i64)> {
        // One read transaction so the total matches the page
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
            .fetch_one(&mut *tx)
            .await?;

        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, name, date, value, is_recurring, category_id
            FROM payments
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(query.limit)
        .bind(query.skip)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((payments.into_iter().map(Into::into).collect(), total))
    }

    /// Payments whose name starts with `prefix`, ordered by name
    pub async fn search(&self, prefix: Option<&str>) -> Result<Vec<PaymentResponseDto>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, name, date, value, is_recurring, category_id
            FROM payments
            WHERE ? IS NULL OR substr(name, 1, length(?)) = ?
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(prefix)
        .bind(prefix)
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments.into_iter().map(Into::into).collect())
    }

    /// Payments belonging to any category whose name starts with `prefix`
    ///
    /// Without a prefix every payment is returned. A prefix that matches no
    /// category is reported as not found rather than as an empty result.
    pub async fn search_by_category(
        &self,
        prefix: Option<&str>,
    ) -> Result<Vec<PaymentResponseDto>> {
        let mut tx = self.pool.begin().await?;

        let payments = match prefix {
            Some(prefix) => {
                let matching: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM categories WHERE substr(name, 1, length(?)) = ?",
                )
                .bind(prefix)
                .bind(prefix)
                .fetch_one(&mut *tx)
                .await?;

                if matching == 0 {
                    return Err(AppError::NotFound(format!(
                        "No category found matching '{}'",
                        prefix
                    )));
                }

                sqlx::query_as::<_, Payment>(
                    r#"
                    SELECT id, name, date, value, is_recurring, category_id
                    FROM payments
                    WHERE category_id IN (
                        SELECT id FROM categories
                        WHERE substr(name, 1, length(?)) = ?
                    )
                    ORDER BY name ASC, id ASC
                    "#,
                )
                .bind(prefix)
                .bind(prefix)
                .fetch_all(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Payment>(
                    r#"
                    SELECT id, name, date, value, is_recurring, category_id
                    FROM payments
                    ORDER BY name ASC, id ASC
                    "#,
                )
                .fetch_all(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        Ok(payments.into_iter().map(Into::into).collect())
    }

    /// Replace every field of a payment
    pub async fn update(&self, id: i64, dto: UpdatePaymentDto) -> Result<PaymentResponseDto> {
        // A missing payment matches no row, so the category is only checked
        // for payments that exist
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET name = ?, date = ?, value = ?, is_recurring = ?, category_id = ?
            WHERE id = ?
            RETURNING id, name, date, value, is_recurring, category_id
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.date)
        .bind(dto.value)
        .bind(dto.is_recurring)
        .bind(dto.category_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, dto.category_id))?
        .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", id)))?;

        tracing::debug!(payment_id = id, "Payment updated");
        Ok(payment.into())
    }

    /// Delete a payment
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Payment {} not found or does not exist",
                id
            )));
        }

        tracing::debug!(payment_id = id, "Payment deleted");
        Ok(())
    }
}
