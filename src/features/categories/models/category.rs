use sqlx::FromRow;

/// Database model for category
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}
