use sqlx::FromRow;

/// Database model for payment
///
/// `date` is stored as given; no calendar validation is performed.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Payment {
    pub id: i64,
    pub name: String,
    pub date: String,
    pub value: f64,
    pub is_recurring: bool,
    pub category_id: i64,
}
