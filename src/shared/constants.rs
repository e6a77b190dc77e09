/// Default window size when listing categories
pub const DEFAULT_CATEGORY_LIMIT: i64 = 100;

/// Default window size when listing payments
pub const DEFAULT_PAYMENT_LIMIT: i64 = 200;

/// Ids bound per `IN (...)` query; SQLite caps bound variables per statement
pub const MAX_IDS_PER_QUERY: usize = 500;
