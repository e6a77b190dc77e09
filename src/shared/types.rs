use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

/// Query params shared by the prefix search endpoints
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameSearchQuery {
    /// Name prefix (case-sensitive). Absent or empty matches everything.
    pub name: Option<String>,
}

impl NameSearchQuery {
    pub fn prefix(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_means_no_prefix() {
        let query = NameSearchQuery {
            name: Some(String::new()),
        };
        assert_eq!(query.prefix(), None);
        assert_eq!(NameSearchQuery::default().prefix(), None);

        let query = NameSearchQuery {
            name: Some("Fo".to_string()),
        };
        assert_eq!(query.prefix(), Some("Fo"));
    }
}
