use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not signed in. Please log in and try again.")]
    Unauthorized,

    #[error("Failed to load course materials: {0}")]
    Materials(String),

    #[error("API error: {0}")]
    Api(String),
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Unauthorized => AppError::Unauthorized,
            other => AppError::Api(other.to_string()),
        }
    }
}

impl AppError {
    /// Same mapping as `From<ApiError>`, reported as a materials failure.
    pub fn materials(e: ApiError) -> Self {
        match AppError::from(e) {
            AppError::Api(detail) => AppError::Materials(detail),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_error() {
        assert!(matches!(AppError::from(ApiError::Unauthorized), AppError::Unauthorized));
        assert!(matches!(
            AppError::from(ApiError::InvalidResponse("bad json".to_string())),
            AppError::Api(_)
        ));
    }

    #[test]
    fn test_materials_keeps_unauthorized() {
        assert!(matches!(AppError::materials(ApiError::Unauthorized), AppError::Unauthorized));
        let err = AppError::materials(ApiError::ApiError("500".to_string()));
        assert!(matches!(&err, AppError::Materials(detail) if detail.contains("500")));
    }
}
