use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use judging::{RankingError, StoreError};
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    Ranking(RankingError),
    BadRequest(String),
    Unauthorized,
    InternalServerError(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::Ranking(e) => write!(f, "Ranking rejected: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::InternalServerError(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Ranking(RankingError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Ranking(RankingError::OrderViolation { .. })
            | Self::Ranking(RankingError::Disqualified(_)) => StatusCode::CONFLICT,
            Self::Ranking(RankingError::Incomplete { .. }) => StatusCode::BAD_REQUEST,
            Self::Ranking(RankingError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(StorageError::NotFound) => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(StorageError::ConstraintViolation(msg)) => {
                json!({
                    "error": msg
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::Ranking(RankingError::Store(e)) => {
                tracing::error!("Ranking store error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Ranking(e) => {
                json!({
                    "error": e.to_string()
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
            Self::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                json!({
                    "error": "An internal error occurred"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

impl From<RankingError> for WebError {
    fn from(error: RankingError) -> Self {
        match error {
            RankingError::Store(StoreError::Storage(e)) => Self::Storage(e),
            other => Self::Ranking(other),
        }
    }
}

pub type ApiResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use judging::{RankSlot, Rating};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_storage_errors_map_to_status() {
        assert_eq!(
            WebError::from(StorageError::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebError::from(StorageError::ConstraintViolation("taken".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(WebError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_ranking_errors_map_to_status() {
        let violation = RankingError::OrderViolation {
            higher: RankSlot::First,
            higher_rating: Rating::new(5).unwrap(),
            lower: RankSlot::Second,
            lower_rating: Rating::new(9).unwrap(),
        };
        assert_eq!(WebError::from(violation).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            WebError::from(RankingError::NotFound(Uuid::new_v4())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebError::from(RankingError::Incomplete { filled: 2 }).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_failure_unwraps_storage_error() {
        let error = RankingError::Store(StoreError::Storage(StorageError::NotFound));
        assert!(matches!(
            WebError::from(error),
            WebError::Storage(StorageError::NotFound)
        ));

        let rejected = RankingError::Store(StoreError::Rejected("busy".into()));
        assert_eq!(
            WebError::from(rejected).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
