//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use shared::ErrorResponse;

use crate::domain::{FinanceError, ValidationError};

/// A domain error on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub FinanceError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            FinanceError::Validation(_) => StatusCode::BAD_REQUEST,
            FinanceError::NotFound { .. } => StatusCode::NOT_FOUND,
            FinanceError::ConfirmationRequired => StatusCode::CONFLICT,
            FinanceError::Import(_) => StatusCode::UNPROCESSABLE_ENTITY,
            FinanceError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FinanceError> for ApiError {
    fn from(e: FinanceError) -> Self {
        ApiError(e)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImportError, RecordKind};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (FinanceError::from(ValidationError::NegativeSalary), StatusCode::BAD_REQUEST),
            (FinanceError::not_found(RecordKind::Goal, "g"), StatusCode::NOT_FOUND),
            (FinanceError::ConfirmationRequired, StatusCode::CONFLICT),
            (FinanceError::from(ImportError::MissingData), StatusCode::UNPROCESSABLE_ENTITY),
            (
                FinanceError::Persistence(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError(error).status(), status);
        }
    }
}
