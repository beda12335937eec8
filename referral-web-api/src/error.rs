use crate::dto::ErrorBody;
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use thiserror::Error;
use tracing::error;

pub const OPAQUE_ERROR: &str = "Internal server error";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Unauthenticated(_) => Status::Unauthorized,
            ApiError::Forbidden(_) => Status::Forbidden,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::InvalidInput(_) | ApiError::Conflict(_) => Status::BadRequest,
            ApiError::MethodNotAllowed(_) => Status::MethodNotAllowed,
            ApiError::Upstream(_) => Status::InternalServerError,
        }
    }

    /// Text safe to hand back to the client. Upstream details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Upstream(_) => OPAQUE_ERROR.to_owned(),
            other => other.to_string(),
        }
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(error: sea_orm::DbErr) -> Self {
        ApiError::Upstream(format!("Database error: {}", error))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::Upstream(format!("Email provider error: {}", error))
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        if let ApiError::Upstream(detail) = &self {
            error!("{} {} failed: {}", request.method(), request.uri(), detail);
        }
        let body = ErrorBody {
            error: self.client_message(),
        };
        (self.status(), Json(body)).respond_to(request)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_are_reported_as_bad_request() {
        let error = ApiError::Conflict("Request already processed".to_owned());
        assert_eq!(error.status(), Status::BadRequest);
        assert_eq!(error.client_message(), "Request already processed");
    }

    #[test]
    fn upstream_detail_is_not_leaked() {
        let error = ApiError::from(sea_orm::DbErr::Custom("relation users missing".to_owned()));
        assert_eq!(error.status(), Status::InternalServerError);
        assert_eq!(error.client_message(), OPAQUE_ERROR);
        assert!(error.to_string().contains("relation users missing"));
    }

    #[test]
    fn auth_failures_map_to_their_status() {
        assert_eq!(
            ApiError::Unauthenticated("Missing bearer token".to_owned()).status(),
            Status::Unauthorized
        );
        assert_eq!(
            ApiError::Forbidden("Admin access required".to_owned()).status(),
            Status::Forbidden
        );
        assert_eq!(
            ApiError::NotFound("User not found".to_owned()).status(),
            Status::NotFound
        );
    }
}
