use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Database Error: {0}")]
    DatabaseError(#[from] DbError),

    #[error("Blocking Error: {0}")]
    BlockingError(String),

    #[error("Hashing Error: {0}")]
    HashingError(String),

    #[error("File Storage Error: {0}")]
    FileStorageError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Conflict Error: {0}")]
    ConflictError(String),

    #[error("Not Found: {0}")]
    NotFoundError(String),

    #[error("Authentication Error: {0}")]
    AuthenticationError(#[from] AuthError),
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection Error: {0}")]
    ConnectionError(String),

    #[error("Query Error: {0}")]
    QueryError(String),

    #[error("Insertion Error: {0}")]
    InsertionError(String),

    #[error("Updation Error: {0}")]
    UpdationError(String),

    #[error("Other Database Error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    // No bearer token on a protected route.
    #[error("Missing Token: {0}")]
    MissingToken(String),

    // Signature or expiry failed verification.
    #[error("Invalid Token: {0}")]
    InvalidToken(String),

    #[error("Invalid Credentials: {0}")]
    InvalidCredentials(String),

    #[error("Account Disabled: {0}")]
    AccountDisabled(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl CustomError {
    fn status(&self) -> StatusCode {
        match self {
            CustomError::ValidationError(_) => StatusCode::BAD_REQUEST,
            CustomError::ConflictError(_) => StatusCode::BAD_REQUEST,
            CustomError::NotFoundError(_) => StatusCode::NOT_FOUND,
            CustomError::AuthenticationError(err) => match err {
                AuthError::MissingToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken(_) => StatusCode::FORBIDDEN,
                AuthError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
                AuthError::AccountDisabled(_) => StatusCode::UNAUTHORIZED,
                AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            },
            CustomError::DatabaseError(_)
            | CustomError::BlockingError(_)
            | CustomError::HashingError(_)
            | CustomError::FileStorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status()).json(json!({ "error": self.to_string() }))
    }
}

/******************************************/
// Mapping diesel errors to the taxonomy
/******************************************/
pub fn map_diesel_error(err: diesel::result::Error) -> CustomError {
    use diesel::result::{DatabaseErrorKind, Error};
    match err {
        Error::NotFound => CustomError::NotFoundError("Record not found".to_string()),
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            CustomError::ConflictError(info.message().to_string())
        }
        Error::QueryBuilderError(err) => {
            // An all-None changeset builds an empty UPDATE, surfaced as a 400.
            CustomError::ValidationError(err.to_string())
        }
        other => CustomError::DatabaseError(DbError::QueryError(other.to_string())),
    }
}
