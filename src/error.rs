/// Application Error Handling
///
/// Every failure in the service maps onto `AppError`:
/// 1. Domain-specific error enums (validation, conflict, auth, store, config)
/// 2. A unified `AppError` used for control flow with `?`
/// 3. HTTP mapping: machine-readable code + human-readable message
/// 4. Structured error logging with a per-error id

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
    SuspiciousContent(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
        }
    }
}

impl StdError for ValidationError {}

/// Uniqueness violations on account creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictError {
    DuplicateEmail,
    DuplicatePhone,
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictError::DuplicateEmail => write!(f, "Email already registered"),
            ConflictError::DuplicatePhone => write!(f, "Phone number already registered"),
        }
    }
}

impl StdError for ConflictError {}

/// Authentication errors: bad credentials and token failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    MissingToken,
    TokenMalformed,
    TokenExpired,
    InvalidSignature,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::TokenMalformed => write!(f, "Malformed token"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::InvalidSignature => write!(f, "Invalid token signature"),
        }
    }
}

impl StdError for AuthError {}

/// Fields the document store keeps unique across user records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Phone,
}

/// Document store failures
#[derive(Debug)]
pub enum StoreError {
    DuplicateKey(UniqueField),
    /// The store refused a search pattern
    InvalidPattern(String),
    NotFound(String),
    Timeout(Duration),
    Unavailable(String),
    Serialization(String),
    Query(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateKey(UniqueField::Email) => write!(f, "Duplicate key: email"),
            StoreError::DuplicateKey(UniqueField::Phone) => write!(f, "Duplicate key: phone"),
            StoreError::InvalidPattern(msg) => write!(f, "Invalid search pattern: {}", msg),
            StoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StoreError::Timeout(limit) => {
                write!(f, "Store operation timed out after {}s", limit.as_secs())
            }
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
            StoreError::Serialization(msg) => write!(f, "Document serialization error: {}", msg),
            StoreError::Query(msg) => write!(f, "Query error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Conflict(ConflictError),
    Auth(AuthError),
    Store(StoreError),
    /// Hashing could not complete (entropy source failure). The current
    /// operation is aborted; nothing unhashed is ever stored.
    Fatal(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Conflict(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Fatal(msg) => write!(f, "Fatal error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<ConflictError> for AppError {
    fn from(err: ConflictError) -> Self {
        AppError::Conflict(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            // A unique index rejected the write: same outcome as the pre-insert check.
            StoreError::DuplicateKey(UniqueField::Email) => {
                AppError::Conflict(ConflictError::DuplicateEmail)
            }
            StoreError::DuplicateKey(UniqueField::Phone) => {
                AppError::Conflict(ConflictError::DuplicatePhone)
            }
            StoreError::InvalidPattern(_) => {
                AppError::Validation(ValidationError::InvalidFormat("name".to_string()))
            }
            other => AppError::Store(other),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505") => {
                if db.message().contains("phone") {
                    StoreError::DuplicateKey(UniqueField::Phone)
                } else {
                    StoreError::DuplicateKey(UniqueField::Email)
                }
            }
            // invalid_regular_expression
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("2201B") => {
                StoreError::InvalidPattern(db.message().to_string())
            }
            sqlx::Error::Decode(_) | sqlx::Error::ColumnDecode { .. } => {
                StoreError::Serialization(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error body returned to clients
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    /// Unique error ID, also present in the server log line
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Converts errors to HTTP responses and logs them under a request id
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    /// Machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(ConflictError::DuplicateEmail) => "DUPLICATE_EMAIL",
            AppError::Conflict(ConflictError::DuplicatePhone) => "DUPLICATE_PHONE",
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
                AuthError::MissingToken => "MISSING_TOKEN",
                AuthError::TokenMalformed => "TOKEN_MALFORMED",
                AuthError::TokenExpired => "TOKEN_EXPIRED",
                AuthError::InvalidSignature => "INVALID_SIGNATURE",
            },
            AppError::Store(e) => match e {
                StoreError::DuplicateKey(_) => "DUPLICATE_ENTRY",
                StoreError::InvalidPattern(_) => "VALIDATION_ERROR",
                StoreError::NotFound(_) => "NOT_FOUND",
                StoreError::Timeout(_) => "STORE_TIMEOUT",
                StoreError::Unavailable(_) => "SERVICE_UNAVAILABLE",
                StoreError::Serialization(_) | StoreError::Query(_) => "DATABASE_ERROR",
            },
            AppError::Fatal(_) => "FATAL_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to clients; never carries internal detail
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Conflict(e) => e.to_string(),
            AppError::Auth(e) => e.to_string(),
            AppError::Store(e) => match e {
                StoreError::DuplicateKey(_) => "Duplicate entry".to_string(),
                StoreError::InvalidPattern(_) => "Invalid search pattern".to_string(),
                StoreError::NotFound(_) => "Record not found".to_string(),
                StoreError::Timeout(_) | StoreError::Unavailable(_) => {
                    "Database service temporarily unavailable".to_string()
                }
                _ => "Database error occurred".to_string(),
            },
            AppError::Fatal(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let status = ResponseError::status_code(self);
        let error_response = ErrorResponse::new(
            request_id.to_string(),
            self.public_message(),
            self.code().to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Conflict(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Duplicate entry attempt");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(request_id = request_id, "Invalid credentials attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::Store(StoreError::NotFound(msg)) => {
                tracing::warn!(request_id = request_id, error = %msg, "Record not found");
            }
            AppError::Store(e) => {
                tracing::error!(request_id = request_id, error = %e, "Store error");
            }
            AppError::Fatal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Fatal error, operation aborted");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Store(e) => match e {
                StoreError::DuplicateKey(_) => StatusCode::CONFLICT,
                StoreError::InvalidPattern(_) => StatusCode::BAD_REQUEST,
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Timeout(_) | StoreError::Unavailable(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Fatal(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
