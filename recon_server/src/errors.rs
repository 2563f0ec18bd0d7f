use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use recon_engine::{
    db_types::OrderValidationError,
    traits::{GatewayError, OrderQueryError, ReconciliationError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("Invalid order: {0}")]
    OrderValidationError(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The requested status change is not allowed. {0}")]
    IllegalStatusChange(String),
    #[error("The payment gateway could not be reached. {0}")]
    GatewayUnavailable(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::OrderValidationError(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::IllegalStatusChange(_) => StatusCode::CONFLICT,
            Self::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

/// Maps engine errors onto HTTP statuses. Duplicate and no-op transitions never reach this
/// conversion; they are successes inside the engine.
impl From<ReconciliationError> for ServerError {
    fn from(e: ReconciliationError) -> Self {
        match e {
            ReconciliationError::Validation(e) => Self::OrderValidationError(e.to_string()),
            ReconciliationError::OrderNotFound(id) => Self::NoRecordFound(format!("Order {id} does not exist.")),
            ReconciliationError::IntentNotFound(id) => {
                Self::NoRecordFound(format!("No order for payment intent {id}."))
            },
            e @ ReconciliationError::IntentMismatch { .. } => Self::InvalidRequestBody(e.to_string()),
            e @ ReconciliationError::InvalidTransition { .. } => Self::IllegalStatusChange(e.to_string()),
            ReconciliationError::Gateway(e) => Self::from(e),
            ReconciliationError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            ReconciliationError::QueryError(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<OrderValidationError> for ServerError {
    fn from(e: OrderValidationError) -> Self {
        Self::OrderValidationError(e.to_string())
    }
}

impl From<GatewayError> for ServerError {
    fn from(e: GatewayError) -> Self {
        Self::GatewayUnavailable(e.to_string())
    }
}

impl From<OrderQueryError> for ServerError {
    fn from(e: OrderQueryError) -> Self {
        Self::BackendError(e.to_string())
    }
}
