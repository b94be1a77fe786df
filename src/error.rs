use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

// ── Error Taxonomy ────────────────────────────────────────────
// Structurally invalid requests never touch the store. A declined card is
// not an error: the handler records it and reports a failed payment.

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Payment processing error: {0}")]
    Processing(String),

    #[error("Transaction not found")]
    NotFound,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ResponseError for PaymentError {
    fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::MissingFields | PaymentError::Processing(_) => StatusCode::BAD_REQUEST,
            PaymentError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
