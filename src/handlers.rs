use actix_web::error::InternalError;
use actix_web::{web, HttpResponse};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorBody, PaymentError};
use crate::metrics::PaymentMetrics;
use crate::store::{TransactionStatus, TransactionStore};

// Test cards with this prefix are always declined.
const DECLINE_PREFIX: &str = "0000";

// ── Request / Response Types ──────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub order_id:    Option<String>,
    pub amount:      Option<Value>,
    pub card_number: Option<String>,
}

impl PaymentRequest {
    // Presence checks first, then amount coercion; neither touches the store.
    fn into_validated(self) -> Result<(String, f64, String), PaymentError> {
        let order_id = self.order_id.ok_or(PaymentError::MissingFields)?;
        let amount = self.amount.ok_or(PaymentError::MissingFields)?;
        let card_number = self.card_number.ok_or(PaymentError::MissingFields)?;
        Ok((order_id, coerce_amount(&amount)?, card_number))
    }
}

// Amounts arrive as JSON numbers or as numeric strings like "49.99";
// anything else is a processing error.
fn coerce_amount(raw: &Value) -> Result<f64, PaymentError> {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| PaymentError::Processing("amount is out of range".to_string())),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| PaymentError::Processing(e.to_string())),
        Value::Null => Err(PaymentError::MissingFields),
        _ => Err(PaymentError::Processing("amount must be a number".to_string())),
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status:  &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PaymentAccepted {
    pub status:         &'static str,
    pub transaction_id: String,
    pub message:        &'static str,
    pub amount:         f64,
}

#[derive(Debug, Serialize)]
pub struct PaymentDeclined {
    pub status:  &'static str,
    pub message: &'static str,
}

// ── Handlers ──────────────────────────────────────────────────

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status:  "healthy",
        service: "payment-service",
    })
}

pub async fn metrics_handler(metrics: web::Data<PaymentMetrics>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics.render())
}

pub async fn process_payment(
    payload: web::Json<PaymentRequest>,
    store: web::Data<TransactionStore>,
    metrics: web::Data<PaymentMetrics>,
) -> Result<HttpResponse, PaymentError> {
    metrics.payments_total.inc();

    let (order_id, amount, card_number) = payload.into_inner().into_validated()?;

    let approved = !card_number.starts_with(DECLINE_PREFIX);
    let status = if approved {
        TransactionStatus::Success
    } else {
        TransactionStatus::Failed
    };

    // Declined payments are recorded too; only structurally invalid
    // requests skip the store.
    let record = store.record(order_id, amount, status).await;

    if approved {
        info!(
            "[payment] Processed {} for order {} amount {:.2}",
            record.transaction_id, record.order_id, record.amount
        );
        Ok(HttpResponse::Ok().json(PaymentAccepted {
            status:         "success",
            transaction_id: record.transaction_id,
            message:        "Payment processed successfully",
            amount:         record.amount,
        }))
    } else {
        metrics.payments_declined_total.inc();
        warn!(
            "[payment] Declined {} for order {}",
            record.transaction_id, record.order_id
        );
        Ok(HttpResponse::BadRequest().json(PaymentDeclined {
            status:  "failed",
            message: "Payment failed - Invalid card",
        }))
    }
}

pub async fn payment_status(
    path: web::Path<String>,
    store: web::Data<TransactionStore>,
) -> Result<HttpResponse, PaymentError> {
    let transaction_id = path.into_inner();
    let record = store
        .get(&transaction_id)
        .await
        .ok_or(PaymentError::NotFound)?;
    Ok(HttpResponse::Ok().json(record))
}

// ── Routes ────────────────────────────────────────────────────

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        // Bodies the extractor rejects (malformed JSON, mistyped fields)
        // get the same error shape as a bad amount.
        let body = ErrorBody {
            error: format!("Payment processing error: {err}"),
        };
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    }))
    .route("/health", web::get().to(health))
    .route("/metrics", web::get().to(metrics_handler))
    .route("/api/payments/process", web::post().to(process_payment))
    .route("/api/payments/{transaction_id}", web::get().to(payment_status));
}
