//! Payment endpoints.
//!
//! ```text
//! POST /api/payments/initiate
//! POST /api/payments/verify/{transactionId}
//! GET  /api/payments/history
//! ```

use super::auth::Caller;
use super::error::ApiResult;
use super::state::AppState;
use crate::domain::payment::{Payment, PaymentRequest, PaymentStatus, TransactionId};
use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitiateResponse {
    message: &'static str,
    payment_id: Uuid,
    transaction_id: TransactionId,
    payment_url: String,
}

#[derive(Debug, Serialize)]
struct VerifyResponse {
    message: &'static str,
    payment: Payment,
}

#[post("/payments/initiate")]
pub async fn initiate(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<PaymentRequest>,
) -> ApiResult<HttpResponse> {
    let initiated = state.ledger.initiate(&caller, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(InitiateResponse {
        message: "Payment initiated successfully",
        payment_id: initiated.payment.id,
        transaction_id: initiated.payment.transaction_id,
        payment_url: initiated.payment_url,
    }))
}

/// Gateway callback. Unauthenticated; a terminal payment is reported as is.
#[post("/payments/verify/{transaction_id}")]
pub async fn verify(
    state: web::Data<AppState>,
    transaction_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let transaction_id = TransactionId::from(transaction_id.as_str());
    let payment = state.ledger.verify(&transaction_id).await?;
    let response = if payment.status == PaymentStatus::Completed {
        HttpResponse::Ok().json(VerifyResponse {
            message: "Payment verified successfully",
            payment,
        })
    } else {
        HttpResponse::BadRequest().json(VerifyResponse {
            message: "Payment verification failed",
            payment,
        })
    };
    Ok(response)
}

#[get("/payments/history")]
pub async fn history(
    state: web::Data<AppState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<Payment>>> {
    Ok(web::Json(state.ledger.history(caller.id).await?))
}
