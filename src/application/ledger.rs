use super::access::{STUDENT, require_role};
use super::notify::NotificationDispatcher;
use crate::domain::grade::Term;
use crate::domain::notification::Notification;
use crate::domain::payment::{
    Amount, Payment, PaymentMethod, PaymentRequest, PaymentStatus, TransactionId,
};
use crate::domain::ports::{
    GatewayDecision, SharedPaymentGateway, SharedPaymentStore, SharedUserDirectory,
};
use crate::domain::user::{User, UserId};
use crate::error::{PortalError, Result};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// How many fresh transaction ids to try before giving up on a collision.
const MAX_ID_ATTEMPTS: usize = 3;

/// The gateway responsible for each payment method.
#[derive(Clone, Default)]
pub struct PaymentGateways {
    gateways: HashMap<PaymentMethod, SharedPaymentGateway>,
}

impl PaymentGateways {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the same gateway for every method.
    pub fn uniform(gateway: SharedPaymentGateway) -> Self {
        let mut gateways = Self::new();
        for method in PaymentMethod::ALL {
            gateways.register(method, gateway.clone());
        }
        gateways
    }

    pub fn register(&mut self, method: PaymentMethod, gateway: SharedPaymentGateway) {
        self.gateways.insert(method, gateway);
    }

    pub async fn confirm(&self, payment: &Payment) -> Result<GatewayDecision> {
        let gateway = self.gateways.get(&payment.payment_method).ok_or_else(|| {
            PortalError::UpstreamFailure(format!(
                "no gateway registered for {}",
                payment.payment_method
            ))
        })?;
        gateway.confirm(payment).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatedPayment {
    pub payment: Payment,
    pub payment_url: String,
}

/// Tuition payments: `pending` until verified, then `completed` or `failed`.
pub struct PaymentLedger {
    users: SharedUserDirectory,
    payments: SharedPaymentStore,
    gateways: PaymentGateways,
    notifications: NotificationDispatcher,
}

impl PaymentLedger {
    pub fn new(
        users: SharedUserDirectory,
        payments: SharedPaymentStore,
        gateways: PaymentGateways,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            users,
            payments,
            gateways,
            notifications,
        }
    }

    pub async fn initiate(&self, student: &User, request: PaymentRequest) -> Result<InitiatedPayment> {
        require_role(student, STUDENT)?;
        let amount = Amount::new(request.amount)?;
        let method: PaymentMethod = request.payment_method.parse()?;
        let term = Term::new(&request.semester, &request.academic_year)?;

        let mut attempt = 0;
        let payment = loop {
            attempt += 1;
            let mut payment = Payment::pending(student.id, amount, method, term.clone(), Utc::now());
            payment.notes = request.notes.clone();
            match self.payments.insert(payment.clone()).await {
                Ok(()) => break payment,
                Err(PortalError::Conflict(reason)) if attempt < MAX_ID_ATTEMPTS => {
                    warn!(attempt, %reason, "transaction id collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        };

        info!(
            transaction = %payment.transaction_id,
            student = %student.id,
            amount = %payment.amount,
            method = %method,
            "payment initiated"
        );
        let payment_url = method.checkout_url(&payment.transaction_id);
        Ok(InitiatedPayment {
            payment,
            payment_url,
        })
    }

    /// Settles a pending payment with its gateway.
    ///
    /// Terminal payments are returned as stored, without contacting the
    /// gateway or notifying anyone again.
    pub async fn verify(&self, transaction_id: &TransactionId) -> Result<Payment> {
        let mut payment = self.payments.get(transaction_id).await?.ok_or_else(|| {
            PortalError::not_found(format!("Payment {transaction_id} not found"))
        })?;
        if payment.status.is_terminal() {
            info!(transaction = %transaction_id, status = ?payment.status, "payment already settled");
            return Ok(payment);
        }

        let decision = match self.gateways.confirm(&payment).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(transaction = %transaction_id, error = %e, "gateway verification failed");
                GatewayDecision::Rejected
            }
        };

        let now = Utc::now();
        match decision {
            GatewayDecision::Approved => payment.complete(now)?,
            GatewayDecision::Rejected => payment.fail(now)?,
        }

        if !self.payments.settle(payment.clone()).await? {
            info!(transaction = %transaction_id, "payment settled concurrently");
            return self.payments.get(transaction_id).await?.ok_or_else(|| {
                PortalError::not_found(format!("Payment {transaction_id} not found"))
            });
        }
        info!(transaction = %transaction_id, status = ?payment.status, "payment settled");

        if payment.status == PaymentStatus::Completed {
            self.send_receipts(&payment).await;
        }
        Ok(payment)
    }

    /// A student's payments, most recent first.
    pub async fn history(&self, student: UserId) -> Result<Vec<Payment>> {
        let mut payments = self.payments.for_student(student).await?;
        payments.sort_by_key(|payment| std::cmp::Reverse(payment.history_date()));
        Ok(payments)
    }

    /// Best effort: the payment is already settled, so lookup failures are
    /// logged and never returned.
    async fn send_receipts(&self, payment: &Payment) {
        let student = match self.users.get(payment.student).await {
            Ok(Some(student)) => student,
            Ok(None) => {
                warn!(transaction = %payment.transaction_id, "payer not in directory, no receipt sent");
                return;
            }
            Err(e) => {
                error!(transaction = %payment.transaction_id, error = %e, "payer lookup failed, no receipt sent");
                return;
            }
        };

        self.notifications
            .dispatch(Notification::PaymentReceipt {
                to: student.email.clone(),
                name: student.full_name(),
                amount: payment.amount,
                transaction_id: payment.transaction_id.clone(),
                paid_at: payment.payment_date.unwrap_or(payment.updated_at),
                term: payment.term.clone(),
            })
            .await;

        if let Some(phone) = student.verified_phone() {
            self.notifications
                .dispatch(Notification::PaymentConfirmation {
                    phone_number: phone.to_string(),
                    amount: payment.amount,
                    transaction_id: payment.transaction_id.clone(),
                })
                .await;
        }
    }
}
