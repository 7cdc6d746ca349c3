use super::grade::{LetterGrade, Term};
use super::payment::{Amount, TransactionId};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

/// Outbound message produced after a grade or payment write commits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    GradePosted {
        to: String,
        name: String,
        course_name: String,
        grade: LetterGrade,
        term: Term,
    },
    PaymentReceipt {
        to: String,
        name: String,
        amount: Amount,
        transaction_id: TransactionId,
        paid_at: DateTime<Utc>,
        term: Term,
    },
    PaymentConfirmation {
        phone_number: String,
        amount: Amount,
        transaction_id: TransactionId,
    },
}

impl Notification {
    pub fn channel(&self) -> Channel {
        match self {
            Notification::GradePosted { .. } | Notification::PaymentReceipt { .. } => {
                Channel::Email
            }
            Notification::PaymentConfirmation { .. } => Channel::Sms,
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            Notification::GradePosted { to, .. } | Notification::PaymentReceipt { to, .. } => to,
            Notification::PaymentConfirmation { phone_number, .. } => phone_number,
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Notification::GradePosted { course_name, .. } => {
                format!("New Grade Posted: {course_name}")
            }
            Notification::PaymentReceipt { .. } => "Payment Receipt - GollisConnect".to_string(),
            Notification::PaymentConfirmation { .. } => "Payment confirmation".to_string(),
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notification::GradePosted {
                name,
                course_name,
                grade,
                term,
                ..
            } => format!(
                "Dear {name}, a new grade has been posted for {course_name} ({term}): {grade}."
            ),
            Notification::PaymentReceipt {
                name,
                amount,
                transaction_id,
                paid_at,
                term,
                ..
            } => format!(
                "Dear {name}, we received your payment of ${amount} for {term} on {}. Transaction ID: {transaction_id}.",
                paid_at.format("%Y-%m-%d %H:%M UTC")
            ),
            Notification::PaymentConfirmation {
                amount,
                transaction_id,
                ..
            } => format!(
                "Your payment of ${amount} has been received successfully. Transaction ID: {transaction_id}"
            ),
        }
    }
}
