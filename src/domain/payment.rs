use super::grade::Term;
use super::user::UserId;
use crate::error::{PortalError, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Represents a positive tuition amount.
///
/// This is a wrapper around `rust_decimal::Decimal` so a payment can never be
/// initiated for zero or a negative sum. Serialized as a JSON number;
/// both numbers and numeric strings are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PortalError::validation("Amount must be greater than 0"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PortalError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    TelesomZaad,
    Dahabshiil,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::TelesomZaad, PaymentMethod::Dahabshiil];

    /// Where the student completes the transfer with the provider.
    pub fn checkout_url(&self, transaction_id: &TransactionId) -> String {
        match self {
            PaymentMethod::TelesomZaad => format!("https://telesom-zaad.com/pay/{transaction_id}"),
            PaymentMethod::Dahabshiil => format!("https://dahabshiil.com/pay/{transaction_id}"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "telesom_zaad" => Ok(PaymentMethod::TelesomZaad),
            "dahabshiil" => Ok(PaymentMethod::Dahabshiil),
            other => Err(PortalError::validation(format!(
                "Invalid payment method {other:?}"
            ))),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::TelesomZaad => f.write_str("telesom_zaad"),
            PaymentMethod::Dahabshiil => f.write_str("dahabshiil"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

const TRANSACTION_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Caller-facing handle of one payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Millisecond timestamp plus a random base36 suffix.
    ///
    /// Collisions are unlikely but possible; the payment store's unique index
    /// decides.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..TRANSACTION_SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
            .collect();
        Self(format!("{}-{suffix}", Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a student submits to start paying tuition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub payment_method: String,
    pub semester: String,
    pub academic_year: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub student: UserId,
    pub amount: Amount,
    pub payment_method: PaymentMethod,
    pub transaction_id: TransactionId,
    pub status: PaymentStatus,
    #[serde(flatten)]
    pub term: Term,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn pending(
        student: UserId,
        amount: Amount,
        payment_method: PaymentMethod,
        term: Term,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student,
            amount,
            payment_method,
            transaction_id: TransactionId::generate(),
            status: PaymentStatus::Pending,
            term,
            payment_date: None,
            receipt_url: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves a pending payment to `completed` and stamps the payment date.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure_pending()?;
        self.status = PaymentStatus::Completed;
        self.payment_date = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Moves a pending payment to `failed`. The payment date stays unset.
    pub fn fail(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure_pending()?;
        self.status = PaymentStatus::Failed;
        self.updated_at = now;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<()> {
        if self.status.is_terminal() {
            Err(PortalError::conflict(format!(
                "payment {} is already {:?}",
                self.transaction_id, self.status
            )))
        } else {
            Ok(())
        }
    }

    /// Sort key for payment history: settlement date, else creation date.
    pub fn history_date(&self) -> DateTime<Utc> {
        self.payment_date.unwrap_or(self.created_at)
    }
}
