use super::course::{Course, CourseId};
use super::grade::{Grade, GradeId};
use super::notification::Notification;
use super::payment::{Payment, TransactionId};
use super::user::{User, UserId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Read access to the identity provider's user records.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get(&self, id: UserId) -> Result<Option<User>>;
    /// Looks up a student-role user by institutional student number.
    async fn find_student(&self, student_id: &str) -> Result<Option<User>>;
}

/// Turns a bearer token into the calling user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fails with `Unauthorized` for unknown, expired or inactive sessions.
    async fn resolve_caller(&self, token: &str) -> Result<User>;
}

/// Course persistence. Course codes are unique, including inactive courses.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Fails with `Conflict` if the code is taken.
    async fn insert(&self, course: Course) -> Result<()>;
    /// Replaces an existing course. Fails with `NotFound` if absent.
    async fn update(&self, course: Course) -> Result<()>;
    async fn get(&self, id: CourseId) -> Result<Option<Course>>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Course>>;
    async fn all(&self) -> Result<Vec<Course>>;
}

/// Grade persistence, unique on (student, course, semester, academic year).
#[async_trait]
pub trait GradeStore: Send + Sync {
    /// Fails with `Conflict` if the enrollment already has a grade.
    async fn insert(&self, grade: Grade) -> Result<()>;
    /// Fails with `NotFound` if absent, `Conflict` if the new enrollment
    /// belongs to another grade.
    async fn update(&self, grade: Grade) -> Result<()>;
    async fn get(&self, id: GradeId) -> Result<Option<Grade>>;
    /// Returns whether a grade was removed.
    async fn delete(&self, id: GradeId) -> Result<bool>;
    async fn for_student(&self, student: UserId) -> Result<Vec<Grade>>;
    async fn for_course(&self, course: CourseId) -> Result<Vec<Grade>>;
}

/// Payment persistence, unique on transaction id.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Fails with `Conflict` if the transaction id is taken.
    async fn insert(&self, payment: Payment) -> Result<()>;
    async fn get(&self, transaction_id: &TransactionId) -> Result<Option<Payment>>;
    /// Writes a terminal payment only if the stored copy is still pending.
    ///
    /// Returns `false` when another verifier got there first.
    async fn settle(&self, payment: Payment) -> Result<bool>;
    async fn for_student(&self, student: UserId) -> Result<Vec<Payment>>;
}

/// Delivers e-mail and SMS notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayDecision {
    Approved,
    Rejected,
}

/// A payment provider's settlement check.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn confirm(&self, payment: &Payment) -> Result<GatewayDecision>;
}

pub type SharedUserDirectory = Arc<dyn UserDirectory>;
pub type SharedIdentityProvider = Arc<dyn IdentityProvider>;
pub type SharedCourseStore = Arc<dyn CourseStore>;
pub type SharedGradeStore = Arc<dyn GradeStore>;
pub type SharedPaymentStore = Arc<dyn PaymentStore>;
pub type SharedNotifier = Arc<dyn Notifier>;
pub type SharedPaymentGateway = Arc<dyn PaymentGateway>;
