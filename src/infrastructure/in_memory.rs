use crate::domain::course::{Course, CourseId};
use crate::domain::grade::{EnrollmentKey, Grade, GradeId};
use crate::domain::payment::{Payment, PaymentStatus, TransactionId};
use crate::domain::ports::{CourseStore, GradeStore, PaymentStore};
use crate::domain::user::UserId;
use crate::error::{PortalError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct CourseTable {
    by_id: HashMap<CourseId, Course>,
    codes: HashMap<String, CourseId>,
}

/// A thread-safe in-memory course store.
///
/// The code index and the rows share one lock, so a code check and its
/// insert happen atomically.
#[derive(Default, Clone)]
pub struct InMemoryCourseStore {
    table: Arc<RwLock<CourseTable>>,
}

impl InMemoryCourseStore {
    /// Creates a new, empty in-memory course store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn insert(&self, course: Course) -> Result<()> {
        let mut table = self.table.write().await;
        if table.codes.contains_key(&course.code) {
            return Err(PortalError::conflict(format!(
                "Course with code {} already exists",
                course.code
            )));
        }
        if table.by_id.contains_key(&course.id) {
            return Err(PortalError::conflict(format!(
                "Course {} already exists",
                course.id
            )));
        }
        table.codes.insert(course.code.clone(), course.id);
        table.by_id.insert(course.id, course);
        Ok(())
    }

    async fn update(&self, course: Course) -> Result<()> {
        let mut table = self.table.write().await;
        let Some(existing) = table.by_id.get(&course.id) else {
            return Err(PortalError::not_found(format!("Course {} not found", course.id)));
        };
        if existing.code != course.code {
            return Err(PortalError::conflict("course codes cannot change"));
        }
        table.by_id.insert(course.id, course);
        Ok(())
    }

    async fn get(&self, id: CourseId) -> Result<Option<Course>> {
        Ok(self.table.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Course>> {
        let table = self.table.read().await;
        Ok(table
            .codes
            .get(code)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn all(&self) -> Result<Vec<Course>> {
        Ok(self.table.read().await.by_id.values().cloned().collect())
    }
}

#[derive(Default)]
struct GradeTable {
    by_id: HashMap<GradeId, Grade>,
    enrollments: HashMap<EnrollmentKey, GradeId>,
}

/// A thread-safe in-memory grade store with a unique enrollment index.
#[derive(Default, Clone)]
pub struct InMemoryGradeStore {
    table: Arc<RwLock<GradeTable>>,
}

impl InMemoryGradeStore {
    /// Creates a new, empty in-memory grade store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_grade() -> PortalError {
    PortalError::conflict("Grade already exists for this student and course")
}

#[async_trait]
impl GradeStore for InMemoryGradeStore {
    async fn insert(&self, grade: Grade) -> Result<()> {
        let mut table = self.table.write().await;
        let key = grade.enrollment_key();
        if table.enrollments.contains_key(&key) || table.by_id.contains_key(&grade.id) {
            return Err(duplicate_grade());
        }
        table.enrollments.insert(key, grade.id);
        table.by_id.insert(grade.id, grade);
        Ok(())
    }

    async fn update(&self, grade: Grade) -> Result<()> {
        let mut table = self.table.write().await;
        let Some(existing) = table.by_id.get(&grade.id) else {
            return Err(PortalError::not_found(format!("Grade {} not found", grade.id)));
        };
        let old_key = existing.enrollment_key();
        let new_key = grade.enrollment_key();
        if let Some(owner) = table.enrollments.get(&new_key)
            && *owner != grade.id
        {
            return Err(duplicate_grade());
        }
        table.enrollments.remove(&old_key);
        table.enrollments.insert(new_key, grade.id);
        table.by_id.insert(grade.id, grade);
        Ok(())
    }

    async fn get(&self, id: GradeId) -> Result<Option<Grade>> {
        Ok(self.table.read().await.by_id.get(&id).cloned())
    }

    async fn delete(&self, id: GradeId) -> Result<bool> {
        let mut table = self.table.write().await;
        match table.by_id.remove(&id) {
            Some(grade) => {
                table.enrollments.remove(&grade.enrollment_key());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn for_student(&self, student: UserId) -> Result<Vec<Grade>> {
        let table = self.table.read().await;
        Ok(table
            .by_id
            .values()
            .filter(|grade| grade.student == student)
            .cloned()
            .collect())
    }

    async fn for_course(&self, course: CourseId) -> Result<Vec<Grade>> {
        let table = self.table.read().await;
        Ok(table
            .by_id
            .values()
            .filter(|grade| grade.course == course)
            .cloned()
            .collect())
    }
}

/// A thread-safe in-memory payment store keyed by transaction id.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<TransactionId, Payment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        if payments.contains_key(&payment.transaction_id) {
            return Err(PortalError::conflict(format!(
                "transaction {} already exists",
                payment.transaction_id
            )));
        }
        payments.insert(payment.transaction_id.clone(), payment);
        Ok(())
    }

    async fn get(&self, transaction_id: &TransactionId) -> Result<Option<Payment>> {
        Ok(self.payments.read().await.get(transaction_id).cloned())
    }

    async fn settle(&self, payment: Payment) -> Result<bool> {
        let mut payments = self.payments.write().await;
        let Some(stored) = payments.get_mut(&payment.transaction_id) else {
            return Err(PortalError::not_found(format!(
                "Payment {} not found",
                payment.transaction_id
            )));
        };
        if stored.status != PaymentStatus::Pending {
            return Ok(false);
        }
        *stored = payment;
        Ok(true)
    }

    async fn for_student(&self, student: UserId) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|payment| payment.student == student)
            .cloned()
            .collect())
    }
}
