use crate::domain::course::{Course, CourseId};
use crate::domain::grade::{EnrollmentKey, Grade, GradeId};
use crate::domain::payment::{Payment, PaymentStatus, TransactionId};
use crate::domain::ports::{CourseStore, GradeStore, PaymentStore};
use crate::domain::user::UserId;
use crate::error::{PortalError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for course rows, keyed by course id.
pub const CF_COURSES: &str = "courses";
/// Unique index: course code -> course id.
pub const CF_COURSE_CODES: &str = "course_codes";
/// Column Family for grade rows, keyed by grade id.
pub const CF_GRADES: &str = "grades";
/// Unique index: (student, course, term) -> grade id.
pub const CF_ENROLLMENTS: &str = "grade_enrollments";
/// Column Family for payments, keyed by transaction id.
pub const CF_PAYMENTS: &str = "payments";

const COLUMN_FAMILIES: [&str; 5] = [
    CF_COURSES,
    CF_COURSE_CODES,
    CF_GRADES,
    CF_ENROLLMENTS,
    CF_PAYMENTS,
];

/// A persistent store implementation using RocksDB.
///
/// Rows and their unique indexes live in separate Column Families and are
/// written together in one `WriteBatch`. Every check-then-write runs under a
/// single writer lock, which is what makes the unique indexes hold.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    writer: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that all required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()));
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            writer: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PortalError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.cf(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn contains(&self, cf: &str, key: &[u8]) -> Result<bool> {
        Ok(self.db.get_pinned_cf(self.cf(cf)?, key)?.is_some())
    }

    fn scan<T: DeserializeOwned>(&self, cf: &str) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(self.cf(cf)?, IteratorMode::Start) {
            let (_key, value) = item?;
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }

    fn put<T: Serialize>(&self, batch: &mut WriteBatch, cf: &str, key: &[u8], row: &T) -> Result<()> {
        batch.put_cf(self.cf(cf)?, key, serde_json::to_vec(row)?);
        Ok(())
    }
}

fn enrollment_key(key: &EnrollmentKey) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(key)?)
}

#[async_trait]
impl CourseStore for RocksDBStore {
    async fn insert(&self, course: Course) -> Result<()> {
        let _guard = self.writer.lock().await;
        if self.contains(CF_COURSE_CODES, course.code.as_bytes())? {
            return Err(PortalError::conflict(format!(
                "Course with code {} already exists",
                course.code
            )));
        }
        if self.contains(CF_COURSES, course.id.0.as_bytes())? {
            return Err(PortalError::conflict(format!(
                "Course {} already exists",
                course.id
            )));
        }

        let mut batch = WriteBatch::default();
        self.put(&mut batch, CF_COURSES, course.id.0.as_bytes(), &course)?;
        batch.put_cf(
            self.cf(CF_COURSE_CODES)?,
            course.code.as_bytes(),
            course.id.0.as_bytes(),
        );
        self.db.write(batch)?;
        Ok(())
    }

    async fn update(&self, course: Course) -> Result<()> {
        let _guard = self.writer.lock().await;
        let existing: Course = self
            .read(CF_COURSES, course.id.0.as_bytes())?
            .ok_or_else(|| PortalError::not_found(format!("Course {} not found", course.id)))?;
        if existing.code != course.code {
            return Err(PortalError::conflict("course codes cannot change"));
        }

        let mut batch = WriteBatch::default();
        self.put(&mut batch, CF_COURSES, course.id.0.as_bytes(), &course)?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn get(&self, id: CourseId) -> Result<Option<Course>> {
        self.read(CF_COURSES, id.0.as_bytes())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Course>> {
        match self.db.get_cf(self.cf(CF_COURSE_CODES)?, code.as_bytes())? {
            Some(id) => self.read(CF_COURSES, &id),
            None => Ok(None),
        }
    }

    async fn all(&self) -> Result<Vec<Course>> {
        self.scan(CF_COURSES)
    }
}

#[async_trait]
impl GradeStore for RocksDBStore {
    async fn insert(&self, grade: Grade) -> Result<()> {
        let _guard = self.writer.lock().await;
        let key = enrollment_key(&grade.enrollment_key())?;
        if self.contains(CF_ENROLLMENTS, &key)? {
            return Err(PortalError::conflict(
                "Grade already exists for this student and course",
            ));
        }

        let mut batch = WriteBatch::default();
        self.put(&mut batch, CF_GRADES, grade.id.0.as_bytes(), &grade)?;
        batch.put_cf(self.cf(CF_ENROLLMENTS)?, &key, grade.id.0.as_bytes());
        self.db.write(batch)?;
        Ok(())
    }

    async fn update(&self, grade: Grade) -> Result<()> {
        let _guard = self.writer.lock().await;
        let existing: Grade = self
            .read(CF_GRADES, grade.id.0.as_bytes())?
            .ok_or_else(|| PortalError::not_found(format!("Grade {} not found", grade.id)))?;
        let old_key = enrollment_key(&existing.enrollment_key())?;
        let new_key = enrollment_key(&grade.enrollment_key())?;
        if let Some(owner) = self.db.get_cf(self.cf(CF_ENROLLMENTS)?, &new_key)?
            && owner.as_slice() != grade.id.0.as_bytes()
        {
            return Err(PortalError::conflict(
                "Grade already exists for this student and course",
            ));
        }

        let mut batch = WriteBatch::default();
        batch.delete_cf(self.cf(CF_ENROLLMENTS)?, &old_key);
        batch.put_cf(self.cf(CF_ENROLLMENTS)?, &new_key, grade.id.0.as_bytes());
        self.put(&mut batch, CF_GRADES, grade.id.0.as_bytes(), &grade)?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn get(&self, id: GradeId) -> Result<Option<Grade>> {
        self.read(CF_GRADES, id.0.as_bytes())
    }

    async fn delete(&self, id: GradeId) -> Result<bool> {
        let _guard = self.writer.lock().await;
        let Some(existing) = self.read::<Grade>(CF_GRADES, id.0.as_bytes())? else {
            return Ok(false);
        };

        let mut batch = WriteBatch::default();
        batch.delete_cf(self.cf(CF_GRADES)?, id.0.as_bytes());
        batch.delete_cf(
            self.cf(CF_ENROLLMENTS)?,
            enrollment_key(&existing.enrollment_key())?,
        );
        self.db.write(batch)?;
        Ok(true)
    }

    async fn for_student(&self, student: UserId) -> Result<Vec<Grade>> {
        Ok(self
            .scan::<Grade>(CF_GRADES)?
            .into_iter()
            .filter(|grade| grade.student == student)
            .collect())
    }

    async fn for_course(&self, course: CourseId) -> Result<Vec<Grade>> {
        Ok(self
            .scan::<Grade>(CF_GRADES)?
            .into_iter()
            .filter(|grade| grade.course == course)
            .collect())
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn insert(&self, payment: Payment) -> Result<()> {
        let _guard = self.writer.lock().await;
        let key = payment.transaction_id.as_str().as_bytes();
        if self.contains(CF_PAYMENTS, key)? {
            return Err(PortalError::conflict(format!(
                "transaction {} already exists",
                payment.transaction_id
            )));
        }

        let mut batch = WriteBatch::default();
        self.put(&mut batch, CF_PAYMENTS, key, &payment)?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn get(&self, transaction_id: &TransactionId) -> Result<Option<Payment>> {
        self.read(CF_PAYMENTS, transaction_id.as_str().as_bytes())
    }

    async fn settle(&self, payment: Payment) -> Result<bool> {
        let _guard = self.writer.lock().await;
        let key = payment.transaction_id.as_str().as_bytes();
        let stored: Payment = self.read(CF_PAYMENTS, key)?.ok_or_else(|| {
            PortalError::not_found(format!("Payment {} not found", payment.transaction_id))
        })?;
        if stored.status != PaymentStatus::Pending {
            return Ok(false);
        }

        let mut batch = WriteBatch::default();
        self.put(&mut batch, CF_PAYMENTS, key, &payment)?;
        self.db.write(batch)?;
        Ok(true)
    }

    async fn for_student(&self, student: UserId) -> Result<Vec<Payment>> {
        Ok(self
            .scan::<Payment>(CF_PAYMENTS)?
            .into_iter()
            .filter(|payment| payment.student == student)
            .collect())
    }
}
