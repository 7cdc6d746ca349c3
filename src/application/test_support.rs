use super::catalog::CourseCatalog;
use super::ledger::{PaymentGateways, PaymentLedger};
use super::notify::NotificationDispatcher;
use super::records::{AcademicRecords, GradeSubmission};
use crate::domain::course::{Course, CourseDraft, CourseId};
use crate::domain::grade::LetterGrade;
use crate::domain::payment::PaymentRequest;
use crate::domain::ports::{CourseStore, SharedCourseStore, SharedUserDirectory};
use crate::domain::user::{Role, User, UserId};
use crate::infrastructure::gateway::{GatewayPolicy, StubGateway};
use crate::infrastructure::identity::InMemoryDirectory;
use crate::infrastructure::in_memory::{
    InMemoryCourseStore, InMemoryGradeStore, InMemoryPaymentStore,
};
use crate::infrastructure::notifier::OutboxNotifier;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const SEMESTER: &str = "Fall";
pub(crate) const ACADEMIC_YEAR: &str = "2024-2025";

/// Services over fresh in-memory adapters, with one user per role and a
/// single three-credit course.
pub(crate) struct Fixture {
    pub catalog: CourseCatalog,
    pub records: AcademicRecords,
    pub ledger: PaymentLedger,
    pub notifier: OutboxNotifier,
    pub admin: User,
    pub faculty: User,
    pub student: User,
    pub other_student: User,
    pub course: Course,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::build(OutboxNotifier::new(), approving()).await
    }

    pub async fn with_failing_notifier() -> Self {
        Self::build(OutboxNotifier::failing(), approving()).await
    }

    pub async fn with_gateways(gateways: PaymentGateways) -> Self {
        Self::build(OutboxNotifier::new(), gateways).await
    }

    async fn build(notifier: OutboxNotifier, gateways: PaymentGateways) -> Self {
        let directory = InMemoryDirectory::new();
        let admin = user("Hodan", "Abdi", "hodan@gollis.edu", Role::Admin, None, None);
        let faculty = user("Faisal", "Jama", "faisal@gollis.edu", Role::Faculty, None, None);
        let mut student = user(
            "Amina",
            "Warsame",
            "amina@gollis.edu",
            Role::Student,
            Some("GU-001"),
            Some("+252634000001"),
        );
        student.phone_verified = true;
        let other_student = user(
            "Khadar",
            "Ali",
            "khadar@gollis.edu",
            Role::Student,
            Some("GU-002"),
            Some("+252634000002"),
        );
        for member in [&admin, &faculty, &student, &other_student] {
            directory
                .add_user(member.clone())
                .await
                .expect("fixture user");
        }

        let courses = InMemoryCourseStore::new();
        let course = Course::create(draft("CS101", 3), Utc::now()).expect("fixture course");
        courses.insert(course.clone()).await.expect("fixture course");

        let users: SharedUserDirectory = Arc::new(directory);
        let courses: SharedCourseStore = Arc::new(courses);
        let notifications =
            NotificationDispatcher::new(Arc::new(notifier.clone()), 1, Duration::ZERO);

        Self {
            catalog: CourseCatalog::new(courses.clone(), users.clone()),
            records: AcademicRecords::new(
                users.clone(),
                courses,
                Arc::new(InMemoryGradeStore::new()),
                notifications.clone(),
            ),
            ledger: PaymentLedger::new(
                users,
                Arc::new(InMemoryPaymentStore::new()),
                gateways,
                notifications,
            ),
            notifier,
            admin,
            faculty,
            student,
            other_student,
            course,
        }
    }
}

fn approving() -> PaymentGateways {
    PaymentGateways::uniform(Arc::new(StubGateway::new(GatewayPolicy::Approve)))
}

fn user(
    first_name: &str,
    last_name: &str,
    email: &str,
    role: Role,
    student_id: Option<&str>,
    phone_number: Option<&str>,
) -> User {
    User {
        id: UserId::new(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        role,
        student_id: student_id.map(str::to_string),
        department: "Computer Science".to_string(),
        phone_number: phone_number.map(str::to_string),
        phone_verified: false,
        active: true,
    }
}

pub(crate) fn draft(code: &str, credit_hours: u8) -> CourseDraft {
    CourseDraft {
        id: None,
        code: code.to_string(),
        name: format!("{code} lecture"),
        description: None,
        credit_hours,
        department: "Computer Science".to_string(),
        instructor: None,
        prerequisites: vec![],
    }
}

pub(crate) fn submission(student_id: &str, course_id: CourseId, grade: LetterGrade) -> GradeSubmission {
    GradeSubmission {
        student_id: student_id.to_string(),
        course_id,
        grade,
        semester: SEMESTER.to_string(),
        academic_year: ACADEMIC_YEAR.to_string(),
    }
}

pub(crate) fn payment_request(amount: Decimal, method: &str) -> PaymentRequest {
    PaymentRequest {
        amount,
        payment_method: method.to_string(),
        semester: SEMESTER.to_string(),
        academic_year: ACADEMIC_YEAR.to_string(),
        notes: None,
    }
}
