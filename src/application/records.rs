use super::access::{STAFF, require_role};
use super::notify::NotificationDispatcher;
use crate::domain::course::{Course, CourseId, CreditHours};
use crate::domain::grade::{
    Gpa, Grade, GradeFilter, GradeId, GradeOrder, LetterGrade, Term, compute_gpa,
};
use crate::domain::notification::Notification;
use crate::domain::ports::{SharedCourseStore, SharedGradeStore, SharedUserDirectory};
use crate::domain::user::{User, UserId, UserSummary};
use crate::error::{PortalError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::info;

/// A grade as submitted by faculty: the student is named by student number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSubmission {
    pub student_id: String,
    pub course_id: CourseId,
    pub grade: LetterGrade,
    pub semester: String,
    pub academic_year: String,
}

/// One line of a course roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[serde(flatten)]
    pub grade: Grade,
    #[serde(rename = "studentInfo", skip_serializing_if = "Option::is_none")]
    pub student: Option<UserSummary>,
}

/// Grade recording and GPA computation.
///
/// The grade store's unique index on (student, course, term) is the only
/// duplicate check; a violation surfaces as `Conflict` from the insert.
pub struct AcademicRecords {
    users: SharedUserDirectory,
    courses: SharedCourseStore,
    grades: SharedGradeStore,
    notifications: NotificationDispatcher,
}

impl AcademicRecords {
    pub fn new(
        users: SharedUserDirectory,
        courses: SharedCourseStore,
        grades: SharedGradeStore,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            users,
            courses,
            grades,
            notifications,
        }
    }

    pub async fn record_grade(&self, submitter: &User, submission: GradeSubmission) -> Result<Grade> {
        require_role(submitter, STAFF)?;
        let term = Term::new(&submission.semester, &submission.academic_year)?;
        let student = self.resolve_student(&submission.student_id).await?;
        let course = self.resolve_course(submission.course_id).await?;

        let now = Utc::now();
        let grade = Grade {
            id: GradeId::new(),
            student: student.id,
            course: course.id,
            letter: submission.grade,
            term,
            submitted_by: submitter.id,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        self.grades.insert(grade.clone()).await?;
        info!(grade = %grade.id, student = %student.id, course = %course.code, "grade recorded");

        self.notify_grade(&student, &course, &grade).await;
        Ok(grade)
    }

    pub async fn update_grade(
        &self,
        editor: &User,
        id: GradeId,
        submission: GradeSubmission,
    ) -> Result<Grade> {
        require_role(editor, STAFF)?;
        let term = Term::new(&submission.semester, &submission.academic_year)?;
        let existing = self
            .grades
            .get(id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Grade {id} not found")))?;
        let student = self.resolve_student(&submission.student_id).await?;
        let course = self.resolve_course(submission.course_id).await?;

        let letter_changed = existing.letter != submission.grade;
        let grade = Grade {
            student: student.id,
            course: course.id,
            letter: submission.grade,
            term,
            updated_by: Some(editor.id),
            updated_at: Utc::now(),
            ..existing
        };
        self.grades.update(grade.clone()).await?;
        info!(grade = %grade.id, letter_changed, "grade updated");

        if letter_changed {
            self.notify_grade(&student, &course, &grade).await;
        }
        Ok(grade)
    }

    pub async fn delete_grade(&self, editor: &User, id: GradeId) -> Result<()> {
        require_role(editor, STAFF)?;
        if self.grades.delete(id).await? {
            info!(grade = %id, "grade deleted");
            Ok(())
        } else {
            Err(PortalError::not_found(format!("Grade {id} not found")))
        }
    }

    /// Recomputed from the stored grades on every call.
    pub async fn calculate_gpa(&self, student: UserId) -> Result<Gpa> {
        let grades = self.grades.for_student(student).await?;
        let mut credit_hours: HashMap<CourseId, Option<CreditHours>> = HashMap::new();
        for grade in &grades {
            if !credit_hours.contains_key(&grade.course) {
                let hours = self.courses.get(grade.course).await?.map(|c| c.credit_hours);
                credit_hours.insert(grade.course, hours);
            }
        }

        Ok(compute_gpa(grades.iter().map(|grade| {
            (
                grade.letter,
                credit_hours.get(&grade.course).copied().flatten(),
            )
        })))
    }

    pub async fn list_grades(
        &self,
        student: UserId,
        filter: &GradeFilter,
        order: GradeOrder,
    ) -> Result<Vec<Grade>> {
        let mut grades: Vec<Grade> = self
            .grades
            .for_student(student)
            .await?
            .into_iter()
            .filter(|grade| filter.matches(grade))
            .collect();
        order.sort(&mut grades);
        Ok(grades)
    }

    /// Grades of a course ordered by student surname, then given name.
    pub async fn list_course_grades(
        &self,
        course: CourseId,
        filter: &GradeFilter,
    ) -> Result<Vec<RosterEntry>> {
        self.resolve_course(course).await?;

        let mut roster = Vec::new();
        for grade in self.grades.for_course(course).await? {
            if !filter.matches(&grade) {
                continue;
            }
            let student = self.users.get(grade.student).await?;
            roster.push(RosterEntry {
                grade,
                student: student.as_ref().map(UserSummary::from),
            });
        }
        roster.sort_by(|a, b| match (&a.student, &b.student) {
            (Some(x), Some(y)) => x
                .last_name
                .cmp(&y.last_name)
                .then_with(|| x.first_name.cmp(&y.first_name)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        Ok(roster)
    }

    /// Finds a student-role user by student number.
    pub async fn resolve_student(&self, student_id: &str) -> Result<User> {
        self.users
            .find_student(student_id.trim())
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Student {student_id} not found")))
    }

    async fn resolve_course(&self, id: CourseId) -> Result<Course> {
        self.courses
            .get(id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Course {id} not found")))
    }

    async fn notify_grade(&self, student: &User, course: &Course, grade: &Grade) {
        self.notifications
            .dispatch(Notification::GradePosted {
                to: student.email.clone(),
                name: student.full_name(),
                course_name: course.name.clone(),
                grade: grade.letter,
                term: grade.term.clone(),
            })
            .await;
    }
}
