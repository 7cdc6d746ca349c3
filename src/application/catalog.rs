use super::access::{ADMIN, require_role};
use crate::domain::course::{Course, CourseChanges, CourseDraft, CourseFilter, CourseId};
use crate::domain::ports::{SharedCourseStore, SharedUserDirectory};
use crate::domain::user::{Role, User, UserId};
use crate::error::{PortalError, Result};
use chrono::Utc;
use tracing::info;

/// Admin-managed course catalog. Courses are deactivated, never removed.
pub struct CourseCatalog {
    courses: SharedCourseStore,
    users: SharedUserDirectory,
}

impl CourseCatalog {
    pub fn new(courses: SharedCourseStore, users: SharedUserDirectory) -> Self {
        Self { courses, users }
    }

    /// Adds a course under a freshly generated id. Any id in the draft is
    /// ignored; only seed files choose their own ids.
    pub async fn create(&self, admin: &User, draft: CourseDraft) -> Result<Course> {
        require_role(admin, ADMIN)?;
        let course = Course::create(CourseDraft { id: None, ..draft }, Utc::now())?;
        if let Some(instructor) = course.instructor {
            self.require_instructor(instructor).await?;
        }

        self.courses.insert(course.clone()).await?;
        info!(course = %course.id, code = %course.code, "course created");
        Ok(course)
    }

    pub async fn update(
        &self,
        admin: &User,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Course> {
        require_role(admin, ADMIN)?;
        let mut course = self.get(id).await?;
        if let Some(instructor) = changes.instructor {
            self.require_instructor(instructor).await?;
        }

        course.apply(changes, Utc::now())?;
        self.courses.update(course.clone()).await?;
        info!(course = %course.id, code = %course.code, "course updated");
        Ok(course)
    }

    /// Soft delete: the course and its code stay in the catalog.
    pub async fn deactivate(&self, admin: &User, id: CourseId) -> Result<Course> {
        require_role(admin, ADMIN)?;
        let mut course = self.get(id).await?;
        course.active = false;
        course.updated_at = Utc::now();
        self.courses.update(course.clone()).await?;
        info!(course = %course.id, code = %course.code, "course deactivated");
        Ok(course)
    }

    pub async fn get(&self, id: CourseId) -> Result<Course> {
        self.courses
            .get(id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Course {id} not found")))
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Course>> {
        self.courses.find_by_code(code.trim()).await
    }

    /// Courses matching the filter, ordered by code.
    pub async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>> {
        let mut courses: Vec<Course> = self
            .courses
            .all()
            .await?
            .into_iter()
            .filter(|course| filter.matches(course))
            .collect();
        courses.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(courses)
    }

    /// Active courses taught by a faculty member, ordered by code.
    pub async fn by_instructor(&self, instructor: UserId) -> Result<Vec<Course>> {
        self.require_instructor(instructor).await?;
        let filter = CourseFilter {
            department: None,
            active: Some(true),
        };
        Ok(self
            .list(&filter)
            .await?
            .into_iter()
            .filter(|course| course.instructor == Some(instructor))
            .collect())
    }

    async fn require_instructor(&self, id: UserId) -> Result<User> {
        match self.users.get(id).await? {
            Some(user) if user.has_role(Role::Faculty) => Ok(user),
            _ => Err(PortalError::not_found(format!("Instructor {id} not found"))),
        }
    }
}
