use super::identity::InMemoryDirectory;
use crate::domain::course::{Course, CourseDraft};
use crate::domain::ports::CourseStore;
use crate::domain::user::{User, UserId};
use crate::error::{PortalError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSession {
    pub token: String,
    pub user_id: UserId,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Bootstrap data: directory users, their bearer sessions, and courses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub users: Vec<User>,
    pub sessions: Vec<SeedSession>,
    pub courses: Vec<CourseDraft>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub sessions: usize,
    pub courses: usize,
    pub skipped_courses: usize,
}

impl Seed {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Loads users and sessions into the directory and courses into the store.
    ///
    /// Courses whose code already exists are skipped, so a persistent store
    /// can be seeded on every start.
    pub async fn apply(
        self,
        directory: &InMemoryDirectory,
        courses: &dyn CourseStore,
    ) -> Result<SeedSummary> {
        let mut summary = SeedSummary::default();
        for user in self.users {
            directory.add_user(user).await?;
            summary.users += 1;
        }
        for session in self.sessions {
            directory
                .register_token(session.token, session.user_id, session.expires_at)
                .await?;
            summary.sessions += 1;
        }
        for draft in self.courses {
            let course = Course::create(draft, Utc::now())?;
            match courses.insert(course.clone()).await {
                Ok(()) => summary.courses += 1,
                Err(PortalError::Conflict(_)) => {
                    debug!(code = %course.code, "course already present, skipping");
                    summary.skipped_courses += 1;
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            users = summary.users,
            sessions = summary.sessions,
            courses = summary.courses,
            skipped_courses = summary.skipped_courses,
            "seed applied"
        );
        Ok(summary)
    }
}
