use super::user::UserId;
use crate::error::{PortalError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub Uuid);

impl CourseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CourseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Weight of a course in the GPA, between 1 and 6 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CreditHours(u8);

impl CreditHours {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;
    /// Used for grades whose course can no longer be resolved.
    pub const DEFAULT: Self = Self(3);

    pub fn new(hours: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&hours) {
            Ok(Self(hours))
        } else {
            Err(PortalError::validation(format!(
                "credit hours must be between {} and {}, got {hours}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for CreditHours {
    type Error = PortalError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CreditHours> for u8 {
    fn from(hours: CreditHours) -> Self {
        hours.0
    }
}

impl From<CreditHours> for Decimal {
    fn from(hours: CreditHours) -> Self {
        Decimal::from(hours.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub credit_hours: CreditHours,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<UserId>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(rename = "isActive")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields an admin supplies when creating a course.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    #[serde(default)]
    pub id: Option<CourseId>,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub credit_hours: u8,
    pub department: String,
    #[serde(default)]
    pub instructor: Option<UserId>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

/// Replacement values for an existing course. The code is fixed at creation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseChanges {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub credit_hours: u8,
    pub department: String,
    #[serde(default)]
    pub instructor: Option<UserId>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default, rename = "isActive")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CourseFilter {
    pub department: Option<String>,
    pub active: Option<bool>,
}

impl CourseFilter {
    pub fn matches(&self, course: &Course) -> bool {
        self.department
            .as_deref()
            .is_none_or(|department| course.department == department)
            && self.active.is_none_or(|active| course.active == active)
    }
}

pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(PortalError::validation(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

impl Course {
    /// Builds a new active course, validating the draft.
    pub fn create(draft: CourseDraft, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id: draft.id.unwrap_or_default(),
            code: required("course code", &draft.code)?,
            name: required("course name", &draft.name)?,
            description: draft.description,
            credit_hours: CreditHours::new(draft.credit_hours)?,
            department: required("department", &draft.department)?,
            instructor: draft.instructor,
            prerequisites: draft.prerequisites,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, changes: CourseChanges, now: DateTime<Utc>) -> Result<()> {
        let name = required("course name", &changes.name)?;
        let credit_hours = CreditHours::new(changes.credit_hours)?;
        let department = required("department", &changes.department)?;

        self.name = name;
        self.description = changes.description;
        self.credit_hours = credit_hours;
        self.department = department;
        self.instructor = changes.instructor;
        self.prerequisites = changes.prerequisites;
        if let Some(active) = changes.active {
            self.active = active;
        }
        self.updated_at = now;
        Ok(())
    }
}
