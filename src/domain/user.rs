use crate::error::{PortalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// A person known to the identity provider.
///
/// Grades and payments only ever hold a `UserId`; the full record is resolved
/// through the `UserDirectory` port when a name, e-mail or phone is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, rename = "isPhoneVerified")]
    pub phone_verified: bool,
    #[serde(default = "active_by_default", rename = "isActive")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// The number an SMS may be sent to, if the student confirmed it.
    pub fn verified_phone(&self) -> Option<&str> {
        match &self.phone_number {
            Some(phone) if self.phone_verified && !phone.trim().is_empty() => Some(phone),
            _ => None,
        }
    }

    /// Checks that a student number is present exactly when the role is student.
    pub fn validate(&self) -> Result<()> {
        let has_number = self
            .student_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        match (self.role, has_number) {
            (Role::Student, false) => Err(PortalError::validation(format!(
                "student {} has no student id",
                self.id
            ))),
            (Role::Faculty | Role::Admin, true) => Err(PortalError::validation(format!(
                "{} user {} must not carry a student id",
                self.role, self.id
            ))),
            _ => Ok(()),
        }
    }
}

/// The subset of a user that is safe to embed in listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            student_id: user.student_id.clone(),
        }
    }
}
