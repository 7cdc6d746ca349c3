use crate::domain::user::{Role, User};
use crate::error::{PortalError, Result};

pub const STAFF: &[Role] = &[Role::Faculty, Role::Admin];
pub const ADMIN: &[Role] = &[Role::Admin];
pub const STUDENT: &[Role] = &[Role::Student];

/// Fails with `Forbidden` unless the caller holds one of `allowed`.
pub fn require_role(caller: &User, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&caller.role) {
        Ok(())
    } else {
        let names: Vec<String> = allowed.iter().map(Role::to_string).collect();
        Err(PortalError::Forbidden(format!(
            "Access denied. {} only.",
            names.join(" or ")
        )))
    }
}
