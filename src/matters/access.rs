//! Who may touch which matter.
//!
//! A matter is visible to exactly its client and its assigned lawyer.
//! Documents carry no ACL of their own; they inherit the rule of their
//! matter. Decisions are recomputed from fresh rows on every call.

use tracing::warn;

use super::repo::MatterRepo;
use super::repo_types::Matter;
use crate::{
    auth::repo_types::{Role, User},
    error::AppError,
};

pub fn can_access_matter(user: &User, matter: &Matter) -> bool {
    user.id == matter.client_id || matter.lawyer_id == Some(user.id)
}

pub fn ensure_matter_access(user: &User, matter: &Matter) -> Result<(), AppError> {
    if can_access_matter(user, matter) {
        Ok(())
    } else {
        warn!(user_id = user.id, matter_id = matter.id, "matter access denied");
        Err(AppError::forbidden("Not allowed to access this matter"))
    }
}

/// Unknown roles never pass.
pub fn require_role(user: &User, role: Role) -> Result<(), AppError> {
    match user.role() {
        Some(r) if r == role => Ok(()),
        _ => Err(AppError::forbidden(format!("Not a {role}"))),
    }
}

/// Loads a matter and checks the caller against it: `NotFound` first,
/// then `Forbidden`.
pub async fn load_accessible_matter(
    matters: &dyn MatterRepo,
    user: &User,
    matter_id: i64,
) -> Result<Matter, AppError> {
    let matter = matters
        .find(matter_id)
        .await?
        .ok_or_else(|| AppError::not_found("Matter not found"))?;
    ensure_matter_access(user, &matter)?;
    Ok(matter)
}
