use crate::database::models::user::{User, UserLookup};
use crate::database::Database;

/// Look up the user named by a session claim.
///
/// A claim is only a hint: the account may have been deleted since it was
/// issued. Missing accounts and storage failures both resolve to anonymous.
/// Disabled accounts are returned as-is; the gate decides what to do with them.
pub async fn resolve_user(db: &Database, claimed: Option<i64>) -> Option<User> {
    let id = claimed?;

    match User::find(&mut db.token(), UserLookup::Id(id)).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            tracing::warn!("Session refers to missing user ID {}", id);
            None
        }
        Err(e) => {
            tracing::error!("Failed to resolve session user ID {}: {}", id, e);
            None
        }
    }
}
