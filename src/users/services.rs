use tracing::{info, instrument};

use super::{
    dto::UserUpdateRequest,
    repo::UserStore,
    repo_types::{UserChanges, UserWithOrders},
};
use crate::{
    auth::{password::hash_password, services::ensure_valid_email},
    error::{AppError, AppResult},
};

/// Validates the request and hashes a new password before it reaches the store.
pub fn changes_from_request(req: UserUpdateRequest) -> AppResult<UserChanges> {
    if let Some(email) = &req.email {
        ensure_valid_email(email)?;
    }
    let hashed_password = match req.password {
        Some(p) if p.is_empty() => {
            return Err(AppError::Validation("password must not be empty".into()));
        }
        Some(p) => Some(hash_password(&p)?),
        None => None,
    };
    Ok(UserChanges {
        email: req.email,
        full_name: req.full_name,
        hashed_password,
        is_active: req.is_active,
    })
}

#[instrument(skip(users, req))]
pub async fn update_user(
    users: &dyn UserStore,
    id: i64,
    req: UserUpdateRequest,
) -> AppResult<UserWithOrders> {
    let changes = changes_from_request(req)?;
    let updated = users
        .update(id, changes)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    info!(user_id = id, "user updated");
    Ok(updated)
}

#[instrument(skip(users))]
pub async fn delete_user(users: &dyn UserStore, id: i64) -> AppResult<()> {
    let found = users.get_by_id(id).await?.ok_or(AppError::NotFound("User"))?;
    users.delete(&found.user).await?;
    info!(user_id = id, orders = found.orders.len(), "user deleted");
    Ok(())
}
