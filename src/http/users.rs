use axum::extract::{FromRef, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::http::extractor::{JsonPayload, PathId};
use crate::http::validation::{self, USER_CREATE, USER_UPDATE};
use crate::http::{ApiContext, Error, Result};
use crate::models::user::{DynUserCtrl, NewUser, UpdateUser, User};

pub(crate) fn router() -> Router<ApiContext> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

impl FromRef<ApiContext> for DynUserCtrl {
    fn from_ref(ctx: &ApiContext) -> DynUserCtrl {
        ctx.store.user()
    }
}

async fn list_users(user_ctrl: State<DynUserCtrl>) -> Result<Json<Vec<User>>> {
    Ok(Json(user_ctrl.list_users().await?))
}

async fn get_user(
    user_ctrl: State<DynUserCtrl>,
    PathId(user_id): PathId,
) -> Result<Json<User>> {
    let user = user_ctrl
        .user_by_id(user_id)
        .await?
        .ok_or(Error::NotFound)?;

    Ok(Json(user))
}

async fn create_user(
    user_ctrl: State<DynUserCtrl>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<User>> {
    let new_user: NewUser = validation::decode(payload, USER_CREATE)?;

    let user = user_ctrl.create_user(new_user).await?;
    log::debug!("created user {}", user.id);

    Ok(Json(user))
}

// Semantically, because this route allows a partial update it should be `PATCH`, not `PUT`.
// However, existing clients use `PUT` so `PUT` it is.
async fn update_user(
    user_ctrl: State<DynUserCtrl>,
    PathId(user_id): PathId,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<User>> {
    let update: UpdateUser = validation::decode(payload, USER_UPDATE)?;

    let user = if update == UpdateUser::default() {
        // If there's no fields to update, this is effectively a `GET`.
        user_ctrl.user_by_id(user_id).await?
    } else {
        user_ctrl.update_user(user_id, update).await?
    };

    Ok(Json(user.ok_or(Error::NotFound)?))
}

async fn delete_user(
    user_ctrl: State<DynUserCtrl>,
    PathId(user_id): PathId,
) -> Result<()> {
    // Follows pointing at or from this user are left alone.
    if !user_ctrl.delete_user(user_id).await? {
        return Err(Error::NotFound);
    }

    log::debug!("deleted user {}", user_id);
    Ok(())
}
