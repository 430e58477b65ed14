use axum::extract::{FromRef, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::http::extractor::{JsonPayload, PathId};
use crate::http::validation::{self, FOLLOW_CREATE};
use crate::http::{ApiContext, Error, Result};
use crate::models::follow::{DynFollowCtrl, Follow, NewFollow};

pub(crate) fn router() -> Router<ApiContext> {
    Router::new()
        .route("/follows", get(list_follows).post(create_follow))
        .route("/follows/:id", get(get_follow).delete(delete_follow))
        .route("/users/:id/follows", get(list_following))
        .route("/users/:id/followers", get(list_followers))
}

impl FromRef<ApiContext> for DynFollowCtrl {
    fn from_ref(ctx: &ApiContext) -> DynFollowCtrl {
        ctx.store.follow()
    }
}

async fn list_follows(follow_ctrl: State<DynFollowCtrl>) -> Result<Json<Vec<Follow>>> {
    Ok(Json(follow_ctrl.list_follows().await?))
}

/// Who `:id` follows.
async fn list_following(
    follow_ctrl: State<DynFollowCtrl>,
    PathId(user_id): PathId,
) -> Result<Json<Vec<Follow>>> {
    Ok(Json(follow_ctrl.follows_by_user(user_id).await?))
}

/// Who follows `:id`.
async fn list_followers(
    follow_ctrl: State<DynFollowCtrl>,
    PathId(user_id): PathId,
) -> Result<Json<Vec<Follow>>> {
    Ok(Json(follow_ctrl.followers_of(user_id).await?))
}

async fn get_follow(
    follow_ctrl: State<DynFollowCtrl>,
    PathId(follow_id): PathId,
) -> Result<Json<Follow>> {
    let follow = follow_ctrl
        .follow_by_id(follow_id)
        .await?
        .ok_or(Error::NotFound)?;

    Ok(Json(follow))
}

async fn create_follow(
    follow_ctrl: State<DynFollowCtrl>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<Follow>> {
    let new_follow: NewFollow = validation::decode(payload, FOLLOW_CREATE)?;

    // Neither user is looked up; following an unknown user is accepted as-is.
    let follow = follow_ctrl.create_follow(new_follow).await?;
    log::debug!("{} now follows {}", follow.user_id, follow.follow_id);

    Ok(Json(follow))
}

async fn delete_follow(
    follow_ctrl: State<DynFollowCtrl>,
    PathId(follow_id): PathId,
) -> Result<()> {
    if !follow_ctrl.delete_follow(follow_id).await? {
        return Err(Error::NotFound);
    }

    Ok(())
}
