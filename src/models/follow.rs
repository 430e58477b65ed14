use crate::http::types::ObjectId;
use crate::http::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::PgPool;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

/// A directed edge: `user_id` follows `follow_id`.
///
/// Neither end is checked against the `user` table, and the same edge may be stored twice.
#[derive(serde::Serialize, sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub follow_id: ObjectId,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewFollow {
    pub user_id: ObjectId,
    pub follow_id: ObjectId,
}

#[derive(Clone)]
pub struct FollowController {
    pool: PgPool,
}

impl FollowController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub type DynFollowCtrl = Arc<dyn FollowCtrlTrait + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait FollowCtrlTrait {
    async fn list_follows(&self) -> Result<Vec<Follow>>;
    /// Edges going out of `user_id`, i.e. who they follow.
    async fn follows_by_user(&self, user_id: ObjectId) -> Result<Vec<Follow>>;
    /// Edges coming into `user_id`, i.e. who follows them.
    async fn followers_of(&self, user_id: ObjectId) -> Result<Vec<Follow>>;
    async fn follow_by_id(&self, follow_id: ObjectId) -> Result<Option<Follow>>;
    async fn create_follow(&self, new_follow: NewFollow) -> Result<Follow>;
    async fn delete_follow(&self, follow_id: ObjectId) -> Result<bool>;
}

#[async_trait]
impl FollowCtrlTrait for FollowController {
    async fn list_follows(&self) -> Result<Vec<Follow>> {
        let follows: Vec<_> = sqlx::query_as::<_, Follow>(
            "select id, user_id, follow_id from follow order by created_at desc, seq desc",
        )
        .fetch(&self.pool)
        .try_collect()
        .await?;

        Ok(follows)
    }

    async fn follows_by_user(&self, user_id: ObjectId) -> Result<Vec<Follow>> {
        let follows: Vec<_> = sqlx::query_as::<_, Follow>(
            r#"
                select id, user_id, follow_id
                from follow
                where user_id = $1
                order by created_at desc, seq desc
            "#,
        )
        .bind(user_id)
        .fetch(&self.pool)
        .try_collect()
        .await?;

        Ok(follows)
    }

    async fn followers_of(&self, user_id: ObjectId) -> Result<Vec<Follow>> {
        let follows: Vec<_> = sqlx::query_as::<_, Follow>(
            r#"
                select id, user_id, follow_id
                from follow
                where follow_id = $1
                order by created_at desc, seq desc
            "#,
        )
        .bind(user_id)
        .fetch(&self.pool)
        .try_collect()
        .await?;

        Ok(follows)
    }

    async fn follow_by_id(&self, follow_id: ObjectId) -> Result<Option<Follow>> {
        let follow = sqlx::query_as::<_, Follow>(
            "select id, user_id, follow_id from follow where id = $1",
        )
        .bind(follow_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(follow)
    }

    async fn create_follow(&self, new_follow: NewFollow) -> Result<Follow> {
        // No existence check on either user and no `on conflict`: following someone twice
        // stores two edges.
        let follow = sqlx::query_as::<_, Follow>(
            r#"
                insert into follow (id, user_id, follow_id)
                values ($1, $2, $3)
                returning id, user_id, follow_id
            "#,
        )
        .bind(ObjectId::generate())
        .bind(new_follow.user_id)
        .bind(new_follow.follow_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(follow)
    }

    async fn delete_follow(&self, follow_id: ObjectId) -> Result<bool> {
        let result = sqlx::query("delete from follow where id = $1")
            .bind(follow_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
