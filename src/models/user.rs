use crate::http::types::ObjectId;
use crate::http::{Error, Result, ResultExt};
use async_trait::async_trait;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")] // fill in any missing fields with `..UpdateUser::default()`
pub struct UpdateUser {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Clone)]
pub struct UserController {
    pool: PgPool,
}

impl UserController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub type DynUserCtrl = Arc<dyn UserCtrlTrait + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserCtrlTrait {
    /// Every user, most recently created first.
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn user_by_id(&self, user_id: ObjectId) -> Result<Option<User>>;
    async fn create_user(&self, new_user: NewUser) -> Result<User>;
    /// Returns `None` if there was no such user. Fields left as `None` are unchanged.
    async fn update_user(&self, user_id: ObjectId, update_user: UpdateUser)
        -> Result<Option<User>>;
    /// Returns `false` if there was no such user.
    async fn delete_user(&self, user_id: ObjectId) -> Result<bool>;
}

#[async_trait]
impl UserCtrlTrait for UserController {
    async fn list_users(&self) -> Result<Vec<User>> {
        let users: Vec<_> = sqlx::query_as::<_, User>(
            r#"select id, name, avatar_url from "user" order by created_at desc, seq desc"#,
        )
        .fetch(&self.pool)
        .try_collect()
        .await?;

        Ok(users)
    }

    async fn user_by_id(&self, user_id: ObjectId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
                select id, name, avatar_url
                from "user" where id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#" insert into "user" (id, name, avatar_url) values ($1, $2, $3)
            returning id, name, avatar_url"#,
        )
        .bind(ObjectId::generate())
        .bind(new_user.name)
        .bind(new_user.avatar_url)
        .fetch_one(&self.pool)
        .await
        .on_constraint("user_name_not_blank", |_| {
            Error::validation_failed("name", "must not be blank")
        })?;

        Ok(user)
    }

    async fn update_user(
        &self,
        user_id: ObjectId,
        update_user: UpdateUser,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            update "user"
            set name = coalesce($1, "user".name),
                avatar_url = coalesce($2, "user".avatar_url)
            where id = $3
            returning id, name, avatar_url
        "#,
        )
        .bind(update_user.name)
        .bind(update_user.avatar_url)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .on_constraint("user_name_not_blank", |_| {
            Error::validation_failed("name", "must not be blank")
        })?;

        Ok(user)
    }

    async fn delete_user(&self, user_id: ObjectId) -> Result<bool> {
        let result = sqlx::query(r#"delete from "user" where id = $1"#)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
