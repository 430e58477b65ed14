use crate::http::types::{ObjectId, Timestamptz};
use crate::http::{Error, Result, ResultExt};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::PgPool;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

#[derive(serde::Serialize, sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// The owning user. Never checked against the user service.
    pub user_id: ObjectId,
    pub content: String,
    pub created_at: Timestamptz,
}

/// A tweet that has passed `validation::TWEET_CREATE`.
///
/// There's deliberately no `id` or `created_at` here; both are assigned by the store.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTweet {
    pub user_id: ObjectId,
    pub content: String,
}

#[derive(Clone)]
pub struct TweetController {
    pool: PgPool,
}

impl TweetController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub type DynTweetCtrl = Arc<dyn TweetCtrlTrait + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TweetCtrlTrait {
    /// Every tweet, newest first.
    async fn list_tweets(&self) -> Result<Vec<Tweet>>;
    /// Tweets owned by `user_id`, newest first.
    async fn tweets_by_owner(&self, user_id: ObjectId) -> Result<Vec<Tweet>>;
    async fn tweet_by_id(&self, tweet_id: ObjectId) -> Result<Option<Tweet>>;
    async fn create_tweet(&self, new_tweet: NewTweet) -> Result<Tweet>;
    /// Returns `false` if there was no such tweet.
    async fn delete_tweet(&self, tweet_id: ObjectId) -> Result<bool>;
}

#[async_trait]
impl TweetCtrlTrait for TweetController {
    async fn list_tweets(&self) -> Result<Vec<Tweet>> {
        let tweets: Vec<_> = sqlx::query_as::<_, Tweet>(
            // language=PostgreSQL
            r#"
                select id, user_id, content, created_at
                from tweet
                -- `seq` breaks ties between tweets created in the same instant
                order by created_at desc, seq desc
            "#,
        )
        .fetch(&self.pool)
        .try_collect()
        .await?;

        Ok(tweets)
    }

    async fn tweets_by_owner(&self, user_id: ObjectId) -> Result<Vec<Tweet>> {
        let tweets: Vec<_> = sqlx::query_as::<_, Tweet>(
            // language=PostgreSQL
            r#"
                select id, user_id, content, created_at
                from tweet
                where user_id = $1
                order by created_at desc, seq desc
            "#,
        )
        .bind(user_id)
        .fetch(&self.pool)
        .try_collect()
        .await?;

        Ok(tweets)
    }

    async fn tweet_by_id(&self, tweet_id: ObjectId) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(
            r#"select id, user_id, content, created_at from tweet where id = $1"#,
        )
        .bind(tweet_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    async fn create_tweet(&self, new_tweet: NewTweet) -> Result<Tweet> {
        let tweet = sqlx::query_as::<_, Tweet>(
            // language=PostgreSQL
            r#"
                insert into tweet (id, user_id, content)
                values ($1, $2, $3)
                returning id, user_id, content, created_at
            "#,
        )
        .bind(ObjectId::generate())
        .bind(new_tweet.user_id)
        .bind(new_tweet.content)
        .fetch_one(&self.pool)
        .await
        .on_constraint("tweet_content_not_blank", |_| {
            Error::validation_failed("content", "must not be blank")
        })?;

        Ok(tweet)
    }

    async fn delete_tweet(&self, tweet_id: ObjectId) -> Result<bool> {
        let result = sqlx::query("delete from tweet where id = $1")
            .bind(tweet_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
