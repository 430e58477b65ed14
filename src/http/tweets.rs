use axum::extract::{FromRef, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::http::extractor::{JsonPayload, PathId, QueryParams};
use crate::http::types::ObjectId;
use crate::http::validation::{self, TWEET_CREATE};
use crate::http::{ApiContext, Error, Result};
use crate::models::tweet::{DynTweetCtrl, NewTweet, Tweet};

pub(crate) fn router() -> Router<ApiContext> {
    // There's no `PUT /tweets/:id`; a tweet is immutable once posted.
    Router::new()
        .route("/tweets", get(list_tweets).post(create_tweet))
        .route("/tweets/:id", get(get_tweet).delete(delete_tweet))
}

impl FromRef<ApiContext> for DynTweetCtrl {
    fn from_ref(ctx: &ApiContext) -> DynTweetCtrl {
        ctx.store.tweet()
    }
}

#[derive(serde::Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ListTweetsQuery {
    /// Only list tweets owned by this user.
    user_id: Option<String>,
}

async fn list_tweets(
    tweet_ctrl: State<DynTweetCtrl>,
    QueryParams(query): QueryParams<ListTweetsQuery>,
) -> Result<Json<Vec<Tweet>>> {
    let tweets = match query.user_id {
        Some(user_id) => {
            let user_id: ObjectId = user_id.parse()?;
            tweet_ctrl.tweets_by_owner(user_id).await?
        }
        None => tweet_ctrl.list_tweets().await?,
    };

    Ok(Json(tweets))
}

async fn get_tweet(
    tweet_ctrl: State<DynTweetCtrl>,
    PathId(tweet_id): PathId,
) -> Result<Json<Tweet>> {
    let tweet = tweet_ctrl
        .tweet_by_id(tweet_id)
        .await?
        .ok_or(Error::NotFound)?;

    Ok(Json(tweet))
}

async fn create_tweet(
    tweet_ctrl: State<DynTweetCtrl>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<Tweet>> {
    let new_tweet: NewTweet = validation::decode(payload, TWEET_CREATE)?;

    let tweet = tweet_ctrl.create_tweet(new_tweet).await?;
    log::debug!("created tweet {} for user {}", tweet.id, tweet.user_id);

    Ok(Json(tweet))
}

async fn delete_tweet(
    tweet_ctrl: State<DynTweetCtrl>,
    PathId(tweet_id): PathId,
) -> Result<()> {
    if !tweet_ctrl.delete_tweet(tweet_id).await? {
        return Err(Error::NotFound);
    }

    log::debug!("deleted tweet {}", tweet_id);
    Ok(())
}
