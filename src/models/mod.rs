use sqlx::PgPool;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

pub mod follow;
pub mod tweet;
pub mod user;

#[cfg(test)]
pub mod memory;

use follow::{DynFollowCtrl, FollowController};
use tweet::{DynTweetCtrl, TweetController};
use user::{DynUserCtrl, UserController};

pub type DynStore = Arc<dyn StoreTrait + Send + Sync>;

/// One document collection per resource type.
///
/// Handlers never see the pool, only these controllers, which is what lets the tests swap
/// in mocks or the in-memory store.
#[cfg_attr(test, automock)]
pub trait StoreTrait {
    fn tweet(&self) -> DynTweetCtrl;
    fn user(&self) -> DynUserCtrl;
    fn follow(&self) -> DynFollowCtrl;
}

#[derive(Clone)]
pub struct Store {
    tweet: Arc<TweetController>,
    user: Arc<UserController>,
    follow: Arc<FollowController>,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        let tweet = Arc::new(TweetController::new(pool.clone()));
        let user = Arc::new(UserController::new(pool.clone()));
        let follow = Arc::new(FollowController::new(pool));
        Self {
            tweet,
            user,
            follow,
        }
    }
}

impl StoreTrait for Store {
    fn tweet(&self) -> DynTweetCtrl {
        self.tweet.clone()
    }

    fn user(&self) -> DynUserCtrl {
        self.user.clone()
    }

    fn follow(&self) -> DynFollowCtrl {
        self.follow.clone()
    }
}
