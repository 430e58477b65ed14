//! An in-memory stand-in for the Postgres store, used by handler tests that need state to
//! persist across requests (ordering, delete-then-get and so on).
//!
//! It mirrors the SQL ordering exactly: `created_at desc`, then insertion order, newest first.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::http::types::{ObjectId, Timestamptz};
use crate::http::Result;
use crate::models::follow::{DynFollowCtrl, Follow, FollowCtrlTrait, NewFollow};
use crate::models::tweet::{DynTweetCtrl, NewTweet, Tweet, TweetCtrlTrait};
use crate::models::user::{DynUserCtrl, NewUser, UpdateUser, User, UserCtrlTrait};
use crate::models::StoreTrait;

fn now() -> Timestamptz {
    Timestamptz(OffsetDateTime::now_utc())
}

struct Record<T> {
    seq: u64,
    created_at: Timestamptz,
    doc: T,
}

#[derive(Default)]
struct Collections {
    seq: u64,
    tweets: Vec<Record<Tweet>>,
    users: Vec<Record<User>>,
    follows: Vec<Record<Follow>>,
}

impl Collections {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

fn newest_first<T: Clone>(records: &[Record<T>], filter: impl Fn(&T) -> bool) -> Vec<T> {
    let mut matching: Vec<&Record<T>> = records.iter().filter(|r| filter(&r.doc)).collect();
    matching.sort_by(|a, b| (b.created_at, b.seq).cmp(&(a.created_at, a.seq)));
    matching.into_iter().map(|r| r.doc.clone()).collect()
}

fn remove<T>(records: &mut Vec<Record<T>>, matches: impl Fn(&T) -> bool) -> bool {
    let before = records.len();
    records.retain(|r| !matches(&r.doc));
    records.len() != before
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn seed_tweet(&self, tweet: Tweet) {
        let mut inner = self.inner.lock().unwrap();
        let seq = inner.next_seq();
        inner.tweets.push(Record {
            seq,
            created_at: tweet.created_at,
            doc: tweet,
        });
    }

    pub fn seed_user(&self, user: User) {
        let mut inner = self.inner.lock().unwrap();
        let seq = inner.next_seq();
        inner.users.push(Record {
            seq,
            created_at: now(),
            doc: user,
        });
    }

    pub fn seed_follow(&self, follow: Follow) {
        let mut inner = self.inner.lock().unwrap();
        let seq = inner.next_seq();
        inner.follows.push(Record {
            seq,
            created_at: now(),
            doc: follow,
        });
    }

    pub fn tweet_count(&self) -> usize {
        self.inner.lock().unwrap().tweets.len()
    }

    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }
}

impl StoreTrait for MemoryStore {
    fn tweet(&self) -> DynTweetCtrl {
        Arc::new(self.clone())
    }

    fn user(&self) -> DynUserCtrl {
        Arc::new(self.clone())
    }

    fn follow(&self) -> DynFollowCtrl {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl TweetCtrlTrait for MemoryStore {
    async fn list_tweets(&self) -> Result<Vec<Tweet>> {
        Ok(newest_first(&self.inner.lock().unwrap().tweets, |_| true))
    }

    async fn tweets_by_owner(&self, user_id: ObjectId) -> Result<Vec<Tweet>> {
        Ok(newest_first(&self.inner.lock().unwrap().tweets, |t| {
            t.user_id == user_id
        }))
    }

    async fn tweet_by_id(&self, tweet_id: ObjectId) -> Result<Option<Tweet>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tweets
            .iter()
            .find(|r| r.doc.id == tweet_id)
            .map(|r| r.doc.clone()))
    }

    async fn create_tweet(&self, new_tweet: NewTweet) -> Result<Tweet> {
        let tweet = Tweet {
            id: ObjectId::generate(),
            user_id: new_tweet.user_id,
            content: new_tweet.content,
            created_at: now(),
        };
        self.seed_tweet(tweet.clone());
        Ok(tweet)
    }

    async fn delete_tweet(&self, tweet_id: ObjectId) -> Result<bool> {
        Ok(remove(&mut self.inner.lock().unwrap().tweets, |t| {
            t.id == tweet_id
        }))
    }
}

#[async_trait]
impl UserCtrlTrait for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(newest_first(&self.inner.lock().unwrap().users, |_| true))
    }

    async fn user_by_id(&self, user_id: ObjectId) -> Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|r| r.doc.id == user_id)
            .map(|r| r.doc.clone()))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let user = User {
            id: ObjectId::generate(),
            name: new_user.name,
            avatar_url: new_user.avatar_url,
        };
        self.seed_user(user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        user_id: ObjectId,
        update_user: UpdateUser,
    ) -> Result<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(record) = inner.users.iter_mut().find(|r| r.doc.id == user_id) else {
            return Ok(None);
        };
        if let Some(name) = update_user.name {
            record.doc.name = name;
        }
        if let Some(avatar_url) = update_user.avatar_url {
            record.doc.avatar_url = Some(avatar_url);
        }
        Ok(Some(record.doc.clone()))
    }

    async fn delete_user(&self, user_id: ObjectId) -> Result<bool> {
        Ok(remove(&mut self.inner.lock().unwrap().users, |u| {
            u.id == user_id
        }))
    }
}

#[async_trait]
impl FollowCtrlTrait for MemoryStore {
    async fn list_follows(&self) -> Result<Vec<Follow>> {
        Ok(newest_first(&self.inner.lock().unwrap().follows, |_| true))
    }

    async fn follows_by_user(&self, user_id: ObjectId) -> Result<Vec<Follow>> {
        Ok(newest_first(&self.inner.lock().unwrap().follows, |f| {
            f.user_id == user_id
        }))
    }

    async fn followers_of(&self, user_id: ObjectId) -> Result<Vec<Follow>> {
        Ok(newest_first(&self.inner.lock().unwrap().follows, |f| {
            f.follow_id == user_id
        }))
    }

    async fn follow_by_id(&self, follow_id: ObjectId) -> Result<Option<Follow>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .follows
            .iter()
            .find(|r| r.doc.id == follow_id)
            .map(|r| r.doc.clone()))
    }

    async fn create_follow(&self, new_follow: NewFollow) -> Result<Follow> {
        let follow = Follow {
            id: ObjectId::generate(),
            user_id: new_follow.user_id,
            follow_id: new_follow.follow_id,
        };
        self.seed_follow(follow.clone());
        Ok(follow)
    }

    async fn delete_follow(&self, follow_id: ObjectId) -> Result<bool> {
        Ok(remove(&mut self.inner.lock().unwrap().follows, |f| {
            f.id == follow_id
        }))
    }
}
