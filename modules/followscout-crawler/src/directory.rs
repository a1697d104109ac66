//! Directory service: the two operations the crawl needs from the outside
//! world, composed as cache check → limiter-gated issue → parse.
//!
//! Failures degrade locally. A listing that cannot be fetched or parsed
//! reads as an empty, exhausted page; an attribute lookup that fails is
//! simply absent from the returned map. Nothing here retries and nothing
//! here aborts a batch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use tracing::warn;

use followscout_common::{AccountId, Cursor, ProfileRecord};
use twitter_client::{extract_profile, parse_following_page, TwitterClient};

use crate::cache::ResponseCache;
use crate::limiter::RateLimiter;

#[async_trait]
pub trait Directory: Send + Sync {
    /// Fetch exactly one page of accounts followed by `identity`, resuming
    /// at `cursor`. Returns the neighbor handles and the continuation
    /// cursor, `Cursor::Exhausted` when no further pages exist (or the
    /// page failed — fail-closed).
    async fn list_neighbors(&self, identity: &AccountId, cursor: &Cursor)
        -> (Vec<AccountId>, Cursor);

    /// Resolve profile attributes for a batch of identities, one request
    /// per identity, all in flight concurrently. Identities whose lookup
    /// failed are missing from the result.
    async fn fetch_attributes(
        &self,
        identities: &[AccountId],
    ) -> HashMap<AccountId, ProfileRecord>;
}

pub struct DirectoryService {
    client: TwitterClient,
    cache: Arc<dyn ResponseCache>,
    limiter: Arc<RateLimiter>,
}

impl DirectoryService {
    pub fn new(
        client: TwitterClient,
        cache: Arc<dyn ResponseCache>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            client,
            cache,
            limiter,
        }
    }

    /// Raw following-page body for `(identity, cursor)`, from cache when
    /// possible, otherwise issued under the rate budget and memoized.
    async fn following_body(&self, identity: &AccountId, cursor: &Cursor) -> Option<String> {
        let key = format!("following:{}:{}", identity, cursor.token().unwrap_or(""));
        if let Some(body) = self.cache.get(&key).await {
            return Some(body);
        }

        self.limiter.acquire().await;
        match self.client.following_page(identity.as_str(), cursor.token()).await {
            Ok(body) => {
                self.cache.put(&key, &body).await;
                Some(body)
            }
            Err(e) => {
                warn!(identity = %identity, error = %e, "Following page fetch failed");
                None
            }
        }
    }

    /// Raw about-account body for `identity`, cache-first as above.
    async fn about_body(&self, identity: &AccountId) -> Option<String> {
        let key = format!("about:{identity}");
        if let Some(body) = self.cache.get(&key).await {
            return Some(body);
        }

        self.limiter.acquire().await;
        match self.client.about_account(identity.as_str()).await {
            Ok(body) => {
                self.cache.put(&key, &body).await;
                Some(body)
            }
            Err(e) => {
                warn!(identity = %identity, error = %e, "Profile fetch failed");
                None
            }
        }
    }
}

#[async_trait]
impl Directory for DirectoryService {
    async fn list_neighbors(
        &self,
        identity: &AccountId,
        cursor: &Cursor,
    ) -> (Vec<AccountId>, Cursor) {
        if cursor.is_exhausted() {
            return (vec![], Cursor::Exhausted);
        }

        let Some(body) = self.following_body(identity, cursor).await else {
            return (vec![], Cursor::Exhausted);
        };

        let page = match parse_following_page(&body) {
            Ok(page) => page,
            Err(e) => {
                warn!(identity = %identity, error = %e, "Malformed following page");
                return (vec![], Cursor::Exhausted);
            }
        };

        let neighbors: Vec<AccountId> = page
            .following
            .iter()
            .filter(|user| !user.screen_name.is_empty())
            .map(|user| AccountId::new(&user.screen_name))
            .collect();

        let next_cursor = match (page.more_users, page.next_cursor) {
            (true, Some(token)) => Cursor::Next(token),
            _ => Cursor::Exhausted,
        };

        (neighbors, next_cursor)
    }

    async fn fetch_attributes(
        &self,
        identities: &[AccountId],
    ) -> HashMap<AccountId, ProfileRecord> {
        let lookups = identities.iter().map(|identity| async move {
            let body = self.about_body(identity).await?;
            match extract_profile(&body) {
                Ok(info) => Some((identity.clone(), ProfileRecord::from_info(info))),
                Err(e) => {
                    warn!(identity = %identity, error = %e, "Malformed profile response");
                    None
                }
            }
        });

        future::join_all(lookups).await.into_iter().flatten().collect()
    }
}
