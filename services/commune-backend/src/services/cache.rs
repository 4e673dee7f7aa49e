use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ports::secondary::{CacheError as Error, UserCache};
use crate::domain::User;

/// An in-process user cache with per-entry expiry. Entries are
/// dropped lazily, on the lookup that finds them stale.
#[derive(Debug)]
pub struct InMemoryUserCache {
    ttl: Duration,
    entries: RwLock<HashMap<Uuid, (User, Instant)>>,
}

impl InMemoryUserCache {
    pub fn new(ttl: Duration) -> Self {
        InMemoryUserCache {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserCache for InMemoryUserCache {
    #[tracing::instrument(name = "Fetching a user from the cache", skip(self))]
    async fn get(&self, id: &Uuid) -> Result<Option<User>, Error> {
        {
            let entries = self.entries.read().await;
            match entries.get(id) {
                Some((user, stored_at)) if stored_at.elapsed() < self.ttl => {
                    return Ok(Some(user.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // The entry was stale, drop it.
        let mut entries = self.entries.write().await;
        entries.remove(id);
        Ok(None)
    }

    #[tracing::instrument(name = "Storing a user in the cache", skip(self, user))]
    async fn set(&self, user: &User) -> Result<(), Error> {
        let mut entries = self.entries.write().await;
        entries.insert(user.id, (user.clone(), Instant::now()));
        Ok(())
    }

    #[tracing::instrument(name = "Invalidating a user in the cache", skip(self))]
    async fn invalidate(&self, id: &Uuid) -> Result<(), Error> {
        let mut entries = self.entries.write().await;
        entries.remove(id);
        Ok(())
    }
}
