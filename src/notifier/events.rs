use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Content item as delivered by the blog platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub post_type: String,
    pub permalink: String,
}

/// A post moving from one status to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStatusTransition {
    pub new_status: String,
    pub old_status: String,
    pub post: Post,
}

#[async_trait]
pub trait PostStatusHandler: Send + Sync {
    async fn on_transition(&self, transition: &PostStatusTransition);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscribers = Vec<(SubscriptionId, Arc<dyn PostStatusHandler>)>;

/// In-process channel for post status transitions.
///
/// Emission runs every subscribed handler in subscription order on the
/// caller's task and waits for each before starting the next.
#[derive(Default)]
pub struct PostEvents {
    next_id: AtomicU64,
    subscribers: Mutex<Subscribers>,
}

impl PostEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: Arc<dyn PostStatusHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers().push((id, handler));
        debug!("Post status subscriber {:?} registered", id);
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        before != subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }

    /// Deliver `transition` to every current subscriber; returns how many ran.
    pub async fn emit(&self, transition: &PostStatusTransition) -> usize {
        // Snapshot so handlers can (un)subscribe without deadlocking.
        let handlers: Vec<Arc<dyn PostStatusHandler>> = self
            .subscribers()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in &handlers {
            handler.on_transition(transition).await;
        }
        handlers.len()
    }

    fn subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
