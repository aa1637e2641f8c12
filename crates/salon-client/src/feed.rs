//! The live message feed.
//!
//! One mounted feed view owns exactly one subscription.  Renders are
//! driven solely by the subscription's snapshot deliveries: the feed keeps
//! the latest ordered snapshot, bumps a revision counter the view can hook
//! for follow-scroll, and performs no local re-sort, trusting the store's
//! ordering.

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use salon_shared::{validation, Topic, ValidationError};
use salon_store::{ChatMessage, Store, Subscription, UserProfile, WatchEvent};

use crate::error::ClientError;

/// Lifecycle of the feed's subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Unsubscribed,
    Subscribing,
    Active,
    /// Terminal.  No automatic retry; the caller decides whether to mount
    /// a new feed.
    Error,
    Cancelled,
}

/// A mounted feed over one topic.
pub struct MessageFeed {
    store: Store,
    topic: Topic,
    subscription: Option<Subscription>,
    messages: Vec<ChatMessage>,
    state: FeedState,
    revision_tx: watch::Sender<u64>,
}

impl MessageFeed {
    /// A feed that has not subscribed yet.
    pub fn new(store: Store, topic: Topic) -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            store,
            topic,
            subscription: None,
            messages: Vec::new(),
            state: FeedState::Unsubscribed,
            revision_tx,
        }
    }

    /// Open the subscription.  The feed starts with an empty local view;
    /// the store delivers the initial snapshot as the first event.
    pub async fn subscribe(&mut self) -> Result<(), ClientError> {
        self.state = FeedState::Subscribing;
        match self.store.watch_messages(&self.topic).await {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                self.state = FeedState::Active;
                info!(topic = %self.topic, "feed mounted");
                Ok(())
            }
            Err(e) => {
                warn!(topic = %self.topic, error = %e, "feed subscription failed");
                self.state = FeedState::Error;
                Err(e.into())
            }
        }
    }

    /// Convenience: build and subscribe in one step.
    pub async fn mount(store: Store, topic: Topic) -> Result<Self, ClientError> {
        let mut feed = Self::new(store, topic);
        feed.subscribe().await?;
        Ok(feed)
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// The messages of the last delivered snapshot, in delivered order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Observe snapshot arrivals.  The value is a revision counter that
    /// increments once per applied snapshot; the view hooks this for its
    /// follow-scroll behaviour.
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    /// Await and apply the next snapshot.  Returns the refreshed view, or
    /// `None` once the subscription has ended (cancelled, failed, or
    /// closed by the remote side).
    pub async fn next_snapshot(&mut self) -> Option<&[ChatMessage]> {
        let subscription = self.subscription.as_mut()?;
        match subscription.next().await {
            Some(WatchEvent::Snapshot(docs)) => {
                self.messages = ChatMessage::many_from_documents(docs);
                self.state = FeedState::Active;
                self.revision_tx.send_modify(|rev| *rev += 1);
                debug!(topic = %self.topic, count = self.messages.len(), "snapshot applied");
                Some(&self.messages)
            }
            Some(WatchEvent::Error(e)) => {
                warn!(topic = %self.topic, error = %e, "feed subscription errored");
                self.state = FeedState::Error;
                None
            }
            None => {
                if self.state != FeedState::Cancelled {
                    self.state = FeedState::Error;
                }
                None
            }
        }
    }

    /// Build a message for this feed's topic from the sender's profile.
    /// The length check runs here, before `send` is ever reachable.
    pub fn compose(
        &self,
        profile: &UserProfile,
        text: &str,
        clock: &mut MessageClock,
    ) -> Result<ChatMessage, ValidationError> {
        validation::validate_message_body(text)?;
        Ok(ChatMessage {
            uid: profile.uid.clone(),
            name: profile.name.clone(),
            img: profile.img.clone(),
            text: text.to_string(),
            timestamp: clock.next(),
            topic: self.topic.clone(),
        })
    }

    /// Append one composed message.  At-least-once: a failure does not
    /// imply the message was not stored.
    pub async fn send(&self, message: &ChatMessage) -> Result<(), ClientError> {
        self.store.insert_message(message).await?;
        Ok(())
    }

    /// Tear the feed down.  Cancels the subscription; nothing is delivered
    /// afterwards, buffered or not.
    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.cancel();
        }
        self.state = FeedState::Cancelled;
        info!(topic = %self.topic, "feed unmounted");
    }
}

impl Drop for MessageFeed {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.cancel();
        }
    }
}

/// Per-client message timestamps: decimal milliseconds since the epoch,
/// guaranteed strictly increasing within this process even when two sends
/// land in the same millisecond.
#[derive(Debug, Default)]
pub struct MessageClock {
    last_ms: i64,
}

impl MessageClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        let stamped = if now <= self.last_ms {
            self.last_ms + 1
        } else {
            now
        };
        self.last_ms = stamped;
        stamped.to_string()
    }
}

/// Decides the view's follow-scroll behaviour after a snapshot render:
/// keep following only when the viewer was already at (or near) the
/// bottom of the feed.
#[derive(Debug, Clone, Copy)]
pub struct FollowScroll {
    /// How close to the bottom still counts as "at the bottom".
    pub threshold_px: f64,
}

impl Default for FollowScroll {
    fn default() -> Self {
        Self { threshold_px: 32.0 }
    }
}

impl FollowScroll {
    /// `true` when the pre-update scroll position warrants jumping to the
    /// new bottom.
    pub fn should_follow(&self, scroll_top: f64, viewport_height: f64, content_height: f64) -> bool {
        content_height - (scroll_top + viewport_height) <= self.threshold_px
    }
}
