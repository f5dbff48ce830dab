//! # Session Store Module
//!
//! Per-chat conversation state: the pending input of an in-progress flow
//! and the product listing used for pagination.
//!
//! Entries for different chats live in separate shards of a `DashMap`, so
//! concurrent messages from different chats never wait on each other.
//! Entries idle longer than the configured timeout are treated as expired
//! and removed by [`SessionStore::evict_idle`].

use dashmap::DashMap;
use std::time::{Duration, Instant};
use teloxide::types::ChatId;
use tracing::debug;

use crate::dialogue::PendingInput;
use crate::pagination::{PageDirection, ProductListCache};

/// Result of taking a chat's pending input
#[derive(Debug, Clone, PartialEq)]
pub enum PendingLookup {
    /// The chat is at the top-level menu
    Idle,
    /// The chat is mid-flow
    Active(PendingInput),
    /// The chat was mid-flow but sat idle past the timeout
    Expired(PendingInput),
}

/// Storage of per-chat conversation state
pub trait SessionStore: Send + Sync {
    /// Current pending input, if the chat is mid-flow and not expired
    fn pending(&self, chat_id: ChatId) -> Option<PendingInput>;

    /// Replace the chat's pending input
    fn set_pending(&self, chat_id: ChatId, input: PendingInput);

    /// Drop the chat's pending input; a no-op when there is none
    fn clear_pending(&self, chat_id: ChatId);

    /// Remove and return the chat's pending input
    fn take_pending(&self, chat_id: ChatId) -> PendingLookup;

    /// The chat's cached listing, if any and not expired
    fn listing(&self, chat_id: ChatId) -> Option<ProductListCache>;

    /// Replace the chat's cached listing
    fn set_listing(&self, chat_id: ChatId, listing: ProductListCache);

    fn clear_listing(&self, chat_id: ChatId);

    /// Move the cached listing one page. Returns the updated listing and
    /// whether the page changed, or `None` when there is no listing.
    fn turn_page(
        &self,
        chat_id: ChatId,
        direction: PageDirection,
    ) -> Option<(ProductListCache, bool)>;

    /// Drop everything stored for the chat; idempotent
    fn clear(&self, chat_id: ChatId);

    /// Remove all sessions idle past the timeout; returns how many were removed
    fn evict_idle(&self) -> usize;
}

#[derive(Debug, Clone)]
struct ChatSession {
    pending: Option<PendingInput>,
    listing: Option<ProductListCache>,
    last_active: Instant,
}

impl ChatSession {
    fn new() -> Self {
        Self {
            pending: None,
            listing: None,
            last_active: Instant::now(),
        }
    }

    fn is_empty(&self) -> bool {
        self.pending.is_none() && self.listing.is_none()
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

/// In-memory [`SessionStore`] backed by a sharded concurrent map
#[derive(Debug)]
pub struct InMemorySessionStore {
    sessions: DashMap<ChatId, ChatSession>,
    idle_timeout: Duration,
}

impl InMemorySessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    /// Number of chats with stored state
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn is_expired(&self, session: &ChatSession) -> bool {
        session.last_active.elapsed() >= self.idle_timeout
    }

    /// Remove the chat's entry once it holds nothing
    fn prune(&self, chat_id: ChatId) {
        self.sessions.remove_if(&chat_id, |_, session| session.is_empty());
    }
}

impl SessionStore for InMemorySessionStore {
    fn pending(&self, chat_id: ChatId) -> Option<PendingInput> {
        let session = self.sessions.get(&chat_id)?;
        if self.is_expired(&session) {
            return None;
        }
        session.pending.clone()
    }

    fn set_pending(&self, chat_id: ChatId, input: PendingInput) {
        let mut session = self.sessions.entry(chat_id).or_insert_with(ChatSession::new);
        session.pending = Some(input);
        session.touch();
    }

    fn clear_pending(&self, chat_id: ChatId) {
        if let Some(mut session) = self.sessions.get_mut(&chat_id) {
            session.pending = None;
        }
        self.prune(chat_id);
    }

    fn take_pending(&self, chat_id: ChatId) -> PendingLookup {
        let lookup = match self.sessions.get_mut(&chat_id) {
            Some(mut session) => {
                let expired = self.is_expired(&session);
                match session.pending.take() {
                    Some(input) if expired => {
                        debug!(chat_id = %chat_id, pending = ?input, "Pending input expired");
                        session.listing = None;
                        PendingLookup::Expired(input)
                    }
                    Some(input) => {
                        session.touch();
                        PendingLookup::Active(input)
                    }
                    None => PendingLookup::Idle,
                }
            }
            None => PendingLookup::Idle,
        };
        self.prune(chat_id);
        lookup
    }

    fn listing(&self, chat_id: ChatId) -> Option<ProductListCache> {
        let session = self.sessions.get(&chat_id)?;
        if self.is_expired(&session) {
            return None;
        }
        session.listing.clone()
    }

    fn set_listing(&self, chat_id: ChatId, listing: ProductListCache) {
        let mut session = self.sessions.entry(chat_id).or_insert_with(ChatSession::new);
        session.listing = Some(listing);
        session.touch();
    }

    fn clear_listing(&self, chat_id: ChatId) {
        if let Some(mut session) = self.sessions.get_mut(&chat_id) {
            session.listing = None;
        }
        self.prune(chat_id);
    }

    fn turn_page(
        &self,
        chat_id: ChatId,
        direction: PageDirection,
    ) -> Option<(ProductListCache, bool)> {
        let mut session = self.sessions.get_mut(&chat_id)?;
        if self.is_expired(&session) {
            return None;
        }
        let listing = session.listing.as_mut()?;
        let moved = listing.turn(direction);
        let snapshot = listing.clone();
        session.touch();
        Some((snapshot, moved))
    }

    fn clear(&self, chat_id: ChatId) {
        self.sessions.remove(&chat_id);
    }

    fn evict_idle(&self) -> usize {
        let before = self.sessions.len();
        let idle_timeout = self.idle_timeout;
        self.sessions
            .retain(|_, session| session.last_active.elapsed() < idle_timeout);
        before.saturating_sub(self.sessions.len())
    }
}
