//! Refresh notifier - dirty flag plus the messages to re-render
//!
//! Mutations raise the flag; a periodic driver consumes it and re-edits
//! every tracked message. The flag is `Release` on raise and `Acquire` on
//! consume, so state written before `raise` is visible to whoever sees
//! `consume` return `true`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// Chat identifier on the messaging platform
pub type ChatId = i64;

/// Pointer to a message the bot sent and may edit later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: i64,
}

/// Something that can be told the view is stale
pub trait RefreshSignal: Send + Sync {
    fn raise(&self);
}

#[derive(Debug, Default)]
pub struct RefreshNotifier {
    dirty: AtomicBool,
    tracked: Mutex<HashMap<ChatId, MessageRef>>,
}

impl RefreshNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the view stale
    pub fn raise(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Observe the flag without clearing it
    pub fn check(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Read and clear the flag in one step
    pub fn consume(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Remember the latest rendered message for a chat, replacing any older one
    pub fn track(&self, message: MessageRef) -> Option<MessageRef> {
        self.tracked_map().insert(message.chat_id, message)
    }

    pub fn untrack(&self, chat_id: ChatId) -> Option<MessageRef> {
        self.tracked_map().remove(&chat_id)
    }

    /// Snapshot of tracked messages, ordered by chat
    pub fn tracked(&self) -> Vec<MessageRef> {
        let mut messages: Vec<MessageRef> = self.tracked_map().values().copied().collect();
        messages.sort_by_key(|m| m.chat_id);
        messages
    }

    fn tracked_map(&self) -> MutexGuard<'_, HashMap<ChatId, MessageRef>> {
        self.tracked.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Tracked message map poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl RefreshSignal for RefreshNotifier {
    fn raise(&self) {
        RefreshNotifier::raise(self);
    }
}
