use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::{
    ChatMessage, ConversationBucket, ConversationKey, ConversationSummary, DeliveryState,
    Participant,
};

type Fingerprint = (String, DateTime<Utc>, String);

#[derive(Debug, Default)]
struct Thread {
    messages: Vec<ChatMessage>,
    server_ids: HashSet<String>,
    fingerprints: HashSet<Fingerprint>,
}

impl Thread {
    fn remember(&mut self, message: &ChatMessage) {
        if let Some(id) = &message.server_id {
            self.server_ids.insert(id.clone());
        }
        self.fingerprints.insert(message.fingerprint());
    }

    /// Insert ordered by `sent_at`; equal timestamps keep arrival order.
    fn insert_sorted(&mut self, message: ChatMessage) {
        let at = self
            .messages
            .partition_point(|m| m.sent_at <= message.sent_at);
        self.messages.insert(at, message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// The event was the echo of one of our own pending sends.
    ConfirmedPending,
    Duplicate,
}

/// Client-side cache of message threads plus the derived conversation
/// summaries. Threads are append-only: history loads replace wholesale, live
/// events append (with dedup), and nothing is ever edited or deleted besides
/// a pending send being confirmed by its echo.
#[derive(Debug, Default)]
pub struct ChatThreadCache {
    threads: HashMap<ConversationKey, Thread>,
    summaries: HashMap<ConversationKey, ConversationSummary>,
}

impl ChatThreadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-time full load when a conversation is opened; replaces whatever
    /// was cached for that conversation.
    pub fn load_history(&mut self, key: ConversationKey, history: Vec<ChatMessage>) {
        let mut thread = Thread::default();
        for message in history {
            thread.remember(&message);
            thread.insert_sorted(message);
        }
        self.threads.insert(key.clone(), thread);
        self.recompute_summary(&key);
    }

    /// Apply one inbound live event. Deduplicates against everything already
    /// cached: by server id when the event carries one, by
    /// (sender, sent-at, body) fingerprint when it does not, and by client id
    /// when it is the echo of our own pending send.
    pub fn append_live(&mut self, message: ChatMessage) -> AppendOutcome {
        let key = message.key.clone();
        let thread = self.threads.entry(key.clone()).or_default();

        if let Some(id) = &message.server_id {
            if thread.server_ids.contains(id) {
                debug!("Dropping duplicate live event (server id {})", id);
                return AppendOutcome::Duplicate;
            }
        }

        // Echo of one of our own sends. Match by client id when the echo
        // carries it; some backends strip it (and stamp their own `waktu`),
        // so fall back to (sender, body) against the pending queue rather
        // than leaving the pending copy stranded.
        let echoed = thread.messages.iter().position(|m| {
            m.delivery == DeliveryState::Pending
                && match message.client_id {
                    Some(client_id) => m.client_id == Some(client_id),
                    None => m.sender_id == message.sender_id && m.body == message.body,
                }
        });
        if let Some(at) = echoed {
            let pending = &mut thread.messages[at];
            pending.server_id = message.server_id.clone();
            pending.sent_at = message.sent_at;
            pending.delivery = DeliveryState::Confirmed;
            let remembered = pending.clone();
            thread.remember(&remembered);
            thread.messages.sort_by_key(|m| m.sent_at);
            self.recompute_summary(&key);
            return AppendOutcome::ConfirmedPending;
        }

        if thread.fingerprints.contains(&message.fingerprint()) {
            debug!("Dropping duplicate live event (fingerprint match)");
            return AppendOutcome::Duplicate;
        }

        thread.remember(&message);
        thread.insert_sorted(message);
        self.recompute_summary(&key);
        AppendOutcome::Appended
    }

    /// Queue one of our own sends, visible immediately as pending.
    pub fn register_pending(&mut self, message: ChatMessage) {
        let key = message.key.clone();
        let thread = self.threads.entry(key.clone()).or_default();
        thread.insert_sorted(message);
        self.recompute_summary(&key);
    }

    pub fn messages(&self, key: &ConversationKey) -> Vec<ChatMessage> {
        self.threads
            .get(key)
            .map(|t| t.messages.clone())
            .unwrap_or_default()
    }

    pub fn pending_count(&self, key: &ConversationKey) -> usize {
        self.threads
            .get(key)
            .map(|t| {
                t.messages
                    .iter()
                    .filter(|m| m.delivery == DeliveryState::Pending)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Full replace from `GET /chatlist`; per-event payloads are not trusted
    /// to rebuild the list piecemeal.
    pub fn apply_chat_list(&mut self, summaries: Vec<ConversationSummary>) {
        self.summaries = summaries.into_iter().map(|s| (s.key.clone(), s)).collect();
    }

    pub fn summaries(&self) -> Vec<ConversationSummary> {
        let mut all: Vec<ConversationSummary> = self.summaries.values().cloned().collect();
        all.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        all
    }

    /// Partition into ongoing (last activity within one day, inclusive) and
    /// closed, both newest-first.
    pub fn buckets(
        &self,
        now: DateTime<Utc>,
    ) -> (Vec<ConversationSummary>, Vec<ConversationSummary>) {
        self.summaries()
            .into_iter()
            .partition(|s| s.bucket(now) == ConversationBucket::Ongoing)
    }

    fn recompute_summary(&mut self, key: &ConversationKey) {
        let Some(last) = self
            .threads
            .get(key)
            .and_then(|t| t.messages.last())
        else {
            return;
        };

        let last_message = last.body.preview();
        let last_message_at = last.sent_at;

        self.summaries
            .entry(key.clone())
            .and_modify(|s| {
                s.last_message = last_message.clone();
                s.last_message_at = last_message_at;
            })
            .or_insert_with(|| ConversationSummary {
                key: key.clone(),
                // Participant details arrive with the next chat-list refresh.
                participant: Participant {
                    id: key.patient_id.clone(),
                    name: String::new(),
                    photo: None,
                },
                last_message,
                last_message_at,
            });
    }
}
