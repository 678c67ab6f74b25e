//! Conversation history store for the agent service.
//!
//! Histories are keyed by conversation id and evicted on two conditions:
//! entries idle for longer than the TTL, and oldest-first trimming once the
//! store exceeds its capacity. Both bounds keep a long-lived process from
//! accumulating conversations forever.

use crate::providers::agent::AgentMessage;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;

struct Entry {
    messages: Vec<AgentMessage>,
    last_touched: Instant,
}

/// Bounded, TTL-evicting store of per-conversation message histories.
pub struct ConversationStore {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl ConversationStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Returns the stored history for a conversation, or empty if none
    /// survives. An expired entry is treated as absent.
    pub async fn history(&self, conversation_id: &str) -> Vec<AgentMessage> {
        let entries = self.entries.read().await;
        match entries.get(conversation_id) {
            Some(entry) if entry.last_touched.elapsed() < self.ttl => entry.messages.clone(),
            _ => Vec::new(),
        }
    }

    /// Appends messages to a conversation's history, creating it if needed,
    /// then runs eviction.
    pub async fn append(&self, conversation_id: &str, messages: Vec<AgentMessage>) {
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(conversation_id.to_string())
            .or_insert_with(|| Entry {
                messages: Vec::new(),
                last_touched: Instant::now(),
            });
        entry.messages.extend(messages);
        entry.last_touched = Instant::now();
        Self::evict(&mut entries, self.ttl, self.capacity);
    }

    /// Drops a conversation's history.
    pub async fn reset(&self, conversation_id: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(conversation_id).is_some() {
            info!("Conversation history reset for ID: {conversation_id}");
        }
    }

    /// Number of live (non-expired) conversations.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries
            .values()
            .filter(|e| e.last_touched.elapsed() < self.ttl)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn evict(entries: &mut HashMap<String, Entry>, ttl: Duration, capacity: usize) {
        entries.retain(|_, entry| entry.last_touched.elapsed() < ttl);
        while entries.len() > capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_touched)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    entries.remove(&id);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(text: &str) -> AgentMessage {
        AgentMessage::user(text)
    }

    #[tokio::test]
    async fn append_and_read_back() {
        let store = ConversationStore::new(Duration::from_secs(60), 16);
        store.append("c1", vec![user("q1"), user("q2")]).await;
        store.append("c1", vec![user("q3")]).await;

        let history = store.history("c1").await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].user_message.as_ref().unwrap().text, "q3");
        assert!(store.history("c2").await.is_empty());
    }

    #[tokio::test]
    async fn reset_drops_history() {
        let store = ConversationStore::new(Duration::from_secs(60), 16);
        store.append("c1", vec![user("q1")]).await;
        store.reset("c1").await;
        assert!(store.history("c1").await.is_empty());
    }

    #[tokio::test]
    async fn expired_entries_read_as_empty() {
        let store = ConversationStore::new(Duration::from_millis(50), 16);
        store.append("c1", vec![user("q1")]).await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.history("c1").await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_first() {
        let store = ConversationStore::new(Duration::from_secs(60), 2);
        store.append("a", vec![user("q")]).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.append("b", vec![user("q")]).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.append("c", vec![user("q")]).await;

        assert_eq!(store.len().await, 2);
        assert!(store.history("a").await.is_empty());
        assert!(!store.history("c").await.is_empty());
    }
}
