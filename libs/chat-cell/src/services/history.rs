use std::sync::Arc;

use reqwest::Method;
use tracing::debug;

use shared_api::ApiClient;

use crate::error::ChatError;
use crate::models::{ChatListEntry, ChatMessage, ChatMessagePayload, ConversationSummary};

/// REST side of chat: history and conversation-list fetches. Live traffic
/// goes through the event stream, not here.
pub struct ChatService {
    api: Arc<ApiClient>,
}

impl ChatService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Full ordered history for one conversation, oldest first. Any row that
    /// fails schema validation rejects the whole load; partial histories are
    /// worse than a retry.
    pub async fn load_history(
        &self,
        user_id: &str,
        peer_id: &str,
        auth_token: &str,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        debug!("Loading chat history {} <-> {}", user_id, peer_id);

        let path = format!("/chat/history/{}/{}", user_id, peer_id);
        let rows: Vec<ChatMessagePayload> = self
            .api
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        rows.into_iter().map(|p| p.into_message()).collect()
    }

    pub async fn fetch_chat_list(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<ConversationSummary>, ChatError> {
        debug!("Fetching conversation list for {}", user_id);

        let path = format!("/chatlist/{}", user_id);
        let entries: Vec<ChatListEntry> = self
            .api
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(entries
            .into_iter()
            .map(|e| ConversationSummary::from_entry(user_id, e))
            .collect())
    }
}
