use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use hermes_db::{Database, StoreError};
use hermes_types::api::MessageResponse;
use hermes_types::events::GatewayEvent;

use crate::dispatcher::Dispatcher;

#[derive(Debug, Error)]
pub enum SendError {
    /// Sender and receiver are not friends. Nothing was persisted or broadcast.
    #[error("you can only message your friends")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates one message send: authorization gate, then append, then
/// broadcast, in that order. A failed gate persists and broadcasts nothing;
/// a failed append broadcasts nothing. Every ingress path (HTTP and the
/// websocket `SendMessage` command) goes through here, so authorization is
/// enforced uniformly.
#[derive(Clone)]
pub struct DeliveryCoordinator {
    db: Arc<Database>,
    dispatcher: Dispatcher,
}

impl DeliveryCoordinator {
    pub fn new(db: Arc<Database>, dispatcher: Dispatcher) -> Self {
        Self { db, dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn send(
        &self,
        sender: &str,
        receiver: &str,
        content: &str,
    ) -> Result<MessageResponse, SendError> {
        // Gate: evaluated fresh on every send, friendship can change
        // between requests.
        let db = self.db.clone();
        let s = sender.to_string();
        let r = receiver.to_string();
        let authorized = tokio::task::spawn_blocking(move || db.is_friend_of(&s, &r))
            .await
            .map_err(join_err)??;

        if !authorized {
            warn!("{} -> {}: rejected, not friends", sender, receiver);
            return Err(SendError::Forbidden);
        }

        let id = Uuid::new_v4();
        let created_at = chrono::Utc::now();

        let db = self.db.clone();
        let s = sender.to_string();
        let r = receiver.to_string();
        let c = content.to_string();
        let mid = id.to_string();
        let ts = created_at.to_rfc3339();
        tokio::task::spawn_blocking(move || db.append_message(&mid, &s, &r, &c, &ts))
            .await
            .map_err(join_err)??;

        let message = MessageResponse {
            id,
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            content: content.to_string(),
            created_at,
        };

        // Only a persisted message reaches the fabric.
        self.dispatcher.broadcast(GatewayEvent::ReceiveMessage {
            id: message.id,
            sender: message.sender.clone(),
            receiver: message.receiver.clone(),
            content: message.content.clone(),
            created_at: message.created_at,
        });

        info!("{} -> {}: message {} delivered", sender, receiver, id);
        Ok(message)
    }

    /// Conversation history between two users, ascending by timestamp.
    pub async fn conversation(
        &self,
        user1: &str,
        user2: &str,
    ) -> Result<Vec<MessageResponse>, StoreError> {
        let db = self.db.clone();
        let a = user1.to_string();
        let b = user2.to_string();
        let rows = tokio::task::spawn_blocking(move || db.conversation(&a, &b))
            .await
            .map_err(join_err)??;

        Ok(rows.into_iter().map(row_to_message).collect())
    }
}

fn join_err(e: tokio::task::JoinError) -> StoreError {
    StoreError::Unavailable(format!("blocking task failed: {}", e))
}

fn row_to_message(row: hermes_db::models::MessageRow) -> MessageResponse {
    MessageResponse {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt message id '{}': {}", row.id, e);
            Uuid::default()
        }),
        created_at: row
            .created_at
            .parse::<chrono::DateTime<chrono::Utc>>()
            .unwrap_or_else(|e| {
                warn!("Corrupt created_at '{}' on message '{}': {}", row.created_at, row.id, e);
                chrono::DateTime::default()
            }),
        sender: row.sender,
        receiver: row.receiver,
        content: row.content,
    }
}
