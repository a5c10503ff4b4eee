use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tracing::debug;
use uuid::Uuid;

use hermes_types::events::GatewayEvent;

/// Registry of live sessions plus the single global fan-out topic.
///
/// Every session receives every published event; there is no per-conversation
/// routing on the server side, clients filter. Delivery is best-effort and
/// at-most-once per session: a session registered after a publish never sees
/// it, and a session that falls behind drops events rather than blocking the
/// publisher or its peers.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// All connected sessions subscribe to this one channel.
    broadcast_tx: broadcast::Sender<GatewayEvent>,

    /// Live session ids. Populated on register, pruned on unregister;
    /// sessions are not bound to any identity.
    sessions: RwLock<HashSet<Uuid>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                sessions: RwLock::new(HashSet::new()),
            }),
        }
    }

    /// Register a new live session. Returns its id and a receiver carrying
    /// everything published from this point on.
    pub async fn register(&self) -> (Uuid, broadcast::Receiver<GatewayEvent>) {
        let conn_id = Uuid::new_v4();
        let rx = self.inner.broadcast_tx.subscribe();
        self.inner.sessions.write().await.insert(conn_id);
        debug!("session {} registered", conn_id);
        (conn_id, rx)
    }

    pub async fn unregister(&self, conn_id: Uuid) {
        self.inner.sessions.write().await.remove(&conn_id);
        debug!("session {} unregistered", conn_id);
    }

    pub async fn session_count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }

    /// Publish an event to all live sessions. Never blocks: a send with no
    /// receivers is a no-op, and lagging receivers drop on their own side.
    pub fn broadcast(&self, event: GatewayEvent) {
        let _ = self.inner.broadcast_tx.send(event);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
