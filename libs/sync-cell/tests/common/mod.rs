use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use sync_cell::{EventStream, LiveEvent, OutboundEvent, SyncError};

/// In-memory event stream: tests push inbound events through a channel and
/// inspect everything the controller sent.
pub struct ChannelEventStream {
    inbound: mpsc::UnboundedReceiver<LiveEvent>,
    sent: Arc<Mutex<Vec<OutboundEvent>>>,
    subscribed: Arc<AtomicBool>,
}

pub struct StreamProbe {
    pub inbound_tx: mpsc::UnboundedSender<LiveEvent>,
    pub sent: Arc<Mutex<Vec<OutboundEvent>>>,
    pub subscribed: Arc<AtomicBool>,
}

pub fn channel_stream() -> (ChannelEventStream, StreamProbe) {
    let (inbound_tx, inbound) = mpsc::unbounded_channel();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let subscribed = Arc::new(AtomicBool::new(false));

    let stream = ChannelEventStream {
        inbound,
        sent: sent.clone(),
        subscribed: subscribed.clone(),
    };
    let probe = StreamProbe {
        inbound_tx,
        sent,
        subscribed,
    };
    (stream, probe)
}

#[async_trait]
impl EventStream for ChannelEventStream {
    async fn connect(&mut self, user_id: &str) -> Result<(), SyncError> {
        self.sent.lock().unwrap().push(OutboundEvent::JoinRoom {
            user_id: user_id.to_string(),
        });
        self.subscribed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&mut self, event: &OutboundEvent) -> Result<(), SyncError> {
        if !self.is_subscribed() {
            return Err(SyncError::StreamUnavailable);
        }
        self.sent.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn next_event(&mut self) -> Option<Result<LiveEvent, SyncError>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) {
        self.subscribed.store(false, Ordering::SeqCst);
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::SeqCst)
    }
}
