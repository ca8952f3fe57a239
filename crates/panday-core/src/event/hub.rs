//! Broadcast hub for tool-execution events, one channel per chat request.
//!
//! Built on `tokio::sync::broadcast`. Each channel also keeps a bounded
//! history so a subscriber that connects after the request started still
//! sees every event from the beginning. History append and broadcast happen
//! under the same lock as subscription, so a subscriber never misses or
//! duplicates an event at the replay/live boundary.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures_util::Stream;
use panday_types::relay::ToolEvent;
use tokio::sync::broadcast;

/// Events kept per request for late subscribers.
pub const HISTORY_LIMIT: usize = 64;

struct Channel {
    sender: broadcast::Sender<ToolEvent>,
    history: Mutex<Vec<ToolEvent>>,
    created_at: Instant,
}

impl Channel {
    fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            history: Mutex::new(Vec::new()),
            created_at: Instant::now(),
        }
    }
}

/// Multi-request tool event hub.
///
/// Cloning shares the underlying channels.
#[derive(Clone)]
pub struct ToolEventHub {
    channels: Arc<DashMap<String, Arc<Channel>>>,
    capacity: usize,
}

impl ToolEventHub {
    /// Create a hub whose per-request channels hold `capacity` live events.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            capacity,
        }
    }

    fn channel(&self, request_id: &str) -> Arc<Channel> {
        self.channels
            .entry(request_id.to_string())
            .or_insert_with(|| Arc::new(Channel::new(self.capacity)))
            .clone()
    }

    /// Publish an event for `request_id`.
    ///
    /// With no subscribers the event is only recorded in history.
    pub fn publish(&self, request_id: &str, event: ToolEvent) {
        let channel = self.channel(request_id);
        let mut history = channel
            .history
            .lock()
            .expect("tool event history lock poisoned");
        if history.len() < HISTORY_LIMIT || event.is_terminal() {
            history.push(event.clone());
        }
        let _ = channel.sender.send(event);
    }

    /// Buffered events so far plus a receiver for everything after them.
    ///
    /// `None` when nothing was ever published for `request_id`.
    pub fn subscribe(
        &self,
        request_id: &str,
    ) -> Option<(Vec<ToolEvent>, broadcast::Receiver<ToolEvent>)> {
        let channel = self.channels.get(request_id)?.clone();
        let history = channel
            .history
            .lock()
            .expect("tool event history lock poisoned");
        Some((history.clone(), channel.sender.subscribe()))
    }

    /// Replay then follow events for `request_id` until the terminal event.
    ///
    /// An unknown request gets a lone `done` so the client stops listening.
    /// A lagging subscriber skips the events it missed.
    pub fn stream(&self, request_id: &str) -> impl Stream<Item = ToolEvent> + Send + use<> {
        let subscription = self.subscribe(request_id);
        let request_id = request_id.to_string();
        async_stream::stream! {
            let Some((replay, mut rx)) = subscription else {
                tracing::debug!(request_id = %request_id, "no tool events for request");
                yield ToolEvent::Done;
                return;
            };
            for event in replay {
                let terminal = event.is_terminal();
                yield event;
                if terminal {
                    return;
                }
            }
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let terminal = event.is_terminal();
                        yield event;
                        if terminal {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(request_id = %request_id, skipped, "tool event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    /// Drop channels created more than `max_age` ago. Returns how many went.
    pub fn prune_older_than(&self, max_age: Duration) -> usize {
        let before = self.channels.len();
        self.channels
            .retain(|_, channel| channel.created_at.elapsed() < max_age);
        before - self.channels.len()
    }

    /// Number of tracked requests.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl std::fmt::Debug for ToolEventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEventHub")
            .field("requests", &self.channels.len())
            .finish()
    }
}
