use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{trace, warn};

/// Byte progress of one item's download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub item_id: String,
    pub downloaded_bytes: u64,
    pub total_size_bytes: u64,
    /// 0.00 to 100.00, rounded to two decimals.
    pub progress_percentage: f64,
}

impl ProgressEvent {
    pub fn new(item_id: impl Into<String>, downloaded_bytes: u64, total_size_bytes: u64) -> Self {
        Self {
            item_id: item_id.into(),
            downloaded_bytes,
            total_size_bytes,
            progress_percentage: percentage(downloaded_bytes, total_size_bytes),
        }
    }

    /// The terminal event of a successful download.
    pub fn completed(item_id: impl Into<String>, downloaded_bytes: u64, total_size_bytes: u64) -> Self {
        Self {
            item_id: item_id.into(),
            downloaded_bytes,
            total_size_bytes,
            progress_percentage: 100.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress_percentage >= 100.0
    }
}

/// `round(downloaded / total * 100, 2)`, capped at 100. An empty download is
/// complete from the start.
pub fn percentage(downloaded_bytes: u64, total_size_bytes: u64) -> f64 {
    if total_size_bytes == 0 {
        return 100.0;
    }
    let raw = downloaded_bytes as f64 / total_size_bytes as f64 * 100.0;
    ((raw * 100.0).round() / 100.0).min(100.0)
}

/// Process-wide fan-out of download progress.
///
/// Backed by a bounded broadcast channel: publishing never blocks, late
/// subscribers see no history, and a subscriber that falls behind loses the
/// oldest events it has not read yet.
#[derive(Debug, Clone)]
pub struct ProgressBus {
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: ProgressEvent) {
        trace!(item_id = %event.item_id, percentage = event.progress_percentage, "publishing progress");
        if self.sender.send(event).is_err() {
            trace!("no progress subscribers");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Live events for `item_id` from this call onwards. Each call yields an
    /// independent subscription; dropping it affects nobody else.
    pub fn subscribe_for_item(
        &self,
        item_id: impl Into<String>,
    ) -> impl Stream<Item = ProgressEvent> + Send + Unpin + 'static {
        let item_id = item_id.into();
        BroadcastStream::new(self.sender.subscribe()).filter_map(move |received| match received {
            Ok(event) if event.item_id == item_id => Some(event),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(item_id = %item_id, skipped, "progress subscriber lagged, dropping oldest events");
                None
            }
        })
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new(256)
    }
}
