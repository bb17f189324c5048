use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::contracts::ReplyOutcome;
use crate::contracts::ReplyRequest;
use crate::producer::ReplyProducer;

/// Runs at most one delayed reply per channel and reports each result on
/// the outcome channel. Cancelled replies report nothing.
///
/// Must be used from within a tokio runtime.
pub struct ReplyScheduler {
    producer: Arc<dyn ReplyProducer>,
    tasks: HashMap<String, JoinHandle<()>>,
    outcomes: mpsc::UnboundedSender<ReplyOutcome>,
}

impl std::fmt::Debug for ReplyScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyScheduler")
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

impl ReplyScheduler {
    pub fn new(producer: Arc<dyn ReplyProducer>) -> (Self, mpsc::UnboundedReceiver<ReplyOutcome>) {
        let (outcomes, receiver) = mpsc::unbounded_channel();
        (
            Self {
                producer,
                tasks: HashMap::new(),
                outcomes,
            },
            receiver,
        )
    }

    /// Returns `false` without spawning when the channel already has a
    /// reply in flight.
    pub fn schedule(&mut self, request: ReplyRequest) -> bool {
        if self.is_pending(&request.channel_id) {
            debug!(channel = %request.channel_id, "reply already in flight");
            return false;
        }

        let channel_id = request.channel_id.clone();
        let producer = Arc::clone(&self.producer);
        let outcomes = self.outcomes.clone();
        let handle = tokio::spawn(async move {
            let outcome = match producer.produce_reply(&request).await {
                Ok(content) => ReplyOutcome::Delivered {
                    channel_id: request.channel_id,
                    content,
                },
                Err(err) => ReplyOutcome::Failed {
                    channel_id: request.channel_id,
                    reason: err.to_string(),
                },
            };
            if outcomes.send(outcome).is_err() {
                debug!("reply outcome dropped; receiver closed");
            }
        });
        debug!(channel = %channel_id, "reply scheduled");
        self.tasks.insert(channel_id, handle);
        true
    }

    /// Returns whether a live reply was aborted.
    pub fn cancel(&mut self, channel_id: &str) -> bool {
        let Some(handle) = self.tasks.remove(channel_id) else {
            return false;
        };
        let live = !handle.is_finished();
        handle.abort();
        if live {
            debug!(channel = %channel_id, "reply cancelled");
        }
        live
    }

    pub fn cancel_all(&mut self) -> usize {
        let channels: Vec<String> = self.tasks.keys().cloned().collect();
        channels
            .iter()
            .filter(|channel_id| self.cancel(channel_id))
            .count()
    }

    pub fn is_pending(&self, channel_id: &str) -> bool {
        self.tasks
            .get(channel_id)
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn pending_count(&self) -> usize {
        self.tasks
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }
}

impl Drop for ReplyScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}
