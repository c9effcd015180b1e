use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::EngineEvent;

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Stop flag shared between a polling loop and its owner.
///
/// Cancelling a handle also cancels every handle derived from it with
/// [`PollHandle::child`]. Results that arrive after cancellation must be
/// dropped, never emitted.
#[derive(Debug, Clone, Default)]
pub struct PollHandle {
    token: CancellationToken,
}

impl PollHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Emits only while the handle is live.
    pub(crate) fn emit(&self, sink: &dyn EventSink, event: EngineEvent) -> bool {
        if self.is_active() {
            sink.emit(event);
            true
        } else {
            false
        }
    }
}

pub(crate) enum PollStep<T> {
    Response(T),
    Expired,
    Cancelled,
}

/// Fixed-cadence ticker whose first tick is one `period` from now.
pub(crate) fn poll_interval(period: Duration) -> Interval {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Waits for the next tick and issues `request`, unless the handle is
/// cancelled or `deadline` passes first. A response that lands after
/// cancellation is reported as [`PollStep::Cancelled`].
pub(crate) async fn next_poll<F, T>(
    ticker: &mut Interval,
    deadline: Instant,
    handle: &PollHandle,
    request: F,
) -> PollStep<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = handle.cancelled() => PollStep::Cancelled,
        _ = time::sleep_until(deadline) => PollStep::Expired,
        response = async {
            ticker.tick().await;
            request.await
        } => {
            if handle.is_active() {
                PollStep::Response(response)
            } else {
                PollStep::Cancelled
            }
        }
    }
}
