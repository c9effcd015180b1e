use std::time::Duration;

use chat_logging::chat_warn;

use crate::api::ChatApi;
use crate::poll::{poll_interval, EventSink, PollHandle};
use crate::EngineEvent;

/// Refreshes every critic score of `chat_id` on a fixed cadence until
/// `handle` is cancelled. Failed refreshes are logged and retried on the
/// next tick.
pub async fn refresh_scores(
    api: &dyn ChatApi,
    chat_id: &str,
    period: Duration,
    sink: &dyn EventSink,
    handle: &PollHandle,
) {
    let mut ticker = poll_interval(period);
    loop {
        let result = tokio::select! {
            biased;
            _ = handle.cancelled() => return,
            result = async {
                ticker.tick().await;
                api.refresh_scores(chat_id).await
            } => result,
        };
        match result {
            Ok(scores) if scores.is_empty() => {}
            Ok(scores) => {
                if !handle.emit(sink, EngineEvent::Scores(scores)) {
                    return;
                }
            }
            Err(err) => chat_warn!("Score refresh for chat {} failed: {}", chat_id, err),
        }
    }
}
