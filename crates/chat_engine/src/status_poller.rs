use chat_core::{LoopExit, ProcessingSnapshot, TurnId};
use chat_logging::{chat_debug, chat_info, chat_warn};
use tokio::time::Instant;

use crate::api::ChatApi;
use crate::poll::{next_poll, poll_interval, EventSink, PollHandle, PollStep};
use crate::settings::PollSettings;
use crate::EngineEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    /// Terminal status with content; the snapshot is the final one.
    Finalized(ProcessingSnapshot),
    Stopped(LoopExit),
}

/// Polls the pipeline status of `pending_message_id` until a terminal
/// status carries content, the ceiling passes, a poll fails, or `handle`
/// is cancelled. Every successful poll is emitted while the handle is live.
pub async fn poll_status(
    api: &dyn ChatApi,
    settings: &PollSettings,
    turn_id: TurnId,
    pending_message_id: &str,
    sink: &dyn EventSink,
    handle: &PollHandle,
) -> StatusOutcome {
    let deadline = Instant::now() + settings.status_ceiling;
    let mut ticker = poll_interval(settings.status_interval);

    loop {
        let step = next_poll(
            &mut ticker,
            deadline,
            handle,
            api.poll_status(pending_message_id),
        )
        .await;
        match step {
            PollStep::Cancelled => return StatusOutcome::Stopped(LoopExit::Cancelled),
            PollStep::Expired => {
                chat_info!(turn = turn_id; "Status polling gave up after {:?}", settings.status_ceiling);
                return StatusOutcome::Stopped(LoopExit::Expired);
            }
            PollStep::Response(Err(err)) => {
                chat_warn!(turn = turn_id; "Status poll failed: {}", err);
                return StatusOutcome::Stopped(LoopExit::Failed);
            }
            PollStep::Response(Ok(snapshot)) => {
                chat_debug!(turn = turn_id; "Status {}", snapshot.status);
                let finalized = snapshot.is_final();
                let event = EngineEvent::Status {
                    turn_id,
                    snapshot: snapshot.clone(),
                };
                if !handle.emit(sink, event) {
                    return StatusOutcome::Stopped(LoopExit::Cancelled);
                }
                if finalized {
                    return StatusOutcome::Finalized(snapshot);
                }
            }
        }
    }
}
