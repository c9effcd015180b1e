use chat_core::{LoopExit, TurnId};
use chat_logging::{chat_debug, chat_info};
use tokio::time::Instant;

use crate::api::ChatApi;
use crate::poll::{next_poll, poll_interval, EventSink, PollHandle, PollStep};
use crate::settings::PollSettings;
use crate::EngineEvent;

/// Polls the detail record of a finalized assistant message until critique
/// data shows up. Each poll is emitted so the score badge can move before
/// the critique lands.
pub async fn poll_critique(
    api: &dyn ChatApi,
    settings: &PollSettings,
    turn_id: TurnId,
    message_id: &str,
    sink: &dyn EventSink,
    handle: &PollHandle,
) -> LoopExit {
    let deadline = Instant::now() + settings.critic_ceiling;
    let mut ticker = poll_interval(settings.critic_interval);

    loop {
        let step = next_poll(&mut ticker, deadline, handle, api.fetch_message(message_id)).await;
        match step {
            PollStep::Cancelled => return LoopExit::Cancelled,
            PollStep::Expired => {
                chat_info!(turn = turn_id; "No critique for {} within {:?}", message_id, settings.critic_ceiling);
                return LoopExit::Expired;
            }
            PollStep::Response(Err(err)) => {
                // Transport failures end critique polling without touching the UI.
                chat_debug!(turn = turn_id; "Critic poll failed: {}", err);
                return LoopExit::Failed;
            }
            PollStep::Response(Ok(detail)) => {
                let observed = detail
                    .critique
                    .as_ref()
                    .is_some_and(|critique| critique.has_news());
                if !handle.emit(sink, EngineEvent::Detail { turn_id, detail }) {
                    return LoopExit::Cancelled;
                }
                if observed {
                    return LoopExit::Observed;
                }
            }
        }
    }
}
