use chat_core::{ChatId, LoopExit, LoopPhase, MessageId, TurnId};
use chat_logging::{chat_debug, chat_warn};

use crate::api::ChatApi;
use crate::critic_poller::poll_critique;
use crate::poll::{EventSink, PollHandle};
use crate::settings::PollSettings;
use crate::status_poller::{poll_status, StatusOutcome};
use crate::EngineEvent;

/// What the engine needs to follow one accepted turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPlan {
    pub turn_id: TurnId,
    pub pending_message_id: MessageId,
    pub chat_id: ChatId,
    pub dual_output: bool,
}

/// Runs the status loop and then the critic loop for one turn.
///
/// Each phase gets its own child of `handle`, cancelled as soon as the
/// phase exits, so at most one loop per turn is live. A phase ending is
/// reported with [`EngineEvent::LoopEnded`] unless the turn was cancelled.
pub async fn drive_turn(
    api: &dyn ChatApi,
    settings: &PollSettings,
    plan: TurnPlan,
    sink: &dyn EventSink,
    handle: &PollHandle,
) {
    let turn_id = plan.turn_id;

    let status_handle = handle.child();
    let outcome = poll_status(
        api,
        settings,
        turn_id,
        &plan.pending_message_id,
        sink,
        &status_handle,
    )
    .await;
    status_handle.cancel();

    let snapshot = match outcome {
        StatusOutcome::Finalized(snapshot) => snapshot,
        StatusOutcome::Stopped(exit) => {
            end_phase(sink, handle, turn_id, LoopPhase::Status, exit);
            return;
        }
    };
    end_phase(sink, handle, turn_id, LoopPhase::Status, LoopExit::Finalized);

    if plan.dual_output {
        match api.fetch_transcript(&plan.chat_id).await {
            Ok(transcript) => {
                handle.emit(sink, EngineEvent::Transcript(transcript));
            }
            Err(err) => chat_warn!(turn = turn_id; "Transcript fetch failed: {}", err),
        }
    }

    let message_id = snapshot.assistant_id(&plan.pending_message_id);
    let critic_handle = handle.child();
    let exit = poll_critique(api, settings, turn_id, &message_id, sink, &critic_handle).await;
    critic_handle.cancel();
    end_phase(sink, handle, turn_id, LoopPhase::Critic, exit);
}

fn end_phase(
    sink: &dyn EventSink,
    handle: &PollHandle,
    turn_id: TurnId,
    phase: LoopPhase,
    exit: LoopExit,
) {
    chat_debug!(turn = turn_id; "{:?} loop exit {:?}", phase, exit);
    handle.emit(
        sink,
        EngineEvent::LoopEnded {
            turn_id,
            phase,
            exit,
        },
    );
}
