use std::sync::mpsc;
use std::thread;

use chat_core::{Effect, Msg};
use chat_engine::{EngineEvent, EngineEvents, EngineHandle, TurnPlan};
use chat_logging::chat_warn;

/// Executes core effects on the engine and feeds engine events back as
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, events: EngineEvents, msg_tx: mpsc::Sender<Msg>) -> Self {
        spawn_event_loop(events, msg_tx);
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartChat => self.engine.start_chat(),
                Effect::SubmitTurn {
                    turn_id,
                    text,
                    chat_id,
                } => self.engine.submit_turn(turn_id, text, chat_id),
                Effect::TrackTurn {
                    turn_id,
                    pending_message_id,
                    chat_id,
                    dual_output,
                } => self.engine.track_turn(TurnPlan {
                    turn_id,
                    pending_message_id,
                    chat_id,
                    dual_output,
                }),
                Effect::CancelTurns => self.engine.cancel_turns(),
                Effect::StartScoreRefresh { chat_id } => self.engine.start_score_refresh(chat_id),
                Effect::SendPreference {
                    chat_id,
                    parent_id,
                    output,
                } => self.engine.send_preference(chat_id, parent_id, output),
                Effect::SetDualOutput { chat_id, enabled } => {
                    self.engine.set_dual_output(chat_id, enabled)
                }
            }
        }
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

fn spawn_event_loop(events: EngineEvents, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if msg_tx.send(map_event(event)).is_err() {
                break;
            }
        }
    });
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ChatStarted { chat_id } => Msg::SessionStarted { chat_id },
        EngineEvent::ChatStartFailed { error } => Msg::SessionStartFailed {
            error: error.user_message(),
        },
        EngineEvent::TurnAccepted { turn_id, receipt } => Msg::TurnAccepted { turn_id, receipt },
        EngineEvent::TurnRejected { turn_id, error } => {
            chat_warn!(turn = turn_id; "Turn rejected: {}", error);
            Msg::TurnRejected {
                turn_id,
                error: error.user_message(),
            }
        }
        EngineEvent::Status { turn_id, snapshot } => Msg::StatusPolled { turn_id, snapshot },
        EngineEvent::Detail { turn_id, detail } => Msg::MessageDetailPolled { turn_id, detail },
        EngineEvent::Transcript(transcript) => Msg::TranscriptLoaded(transcript),
        EngineEvent::LoopEnded {
            turn_id,
            phase,
            exit,
        } => Msg::LoopEnded {
            turn_id,
            phase,
            exit,
        },
        EngineEvent::Scores(scores) => Msg::ScoresRefreshed(scores),
        EngineEvent::PreferenceRecorded { parent_id, output } => {
            Msg::PreferenceRecorded { parent_id, output }
        }
        EngineEvent::PreferenceFailed { parent_id, error } => Msg::PreferenceFailed {
            parent_id,
            error: error.user_message(),
        },
        EngineEvent::DualOutputChanged { enabled } => Msg::DualOutputChanged(enabled),
        EngineEvent::DualOutputFailed { error } => Msg::DualOutputFailed {
            error: error.user_message(),
        },
    }
}
