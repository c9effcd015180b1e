use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chat_core::{ChatId, MessageId, OutputNumber, TurnId};
use chat_logging::{chat_debug, chat_error, chat_warn};

use crate::api::ChatApi;
use crate::driver::{drive_turn, TurnPlan};
use crate::poll::{ChannelEventSink, EventSink, PollHandle};
use crate::score_refresher::refresh_scores;
use crate::settings::PollSettings;
use crate::EngineEvent;

enum EngineCommand {
    StartChat,
    SubmitTurn {
        turn_id: TurnId,
        text: String,
        chat_id: Option<ChatId>,
    },
    TrackTurn(TurnPlan),
    CancelTurns,
    StartScoreRefresh {
        chat_id: ChatId,
    },
    SendPreference {
        chat_id: ChatId,
        parent_id: MessageId,
        output: OutputNumber,
    },
    SetDualOutput {
        chat_id: ChatId,
        enabled: bool,
    },
    Shutdown,
}

/// Sending half of the engine. Cheap to clone; every clone drives the same
/// background runtime.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Receiving half of the engine, owned by the UI loop.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Starts the engine thread with its own tokio runtime.
    pub fn spawn(api: Arc<dyn ChatApi>, settings: PollSettings) -> (Self, EngineEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    chat_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let sink = ChannelEventSink::new(event_tx);
            let mut turns = PollHandle::new();
            let mut refresher: Option<PollHandle> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::TrackTurn(plan) => {
                        let handle = turns.child();
                        let api = api.clone();
                        let settings = settings.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            drive_turn(api.as_ref(), &settings, plan, &sink, &handle).await;
                        });
                    }
                    EngineCommand::CancelTurns => {
                        chat_debug!("Cancelling all turn loops");
                        turns.cancel();
                        turns = PollHandle::new();
                    }
                    EngineCommand::StartScoreRefresh { chat_id } => {
                        if let Some(previous) = refresher.take() {
                            previous.cancel();
                        }
                        let handle = PollHandle::new();
                        refresher = Some(handle.clone());
                        let api = api.clone();
                        let period = settings.score_refresh_interval;
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            refresh_scores(api.as_ref(), &chat_id, period, &sink, &handle).await;
                        });
                    }
                    EngineCommand::Shutdown => break,
                    command => {
                        let api = api.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            handle_request(api.as_ref(), command, &sink).await;
                        });
                    }
                }
            }

            turns.cancel();
            if let Some(handle) = refresher.take() {
                handle.cancel();
            }
            runtime.shutdown_timeout(Duration::from_secs(1));
        });

        (Self { cmd_tx }, EngineEvents { event_rx })
    }

    pub fn start_chat(&self) {
        self.send(EngineCommand::StartChat);
    }

    pub fn submit_turn(&self, turn_id: TurnId, text: impl Into<String>, chat_id: Option<ChatId>) {
        self.send(EngineCommand::SubmitTurn {
            turn_id,
            text: text.into(),
            chat_id,
        });
    }

    pub fn track_turn(&self, plan: TurnPlan) {
        self.send(EngineCommand::TrackTurn(plan));
    }

    /// Stops every running turn loop. Loops started afterwards are unaffected.
    pub fn cancel_turns(&self) {
        self.send(EngineCommand::CancelTurns);
    }

    /// Replaces any running score refresher.
    pub fn start_score_refresh(&self, chat_id: ChatId) {
        self.send(EngineCommand::StartScoreRefresh { chat_id });
    }

    pub fn send_preference(&self, chat_id: ChatId, parent_id: MessageId, output: OutputNumber) {
        self.send(EngineCommand::SendPreference {
            chat_id,
            parent_id,
            output,
        });
    }

    pub fn set_dual_output(&self, chat_id: ChatId, enabled: bool) {
        self.send(EngineCommand::SetDualOutput { chat_id, enabled });
    }

    pub fn shutdown(&self) {
        self.send(EngineCommand::Shutdown);
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            chat_warn!("Engine thread is gone; command dropped");
        }
    }
}

impl EngineEvents {
    /// Blocks until an event arrives; `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_request(api: &dyn ChatApi, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::StartChat => {
            let event = match api.start_chat().await {
                Ok(chat_id) => EngineEvent::ChatStarted { chat_id },
                Err(error) => EngineEvent::ChatStartFailed { error },
            };
            sink.emit(event);
        }
        EngineCommand::SubmitTurn {
            turn_id,
            text,
            chat_id,
        } => {
            let event = match api.submit_turn(&text, chat_id.as_deref()).await {
                Ok(receipt) => EngineEvent::TurnAccepted { turn_id, receipt },
                Err(error) => EngineEvent::TurnRejected { turn_id, error },
            };
            sink.emit(event);
        }
        EngineCommand::SendPreference {
            chat_id,
            parent_id,
            output,
        } => {
            let event = match api.prefer_output(&chat_id, &parent_id, output).await {
                Ok(()) => EngineEvent::PreferenceRecorded { parent_id, output },
                Err(error) => EngineEvent::PreferenceFailed { parent_id, error },
            };
            sink.emit(event);
        }
        EngineCommand::SetDualOutput { chat_id, enabled } => {
            let event = match api.set_dual_output(&chat_id, enabled).await {
                Ok(enabled) => EngineEvent::DualOutputChanged { enabled },
                Err(error) => EngineEvent::DualOutputFailed { error },
            };
            sink.emit(event);
        }
        EngineCommand::TrackTurn(_)
        | EngineCommand::CancelTurns
        | EngineCommand::StartScoreRefresh { .. }
        | EngineCommand::Shutdown => {}
    }
}
