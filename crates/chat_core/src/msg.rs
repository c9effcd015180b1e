use crate::{
    ChatId, LoopExit, LoopPhase, MessageDetail, MessageId, OutputNumber, ProcessingSnapshot,
    ScoreUpdate, Transcript, TurnId, TurnReceipt,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted a line of text as a new turn.
    InputSubmitted(String),
    /// User asked for a fresh chat.
    NewChatRequested,
    /// Backend created (or reused) a chat; everything on screen belongs to the old one.
    SessionStarted { chat_id: ChatId },
    SessionStartFailed { error: String },
    /// Submission succeeded.
    TurnAccepted { turn_id: TurnId, receipt: TurnReceipt },
    /// Submission failed; no polling will follow.
    TurnRejected { turn_id: TurnId, error: String },
    /// Status loop received a snapshot.
    StatusPolled {
        turn_id: TurnId,
        snapshot: ProcessingSnapshot,
    },
    /// Critic loop received a message detail record.
    MessageDetailPolled { turn_id: TurnId, detail: MessageDetail },
    /// Fresh server-side view of the chat.
    TranscriptLoaded(Transcript),
    /// One of a turn's polling loops stopped.
    LoopEnded {
        turn_id: TurnId,
        phase: LoopPhase,
        exit: LoopExit,
    },
    /// Background score refresh for the whole chat.
    ScoresRefreshed(Vec<ScoreUpdate>),
    /// User picked one of two dual outputs.
    PreferClicked {
        parent_id: MessageId,
        output: OutputNumber,
    },
    PreferenceRecorded {
        parent_id: MessageId,
        output: OutputNumber,
    },
    PreferenceFailed { parent_id: MessageId, error: String },
    /// User switched dual-output mode.
    DualOutputToggled(bool),
    DualOutputChanged(bool),
    DualOutputFailed { error: String },
    /// UI/render tick to coalesce rendering.
    Tick,
    NoOp,
}
