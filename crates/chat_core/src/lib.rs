//! Chat core: pure turn-tracking state machine and view-model projection.
mod critique;
mod effect;
mod message;
mod msg;
mod session;
mod snapshot;
mod state;
mod status;
mod store;
mod turn;
mod update;
mod view_model;

pub use critique::{format_score, Critique, CritiqueSection, CritiqueSnapshot, RegeneratedCritique};
pub use effect::Effect;
pub use message::{ChatId, Message, MessageFields, MessageId, OutputNumber, Role, TurnId};
pub use msg::Msg;
pub use session::ChatSession;
pub use snapshot::{
    MessageDetail, ProcessingData, ProcessingSnapshot, ScoreUpdate, SearchResults, Transcript,
    TranscriptOutput, TranscriptTurn, TurnReceipt,
};
pub use state::AppState;
pub use status::StatusCode;
pub use store::{MessageStore, UpsertOutcome};
pub use turn::{LoopExit, LoopPhase, PanelChange, RenderedPanel, StatusPanel, TurnPhase, TurnState};
pub use update::update;
pub use view_model::{BubbleView, ChatViewModel, CritiquePanelView, StatusPanelView};
