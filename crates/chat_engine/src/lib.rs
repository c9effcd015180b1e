//! Chat engine: backend HTTP boundary, polling loops and effect execution.
mod api;
mod critic_poller;
mod critique;
mod driver;
mod engine;
mod poll;
mod score_refresher;
mod settings;
mod status_poller;
mod types;
mod wire;

pub use api::{ChatApi, ReqwestChatApi};
pub use critic_poller::poll_critique;
pub use critique::{decode_critique, CritiqueParseError};
pub use driver::{drive_turn, TurnPlan};
pub use engine::{EngineEvents, EngineHandle};
pub use poll::{ChannelEventSink, EventSink, PollHandle};
pub use score_refresher::refresh_scores;
pub use settings::{ClientSettings, PollSettings};
pub use status_poller::{poll_status, StatusOutcome};
pub use types::{ApiError, EngineEvent, FailureKind};
