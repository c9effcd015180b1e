use crate::{ChatId, MessageId, OutputNumber, TurnId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartChat,
    SubmitTurn {
        turn_id: TurnId,
        text: String,
        chat_id: Option<ChatId>,
    },
    /// Run the status loop, then the critic loop, for an accepted turn.
    TrackTurn {
        turn_id: TurnId,
        pending_message_id: MessageId,
        chat_id: ChatId,
        dual_output: bool,
    },
    /// Stop every running turn loop; their late results are discarded.
    CancelTurns,
    /// (Re)start the background score refresher for a chat.
    StartScoreRefresh { chat_id: ChatId },
    SendPreference {
        chat_id: ChatId,
        parent_id: MessageId,
        output: OutputNumber,
    },
    SetDualOutput { chat_id: ChatId, enabled: bool },
}
