use crate::ChatId;

/// Conversation context shared by submission and both polling loops.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatSession {
    pub chat_id: Option<ChatId>,
    pub dual_output: bool,
}

impl ChatSession {
    pub fn with_chat(chat_id: impl Into<ChatId>) -> Self {
        Self {
            chat_id: Some(chat_id.into()),
            dual_output: false,
        }
    }
}
