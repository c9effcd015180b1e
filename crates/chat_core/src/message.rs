use std::fmt;

use crate::CritiqueSnapshot;

/// Server-issued identifier (or a local one for placeholders and error bubbles).
pub type MessageId = String;
pub type ChatId = String;
/// Local key of one user submission.
pub type TurnId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
    /// Synthetic bubble reporting a failed submission.
    Error,
}

/// Which of the two dual-output candidates a message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputNumber {
    First,
    Second,
}

impl OutputNumber {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(OutputNumber::First),
            2 => Some(OutputNumber::Second),
            _ => None,
        }
    }

    pub fn as_number(self) -> u8 {
        match self {
            OutputNumber::First => 1,
            OutputNumber::Second => 2,
        }
    }

    pub fn sibling(self) -> Self {
        match self {
            OutputNumber::First => OutputNumber::Second,
            OutputNumber::Second => OutputNumber::First,
        }
    }
}

impl fmt::Display for OutputNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_number())
    }
}

/// A rendered message bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub parent_id: Option<MessageId>,
    pub output_number: Option<OutputNumber>,
    pub critic_score: Option<f64>,
    pub critique: Option<CritiqueSnapshot>,
    pub critique_displayed: bool,
    pub is_placeholder: bool,
    pub hidden: bool,
    /// Turn that produced the message; `None` for messages loaded from a transcript.
    pub turn_id: Option<TurnId>,
}

impl Message {
    pub fn new(id: impl Into<MessageId>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            parent_id: None,
            output_number: None,
            critic_score: None,
            critique: None,
            critique_displayed: false,
            is_placeholder: false,
            hidden: false,
            turn_id: None,
        }
    }

    pub fn placeholder(turn_id: TurnId, content: impl Into<String>) -> Self {
        Self {
            is_placeholder: true,
            turn_id: Some(turn_id),
            ..Self::new(format!("pending-{turn_id}"), Role::User, content)
        }
    }

    pub fn submission_error(turn_id: TurnId, error: &str) -> Self {
        Self {
            turn_id: Some(turn_id),
            ..Self::new(
                format!("error-{turn_id}"),
                Role::Error,
                format!("Sorry, your message could not be sent: {error}"),
            )
        }
    }
}

/// Fields an upsert may provide. Absent fields leave an existing message untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageFields {
    pub role: Option<Role>,
    pub content: Option<String>,
    pub parent_id: Option<MessageId>,
    pub output_number: Option<OutputNumber>,
    pub critic_score: Option<f64>,
    pub turn_id: Option<TurnId>,
}

impl MessageFields {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Some(Role::User),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Some(Role::Assistant),
            content: Some(content.into()),
            ..Self::default()
        }
    }
}
