use std::fmt;

use chat_core::{
    ChatId, LoopExit, LoopPhase, MessageDetail, MessageId, OutputNumber, ProcessingSnapshot,
    ScoreUpdate, Transcript, TurnId, TurnReceipt,
};

/// Everything the engine reports back to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ChatStarted {
        chat_id: ChatId,
    },
    ChatStartFailed {
        error: ApiError,
    },
    TurnAccepted {
        turn_id: TurnId,
        receipt: TurnReceipt,
    },
    TurnRejected {
        turn_id: TurnId,
        error: ApiError,
    },
    Status {
        turn_id: TurnId,
        snapshot: ProcessingSnapshot,
    },
    Detail {
        turn_id: TurnId,
        detail: MessageDetail,
    },
    Transcript(Transcript),
    LoopEnded {
        turn_id: TurnId,
        phase: LoopPhase,
        exit: LoopExit,
    },
    Scores(Vec<ScoreUpdate>),
    PreferenceRecorded {
        parent_id: MessageId,
        output: OutputNumber,
    },
    PreferenceFailed {
        parent_id: MessageId,
        error: ApiError,
    },
    DualOutputChanged {
        enabled: bool,
    },
    DualOutputFailed {
        error: ApiError,
    },
}

/// A failed backend call.
///
/// [`FailureKind::Server`] means the backend answered with an `error`
/// field; every other kind is a transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_server(&self) -> bool {
        self.kind == FailureKind::Server
    }

    /// Text suitable for an error bubble.
    pub fn user_message(&self) -> String {
        match self.kind {
            FailureKind::Server => self.message.clone(),
            _ => self.kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    InvalidConfig,
    HttpStatus(u16),
    Timeout,
    Network,
    /// The response body did not have the expected shape.
    Decode,
    /// The backend reported an error in the response body.
    Server,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidConfig => write!(f, "invalid client configuration"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response"),
            FailureKind::Server => write!(f, "server error"),
        }
    }
}
