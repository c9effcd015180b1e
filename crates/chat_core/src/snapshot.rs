use crate::{ChatId, CritiqueSnapshot, MessageId, OutputNumber, StatusCode};

/// Search step output as shown in the status panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResults {
    pub num_matches: Option<u32>,
    /// Whether the backend passed the results on to the response generator.
    pub show_results_to_actor: bool,
    pub results: String,
}

/// Intermediate pipeline outputs, already rendered to display text at the
/// HTTP boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessingData {
    pub ner_results: Option<String>,
    pub search_call: Option<String>,
    pub search_results: Option<SearchResults>,
    pub thinking: Option<String>,
}

impl ProcessingData {
    /// Folds `newer` into `self`. Fields present in `newer` replace older
    /// values; absent ones never clear what was already shown.
    pub fn absorb(&mut self, newer: ProcessingData) {
        if newer.ner_results.is_some() {
            self.ner_results = newer.ner_results;
        }
        if newer.search_call.is_some() {
            self.search_call = newer.search_call;
        }
        if newer.search_results.is_some() {
            self.search_results = newer.search_results;
        }
        if newer.thinking.is_some() {
            self.thinking = newer.thinking;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ner_results.is_none()
            && self.search_call.is_none()
            && self.search_results.is_none()
            && self.thinking.is_none()
    }
}

/// One status poll response.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingSnapshot {
    pub status: StatusCode,
    /// Id of the assistant message the backend is filling in.
    pub message_id: Option<MessageId>,
    pub content: Option<String>,
    pub critic_score: Option<f64>,
    pub processing: ProcessingData,
}

impl ProcessingSnapshot {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            message_id: None,
            content: None,
            critic_score: None,
            processing: ProcessingData::default(),
        }
    }

    /// Content with surrounding whitespace removed, if any is left.
    pub fn final_content(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|content| !content.is_empty())
    }

    /// The status loop stops on the first snapshot that is both terminal and
    /// carries content; a terminal status alone may precede the content.
    pub fn is_final(&self) -> bool {
        self.status.is_terminal() && self.final_content().is_some()
    }

    /// Id of the assistant message this snapshot finalizes. A snapshot that
    /// names no message finalizes the pending message itself.
    pub fn assistant_id(&self, pending_message_id: &str) -> MessageId {
        self.message_id
            .clone()
            .unwrap_or_else(|| pending_message_id.to_string())
    }
}

/// Successful turn submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReceipt {
    pub chat_id: ChatId,
    pub user_message_id: MessageId,
    pub user_message_content: String,
    /// Id to poll the pipeline status with; parent of the assistant outputs.
    pub pending_message_id: MessageId,
}

/// Decoded message detail record polled by the critic loop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageDetail {
    pub id: MessageId,
    pub critic_score: Option<f64>,
    pub critique: Option<CritiqueSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreUpdate {
    pub message_id: MessageId,
    pub critic_score: f64,
}

/// One assistant output inside a transcript turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptOutput {
    pub id: MessageId,
    pub content: String,
    pub output_number: OutputNumber,
    pub critic_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptTurn {
    pub message_id: MessageId,
    pub user: Option<(MessageId, String)>,
    pub outputs: Vec<TranscriptOutput>,
    pub preferred: Option<OutputNumber>,
}

/// Server-side view of a whole chat, used to rebuild messages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcript {
    pub chat_id: ChatId,
    pub turns: Vec<TranscriptTurn>,
}
