//! JSON shapes exchanged with the backend and their conversion into core
//! types. Ids arrive as strings or integers; both are kept as strings.
use chat_core::{
    MessageId, OutputNumber, ProcessingData, ProcessingSnapshot, ScoreUpdate, SearchResults,
    StatusCode, Transcript, TranscriptOutput, TranscriptTurn, TurnReceipt,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, FailureKind};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    pub(crate) fn into_string(self) -> String {
        match self {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartChatResponse {
    pub chat_id: Option<WireId>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitTurnRequest<'a> {
    pub user_input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitTurnResponse {
    pub chat_id: Option<WireId>,
    pub message_id: Option<WireId>,
    pub user_message: Option<UserMessageWire>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserMessageWire {
    pub id: WireId,
    #[serde(default)]
    pub content: String,
}

impl SubmitTurnResponse {
    /// `submitted` stands in for the echoed user message when the backend
    /// leaves it out.
    pub(crate) fn into_receipt(self, submitted: &str) -> Result<TurnReceipt, ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::new(FailureKind::Server, error));
        }
        let chat_id = self
            .chat_id
            .ok_or_else(|| ApiError::new(FailureKind::Decode, "missing chat_id"))?
            .into_string();
        let pending_message_id = self
            .message_id
            .ok_or_else(|| ApiError::new(FailureKind::Decode, "missing message_id"))?
            .into_string();
        let (user_message_id, user_message_content) = match self.user_message {
            Some(user) => (user.id.into_string(), user.content),
            None => (format!("{pending_message_id}-user"), submitted.to_string()),
        };
        Ok(TurnReceipt {
            chat_id,
            user_message_id,
            user_message_content,
            pending_message_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: String,
    pub message_id: Option<WireId>,
    pub content: Option<String>,
    pub critic_score: Option<f64>,
    pub processing_data: Option<ProcessingDataWire>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProcessingDataWire {
    pub ner_results: Option<Value>,
    pub search_call: Option<Value>,
    pub search_results: Option<SearchResultsWire>,
    pub thinking: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResultsWire {
    pub num_matches: Option<Value>,
    pub show_results_to_actor: Option<bool>,
    pub results: Option<Value>,
}

impl StatusResponse {
    /// Unknown status strings are rejected; the poller treats them as a
    /// failed poll.
    pub(crate) fn into_snapshot(self) -> Result<ProcessingSnapshot, ApiError> {
        let status = StatusCode::parse(&self.status).ok_or_else(|| {
            ApiError::new(
                FailureKind::Decode,
                format!("unknown status '{}'", self.status),
            )
        })?;
        let processing = self
            .processing_data
            .map(ProcessingDataWire::into_processing)
            .unwrap_or_default();
        Ok(ProcessingSnapshot {
            status,
            message_id: self.message_id.map(WireId::into_string),
            content: self.content,
            critic_score: self.critic_score,
            processing,
        })
    }
}

impl ProcessingDataWire {
    fn into_processing(self) -> ProcessingData {
        ProcessingData {
            ner_results: self.ner_results.and_then(display_value),
            search_call: self.search_call.and_then(display_value),
            search_results: self.search_results.map(SearchResultsWire::into_results),
            thinking: self.thinking.and_then(display_value),
        }
    }
}

impl SearchResultsWire {
    fn into_results(self) -> SearchResults {
        SearchResults {
            num_matches: self.num_matches.as_ref().and_then(count_of),
            show_results_to_actor: self.show_results_to_actor.unwrap_or(false),
            results: self.results.and_then(display_value).unwrap_or_default(),
        }
    }
}

/// Text as-is, everything else pretty-printed. Null and blank text are
/// treated as absent.
pub(crate) fn display_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        other => serde_json::to_string_pretty(&other).ok(),
    }
}

fn count_of(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageDetailResponse {
    pub id: WireId,
    pub critic_score: Option<f64>,
    pub search_output: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoresResponse {
    #[serde(default)]
    pub scores: Vec<ScoreEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreEntry {
    pub id: WireId,
    pub critic_score: Option<f64>,
}

impl ScoresResponse {
    pub(crate) fn into_updates(self) -> Vec<ScoreUpdate> {
        self.scores
            .into_iter()
            .filter_map(|entry| {
                entry.critic_score.map(|critic_score| ScoreUpdate {
                    message_id: entry.id.into_string(),
                    critic_score,
                })
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PreferRequest {
    pub preferred_output: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DualOutputResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatDump {
    pub id: WireId,
    #[serde(default)]
    pub messages: Vec<MessageDump>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageDump {
    pub id: WireId,
    pub user_message: Option<UserMessageWire>,
    #[serde(default)]
    pub assistant_messages: Vec<AssistantDump>,
    pub preferred_assistant: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssistantDump {
    pub id: WireId,
    #[serde(default)]
    pub content: Option<String>,
    pub output_number: Option<u8>,
    pub critic_score: Option<f64>,
}

impl ChatDump {
    pub(crate) fn into_transcript(self) -> Transcript {
        Transcript {
            chat_id: self.id.into_string(),
            turns: self.messages.into_iter().map(MessageDump::into_turn).collect(),
        }
    }
}

impl MessageDump {
    fn into_turn(self) -> TranscriptTurn {
        let message_id: MessageId = self.id.into_string();
        let outputs = self
            .assistant_messages
            .into_iter()
            .filter_map(|assistant| {
                // Outputs still being generated have no content yet.
                let content = assistant.content.filter(|c| !c.trim().is_empty())?;
                Some(TranscriptOutput {
                    id: assistant.id.into_string(),
                    content,
                    output_number: assistant
                        .output_number
                        .and_then(OutputNumber::from_number)
                        .unwrap_or(OutputNumber::First),
                    critic_score: assistant.critic_score,
                })
            })
            .collect();
        TranscriptTurn {
            message_id,
            user: self
                .user_message
                .map(|user| (user.id.into_string(), user.content)),
            outputs,
            preferred: self.preferred_assistant.and_then(OutputNumber::from_number),
        }
    }
}
