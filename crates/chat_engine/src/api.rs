use chat_core::{
    ChatId, MessageDetail, OutputNumber, ProcessingSnapshot, ScoreUpdate, Transcript,
    TurnReceipt,
};
use chat_logging::chat_warn;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde::de::DeserializeOwned;
use url::Url;

use crate::critique::decode_critique;
use crate::settings::ClientSettings;
use crate::wire::{
    ChatDump, DualOutputResponse, ErrorBody, MessageDetailResponse, PreferRequest,
    ScoresResponse, StartChatResponse, StatusResponse, SubmitTurnRequest, SubmitTurnResponse,
};
use crate::{ApiError, FailureKind};

/// The backend operations the client needs.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    async fn start_chat(&self) -> Result<ChatId, ApiError>;

    async fn submit_turn(&self, text: &str, chat_id: Option<&str>)
        -> Result<TurnReceipt, ApiError>;

    /// `message_id` is the pending id returned by [`ChatApi::submit_turn`].
    async fn poll_status(&self, message_id: &str) -> Result<ProcessingSnapshot, ApiError>;

    async fn fetch_message(&self, message_id: &str) -> Result<MessageDetail, ApiError>;

    async fn refresh_scores(&self, chat_id: &str) -> Result<Vec<ScoreUpdate>, ApiError>;

    async fn prefer_output(
        &self,
        chat_id: &str,
        parent_id: &str,
        output: OutputNumber,
    ) -> Result<(), ApiError>;

    /// Returns the mode the backend reports after the change.
    async fn set_dual_output(&self, chat_id: &str, enabled: bool) -> Result<bool, ApiError>;

    async fn fetch_transcript(&self, chat_id: &str) -> Result<Transcript, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestChatApi {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestChatApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = settings.session_cookie.as_deref() {
            let value = HeaderValue::from_str(cookie)
                .map_err(|err| ApiError::new(FailureKind::InvalidConfig, err.to_string()))?;
            headers.insert(COOKIE, value);
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| ApiError::new(FailureKind::InvalidConfig, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url cannot have a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            // The backend explains most failures in an `error` field.
            if let Ok(ErrorBody { error: Some(error) }) = serde_json::from_slice(&body) {
                return Err(ApiError::new(FailureKind::Server, error));
            }
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl ChatApi for ReqwestChatApi {
    async fn start_chat(&self) -> Result<ChatId, ApiError> {
        let url = self.endpoint(&["assistant", "chat", "start"])?;
        let response: StartChatResponse = self.send(self.client.post(url)).await?;
        if let Some(error) = response.error {
            return Err(ApiError::new(FailureKind::Server, error));
        }
        response
            .chat_id
            .map(|id| id.into_string())
            .ok_or_else(|| ApiError::new(FailureKind::Decode, "missing chat_id"))
    }

    async fn submit_turn(
        &self,
        text: &str,
        chat_id: Option<&str>,
    ) -> Result<TurnReceipt, ApiError> {
        let url = self.endpoint(&["assistant", "chat"])?;
        let body = SubmitTurnRequest {
            user_input: text,
            chat_id,
        };
        let response: SubmitTurnResponse = self.send(self.client.post(url).json(&body)).await?;
        response.into_receipt(text)
    }

    async fn poll_status(&self, message_id: &str) -> Result<ProcessingSnapshot, ApiError> {
        let url = self.endpoint(&["assistant", "chat", "status", message_id])?;
        let response: StatusResponse = self.send(self.client.get(url)).await?;
        response.into_snapshot()
    }

    async fn fetch_message(&self, message_id: &str) -> Result<MessageDetail, ApiError> {
        let url = self.endpoint(&["assistant", "chat", "message", message_id])?;
        let response: MessageDetailResponse = self.send(self.client.get(url)).await?;

        let critique = match response.search_output.as_ref().map(decode_critique) {
            None => None,
            Some(Ok(critique)) => critique,
            Some(Err(err)) => {
                // Keep polling; the critic may still write a usable record.
                chat_warn!("Ignoring critique of message {}: {}", message_id, err);
                None
            }
        };
        Ok(MessageDetail {
            id: response.id.into_string(),
            critic_score: response.critic_score,
            critique,
        })
    }

    async fn refresh_scores(&self, chat_id: &str) -> Result<Vec<ScoreUpdate>, ApiError> {
        let url = self.endpoint(&["assistant", "chat", "score", chat_id])?;
        let response: ScoresResponse = self.send(self.client.post(url)).await?;
        Ok(response.into_updates())
    }

    async fn prefer_output(
        &self,
        chat_id: &str,
        parent_id: &str,
        output: OutputNumber,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["assistant", "chat", chat_id, "message", parent_id, "prefer"])?;
        let body = PreferRequest {
            preferred_output: output.as_number(),
        };
        let response: ErrorBody = self.send(self.client.post(url).json(&body)).await?;
        match response.error {
            Some(error) => Err(ApiError::new(FailureKind::Server, error)),
            None => Ok(()),
        }
    }

    async fn set_dual_output(&self, chat_id: &str, enabled: bool) -> Result<bool, ApiError> {
        let action = if enabled {
            "enable_second_assistant"
        } else {
            "disable_second_assistant"
        };
        let url = self.endpoint(&["assistant", "chat", action, chat_id])?;
        let response: DualOutputResponse = self.send(self.client.post(url)).await?;
        if let Some(error) = response.error {
            return Err(ApiError::new(FailureKind::Server, error));
        }
        match response.success {
            Some(false) => Err(ApiError::new(
                FailureKind::Server,
                format!("backend refused {action}"),
            )),
            _ => Ok(enabled),
        }
    }

    async fn fetch_transcript(&self, chat_id: &str) -> Result<Transcript, ApiError> {
        let url = self.endpoint(&["assistant", "chat", chat_id])?;
        let response: ChatDump = self.send(self.client.get(url)).await?;
        Ok(response.into_transcript())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ApiError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
