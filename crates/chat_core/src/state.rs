use std::collections::BTreeMap;

use crate::view_model::{bubble_view, panel_view, ChatViewModel};
use crate::{ChatSession, MessageStore, TurnId, TurnState};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    session: ChatSession,
    store: MessageStore,
    turns: BTreeMap<TurnId, TurnState>,
    next_turn_id: TurnId,
    notice: Option<String>,
    /// Set by a new-chat request made while a conversation exists; the
    /// next session start clears it.
    restart_pending: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State bound to an already-started chat.
    pub fn with_session(session: ChatSession) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }

    pub fn view(&self) -> ChatViewModel {
        ChatViewModel {
            chat_id: self.session.chat_id.clone(),
            dual_output: self.session.dual_output,
            bubbles: self.store.visible().map(bubble_view).collect(),
            hidden_count: self.store.iter().filter(|message| message.hidden).count(),
            panels: self.turns.values().filter_map(panel_view).collect(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn turn(&self, turn_id: TurnId) -> Option<&TurnState> {
        self.turns.get(&turn_id)
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.session
    }

    pub(crate) fn store_mut(&mut self) -> &mut MessageStore {
        &mut self.store
    }

    pub(crate) fn turn_mut(&mut self, turn_id: TurnId) -> Option<&mut TurnState> {
        self.turns.get_mut(&turn_id)
    }

    /// Both the store and the turn are needed together when a turn resolves.
    pub(crate) fn turn_and_store_mut(
        &mut self,
        turn_id: TurnId,
    ) -> Option<(&mut TurnState, &mut MessageStore)> {
        let turn = self.turns.get_mut(&turn_id)?;
        Some((turn, &mut self.store))
    }

    pub(crate) fn open_turn(&mut self, text: &str) -> TurnId {
        self.next_turn_id += 1;
        let turn_id = self.next_turn_id;
        self.turns.insert(turn_id, TurnState::new(turn_id, text));
        turn_id
    }

    /// Records a new-chat request. Only a request made while a chat or any
    /// message exists restarts the conversation when the session arrives.
    pub(crate) fn request_new_chat(&mut self) {
        self.restart_pending = self.session.chat_id.is_some() || !self.store.is_empty();
    }

    pub(crate) fn take_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart_pending)
    }

    /// Bulk clear for a session reset. Turn ids keep increasing so late
    /// results from the previous chat never match a new turn.
    pub(crate) fn reset_conversation(&mut self) {
        self.store.clear();
        self.turns.clear();
        self.notice = None;
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }
}
