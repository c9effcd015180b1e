use std::collections::HashMap;

use crate::{CritiqueSnapshot, Message, MessageFields, MessageId, OutputNumber, Role, TurnId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

impl UpsertOutcome {
    pub fn changed(self) -> bool {
        self != UpsertOutcome::Unchanged
    }
}

/// Identity-keyed registry of rendered messages, in arrival order.
///
/// There is at most one entry per id. Entries are only removed by
/// [`MessageStore::purge_placeholders`] and [`MessageStore::clear`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageStore {
    order: Vec<MessageId>,
    messages: HashMap<MessageId, Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    /// All messages in arrival order, hidden ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.order.iter().filter_map(|id| self.messages.get(id))
    }

    pub fn visible(&self) -> impl Iterator<Item = &Message> {
        self.iter().filter(|message| !message.hidden)
    }

    /// Creates the message if `id` is unknown, otherwise merges the provided
    /// fields into the existing entry in place.
    pub fn upsert(&mut self, id: &str, fields: MessageFields) -> UpsertOutcome {
        let Some(existing) = self.messages.get_mut(id) else {
            let mut message = Message::new(
                id,
                fields.role.unwrap_or(Role::Assistant),
                fields.content.unwrap_or_default(),
            );
            message.parent_id = fields.parent_id;
            message.output_number = fields.output_number;
            message.critic_score = fields.critic_score;
            message.turn_id = fields.turn_id;
            self.order.push(message.id.clone());
            self.messages.insert(message.id.clone(), message);
            return UpsertOutcome::Created;
        };

        let mut changed = false;
        if let Some(content) = fields.content {
            if existing.content != content {
                existing.content = content;
                changed = true;
            }
        }
        if fields.parent_id.is_some() && existing.parent_id != fields.parent_id {
            existing.parent_id = fields.parent_id;
            changed = true;
        }
        if fields.output_number.is_some() && existing.output_number != fields.output_number {
            existing.output_number = fields.output_number;
            changed = true;
        }
        if existing.turn_id.is_none() && fields.turn_id.is_some() {
            existing.turn_id = fields.turn_id;
        }
        if let Some(score) = fields.critic_score {
            changed |= apply_score(existing, score);
        }

        if changed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Unchanged
        }
    }

    /// Overwrites the score badge. Returns whether the visible value changed;
    /// unknown ids and repeated values are no-ops.
    pub fn set_score(&mut self, id: &str, score: f64) -> bool {
        match self.messages.get_mut(id) {
            Some(message) => apply_score(message, score),
            None => false,
        }
    }

    /// Attaches a critique and flips `critique_displayed` in one step.
    ///
    /// Returns `false`, leaving the message untouched, when the panel was
    /// already displayed or the id is unknown.
    pub fn display_critique(&mut self, id: &str, critique: CritiqueSnapshot) -> bool {
        match self.messages.get_mut(id) {
            Some(message) if !message.critique_displayed => {
                message.critique_displayed = true;
                message.critique = Some(critique);
                true
            }
            _ => false,
        }
    }

    /// Removes every placeholder belonging to `turn_id` in one pass.
    pub fn purge_placeholders(&mut self, turn_id: TurnId) -> usize {
        let doomed: Vec<MessageId> = self
            .iter()
            .filter(|message| message.is_placeholder && message.turn_id == Some(turn_id))
            .map(|message| message.id.clone())
            .collect();
        for id in &doomed {
            self.messages.remove(id);
        }
        self.order.retain(|id| self.messages.contains_key(id));
        doomed.len()
    }

    /// Inserts a placeholder. Placeholders are local only and never merged.
    pub fn push_placeholder(&mut self, message: Message) {
        debug_assert!(message.is_placeholder);
        if self.messages.contains_key(&message.id) {
            return;
        }
        self.order.push(message.id.clone());
        self.messages.insert(message.id.clone(), message);
    }

    /// Inserts a fully built message unless its id is already present.
    pub fn insert(&mut self, message: Message) -> bool {
        if self.messages.contains_key(&message.id) {
            return false;
        }
        self.order.push(message.id.clone());
        self.messages.insert(message.id.clone(), message);
        true
    }

    pub fn sibling(&self, parent_id: &str, output: OutputNumber) -> Option<&Message> {
        self.iter().find(|message| {
            message.parent_id.as_deref() == Some(parent_id) && message.output_number == Some(output)
        })
    }

    /// Hides a message without removing it. Returns whether anything changed.
    pub fn hide(&mut self, id: &str) -> bool {
        match self.messages.get_mut(id) {
            Some(message) if !message.hidden => {
                message.hidden = true;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.messages.clear();
    }
}

fn apply_score(message: &mut Message, score: f64) -> bool {
    if score.is_nan() || message.critic_score == Some(score) {
        return false;
    }
    message.critic_score = Some(score);
    true
}
