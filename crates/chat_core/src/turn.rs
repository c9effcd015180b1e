use crate::{MessageId, ProcessingData, ProcessingSnapshot, StatusCode, TurnId};

/// Where a turn is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    /// Submission request in flight.
    #[default]
    Submitting,
    /// Status loop running.
    Processing,
    /// Content finalized; critic loop running.
    Critiquing,
    /// Critic loop finished (critique seen, expired, or aborted).
    Settled,
    /// Status loop hit its ceiling; last rendered panel is final.
    Expired,
    /// A poll failed and the status loop stopped silently.
    Stalled,
    /// Submission failed; an error bubble was shown.
    Rejected,
}

impl TurnPhase {
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TurnPhase::Submitting | TurnPhase::Processing | TurnPhase::Critiquing
        )
    }
}

/// The two polling loops a turn goes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Status,
    Critic,
}

/// Why a polling loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Status loop saw a terminal status with content.
    Finalized,
    /// Critic loop saw critique or regenerated content.
    Observed,
    /// Ceiling reached; not an error.
    Expired,
    /// A poll failed; the loop stopped without reporting it.
    Failed,
    Cancelled,
}

/// What the status panel currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPanel {
    pub status: StatusCode,
    pub data: ProcessingData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelChange {
    Rendered,
    Repeated,
    OutOfOrder,
}

/// Status panel of one turn.
///
/// Processing data accumulates from every snapshot; the panel itself is only
/// re-rendered when the status moves forward.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusPanel {
    accumulated: ProcessingData,
    rendered: Option<RenderedPanel>,
    revision: u32,
}

impl StatusPanel {
    pub fn observe(&mut self, snapshot: &ProcessingSnapshot) -> PanelChange {
        self.accumulated.absorb(snapshot.processing.clone());

        let change = match &self.rendered {
            None => PanelChange::Rendered,
            Some(last) if last.status.can_advance_to(snapshot.status) => PanelChange::Rendered,
            Some(last) if last.status == snapshot.status => PanelChange::Repeated,
            Some(_) => PanelChange::OutOfOrder,
        };

        if change == PanelChange::Rendered {
            self.rendered = Some(RenderedPanel {
                status: snapshot.status,
                data: self.accumulated.clone(),
            });
            self.revision += 1;
        }
        change
    }

    pub fn rendered(&self) -> Option<&RenderedPanel> {
        self.rendered.as_ref()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.rendered.as_ref().map(|panel| panel.status)
    }

    /// Number of times the panel has been rendered.
    pub fn revision(&self) -> u32 {
        self.revision
    }
}

/// Lifecycle state of one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnState {
    pub turn_id: TurnId,
    pub text: String,
    pub phase: TurnPhase,
    pub pending_message_id: Option<MessageId>,
    pub assistant_message_id: Option<MessageId>,
    pub panel: StatusPanel,
    placeholders_purged: bool,
}

impl TurnState {
    pub fn new(turn_id: TurnId, text: impl Into<String>) -> Self {
        Self {
            turn_id,
            text: text.into(),
            phase: TurnPhase::Submitting,
            pending_message_id: None,
            assistant_message_id: None,
            panel: StatusPanel::default(),
            placeholders_purged: false,
        }
    }

    /// Returns `true` exactly once per turn: the caller must purge the turn's
    /// placeholders right then.
    pub fn take_purge(&mut self) -> bool {
        !std::mem::replace(&mut self.placeholders_purged, true)
    }

    pub fn placeholders_purged(&self) -> bool {
        self.placeholders_purged
    }
}
