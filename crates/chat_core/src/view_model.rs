use crate::critique::format_score;
use crate::{
    ChatId, CritiqueSnapshot, Message, MessageId, OutputNumber, Role, SearchResults, StatusCode,
    TurnId, TurnState,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatViewModel {
    pub chat_id: Option<ChatId>,
    pub dual_output: bool,
    /// Visible bubbles in arrival order.
    pub bubbles: Vec<BubbleView>,
    pub hidden_count: usize,
    /// One panel per turn that has rendered a status.
    pub panels: Vec<StatusPanelView>,
    pub notice: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BubbleView {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub parent_id: Option<MessageId>,
    pub output_number: Option<OutputNumber>,
    pub score_badge: Option<String>,
    pub critique: Option<CritiquePanelView>,
    pub is_placeholder: bool,
    pub turn_id: Option<TurnId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CritiquePanelView {
    pub total_score: Option<String>,
    /// `(criterion, score, reason)`
    pub sections: Vec<(String, Option<String>, String)>,
    pub summary: Option<String>,
    pub regenerated_content: Option<String>,
    pub regenerated_score: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPanelView {
    pub turn_id: TurnId,
    pub status: StatusCode,
    pub label: &'static str,
    pub is_error: bool,
    /// Bumps every time the panel is rendered.
    pub revision: u32,
    pub ner_results: Option<String>,
    pub search_call: Option<String>,
    pub search_results: Option<String>,
    pub thinking: Option<String>,
}

pub(crate) fn bubble_view(message: &Message) -> BubbleView {
    BubbleView {
        id: message.id.clone(),
        role: message.role,
        content: message.content.clone(),
        parent_id: message.parent_id.clone(),
        output_number: message.output_number,
        score_badge: message.critic_score.map(format_score),
        critique: message
            .critique
            .as_ref()
            .filter(|_| message.critique_displayed)
            .map(critique_panel),
        is_placeholder: message.is_placeholder,
        turn_id: message.turn_id,
    }
}

fn critique_panel(snapshot: &CritiqueSnapshot) -> CritiquePanelView {
    let critique = snapshot.critique.as_ref();
    CritiquePanelView {
        total_score: critique.and_then(|c| c.total_score).map(format_score),
        sections: critique
            .map(|c| {
                c.sections
                    .iter()
                    .map(|section| {
                        (
                            section.name.clone(),
                            section.score.map(format_score),
                            section.reason.clone(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default(),
        summary: critique.and_then(|c| c.summary.clone()),
        regenerated_content: snapshot.regenerated_content.clone(),
        regenerated_score: snapshot
            .regenerated_critique
            .as_ref()
            .and_then(|c| c.total_score)
            .map(format_score),
    }
}

pub(crate) fn panel_view(turn: &TurnState) -> Option<StatusPanelView> {
    let rendered = turn.panel.rendered()?;
    Some(StatusPanelView {
        turn_id: turn.turn_id,
        status: rendered.status,
        label: rendered.status.label(),
        is_error: rendered.status.is_stage_error(),
        revision: turn.panel.revision(),
        ner_results: rendered.data.ner_results.clone(),
        search_call: rendered.data.search_call.clone(),
        search_results: rendered.data.search_results.as_ref().map(describe_search),
        thinking: rendered.data.thinking.clone(),
    })
}

fn describe_search(search: &SearchResults) -> String {
    let matches = match search.num_matches {
        Some(1) => "1 match".to_string(),
        Some(n) => format!("{n} matches"),
        None => "unknown number of matches".to_string(),
    };
    let visibility = if search.show_results_to_actor {
        "shown to assistant"
    } else {
        "withheld from assistant"
    };
    if search.results.trim().is_empty() {
        format!("{matches} ({visibility})")
    } else {
        format!("{matches} ({visibility})\n{}", search.results.trim())
    }
}
