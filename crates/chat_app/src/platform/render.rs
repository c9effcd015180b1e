use std::collections::{HashMap, HashSet};

use chat_core::{BubbleView, ChatViewModel, CritiquePanelView, MessageId, Role, StatusPanelView, TurnId};

/// What has already been printed for one bubble.
#[derive(Debug, Clone, PartialEq, Default)]
struct PrintedBubble {
    content: String,
    score_badge: Option<String>,
    critique: bool,
}

/// Append-only terminal renderer. Each call prints only what changed since
/// the previous view: new or rewritten bubbles, moved score badges, first
/// critique panels, re-rendered status panels, and hidden outputs.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    chat_id: Option<String>,
    bubbles: HashMap<MessageId, PrintedBubble>,
    panels: HashMap<TurnId, u32>,
    hidden: HashSet<MessageId>,
    notice: Option<String>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &ChatViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        if view.chat_id != self.chat_id {
            *self = Self::default();
            self.chat_id = view.chat_id.clone();
            if let Some(chat_id) = &view.chat_id {
                lines.push(format!("== chat {chat_id} =="));
            }
        }

        for panel in &view.panels {
            let printed = self.panels.get(&panel.turn_id).copied().unwrap_or(0);
            if panel.revision > printed {
                self.panels.insert(panel.turn_id, panel.revision);
                lines.extend(panel_lines(panel));
            }
        }

        let visible: HashSet<&str> = view.bubbles.iter().map(|b| b.id.as_str()).collect();
        for bubble in &view.bubbles {
            lines.extend(self.bubble_lines(bubble));
        }
        for (id, printed) in &self.bubbles {
            if !visible.contains(id.as_str()) && !self.hidden.contains(id) && !printed.content.is_empty() {
                self.hidden.insert(id.clone());
                lines.push(format!("   (output {id} hidden)"));
            }
        }
        // Placeholders leave the store once their turn resolves.
        self.bubbles.retain(|id, printed| visible.contains(id.as_str()) || !printed.content.is_empty());

        if view.notice != self.notice {
            self.notice = view.notice.clone();
            if let Some(notice) = &view.notice {
                lines.push(format!("!  {notice}"));
            }
        }

        lines
    }

    fn bubble_lines(&mut self, bubble: &BubbleView) -> Vec<String> {
        let mut lines = Vec::new();
        if bubble.is_placeholder {
            if !self.bubbles.contains_key(&bubble.id) {
                lines.push(format!("   … {}", bubble.content));
                self.bubbles.insert(bubble.id.clone(), PrintedBubble::default());
            }
            return lines;
        }

        self.hidden.remove(&bubble.id);
        let printed = self.bubbles.entry(bubble.id.clone()).or_default();
        if printed.content != bubble.content {
            printed.content = bubble.content.clone();
            lines.push(format!("{} {}", bubble_prefix(bubble), bubble.content));
        }
        if printed.score_badge != bubble.score_badge {
            printed.score_badge = bubble.score_badge.clone();
            if let Some(badge) = &bubble.score_badge {
                lines.push(format!("   [{}] score {badge}", bubble.id));
            }
        }
        if !printed.critique {
            if let Some(critique) = &bubble.critique {
                printed.critique = true;
                lines.extend(critique_lines(&bubble.id, critique));
            }
        }
        lines
    }
}

fn bubble_prefix(bubble: &BubbleView) -> String {
    match bubble.role {
        Role::User => "you>".to_string(),
        Role::Error => "error>".to_string(),
        Role::Assistant => match (&bubble.parent_id, bubble.output_number) {
            (Some(parent), Some(output)) => format!("assistant [{}] ({parent}/{output})>", bubble.id),
            _ => format!("assistant [{}]>", bubble.id),
        },
    }
}

fn panel_lines(panel: &StatusPanelView) -> Vec<String> {
    let marker = if panel.is_error { "x" } else { "*" };
    let mut lines = vec![format!("   {marker} turn {}: {}", panel.turn_id, panel.label)];
    let details = [
        ("entities", &panel.ner_results),
        ("search", &panel.search_call),
        ("results", &panel.search_results),
        ("thinking", &panel.thinking),
    ];
    for (name, value) in details {
        if let Some(value) = value {
            lines.push(format!("     {name}: {}", indent(value)));
        }
    }
    lines
}

fn critique_lines(id: &str, critique: &CritiquePanelView) -> Vec<String> {
    let mut lines = vec![format!(
        "   [{id}] critique{}",
        critique
            .total_score
            .as_ref()
            .map(|score| format!(" (total {score})"))
            .unwrap_or_default()
    )];
    for (name, score, reason) in &critique.sections {
        let score = score.as_deref().unwrap_or("-");
        lines.push(format!("     {name} {score}: {reason}"));
    }
    if let Some(summary) = &critique.summary {
        lines.push(format!("     summary: {}", indent(summary)));
    }
    if let Some(content) = &critique.regenerated_content {
        lines.push(format!("     regenerated: {}", indent(content)));
    }
    if let Some(score) = &critique.regenerated_score {
        lines.push(format!("     regenerated score {score}"));
    }
    lines
}

fn indent(text: &str) -> String {
    text.replace('\n', "\n       ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{OutputNumber, StatusCode};
    use pretty_assertions::assert_eq;

    fn bubble(id: &str, role: Role, content: &str) -> BubbleView {
        BubbleView {
            id: id.to_string(),
            role,
            content: content.to_string(),
            parent_id: None,
            output_number: None,
            score_badge: None,
            critique: None,
            is_placeholder: false,
            turn_id: Some(1),
        }
    }

    fn panel(revision: u32, status: StatusCode) -> StatusPanelView {
        StatusPanelView {
            turn_id: 1,
            status,
            label: status.label(),
            is_error: false,
            revision,
            ner_results: None,
            search_call: None,
            search_results: None,
            thinking: None,
        }
    }

    fn view(bubbles: Vec<BubbleView>, panels: Vec<StatusPanelView>) -> ChatViewModel {
        ChatViewModel {
            chat_id: Some("c".to_string()),
            bubbles,
            panels,
            ..ChatViewModel::default()
        }
    }

    #[test]
    fn unchanged_view_prints_nothing_twice() {
        let mut renderer = TerminalRenderer::new();
        let first = view(
            vec![bubble("u-1", Role::User, "Plan a trip")],
            vec![panel(1, StatusCode::NerStarted)],
        );

        let lines = renderer.render(&first);
        assert_eq!(lines.len(), 3);
        assert!(renderer.render(&first).is_empty());
    }

    #[test]
    fn only_changes_are_printed() {
        let mut renderer = TerminalRenderer::new();
        renderer.render(&view(
            vec![bubble("u-1", Role::User, "Plan a trip")],
            vec![panel(1, StatusCode::NerStarted)],
        ));

        let mut answer = bubble("a-1", Role::Assistant, "Here are options");
        answer.score_badge = Some("7.0".to_string());
        let lines = renderer.render(&view(
            vec![bubble("u-1", Role::User, "Plan a trip"), answer],
            vec![panel(2, StatusCode::Completed)],
        ));

        assert_eq!(
            lines,
            vec![
                "   * turn 1: Completed".to_string(),
                "assistant [a-1]> Here are options".to_string(),
                "   [a-1] score 7.0".to_string(),
            ]
        );
    }

    #[test]
    fn hidden_sibling_is_announced_once() {
        let mut renderer = TerminalRenderer::new();
        let mut first = bubble("a-1", Role::Assistant, "Option one");
        first.parent_id = Some("P".to_string());
        first.output_number = Some(OutputNumber::First);
        let mut second = bubble("a-2", Role::Assistant, "Option two");
        second.parent_id = Some("P".to_string());
        second.output_number = Some(OutputNumber::Second);
        renderer.render(&view(vec![first, second.clone()], Vec::new()));

        let lines = renderer.render(&view(vec![second.clone()], Vec::new()));
        assert_eq!(lines, vec!["   (output a-1 hidden)".to_string()]);
        assert!(renderer.render(&view(vec![second], Vec::new())).is_empty());
    }

    #[test]
    fn placeholder_is_printed_once_and_forgotten() {
        let mut renderer = TerminalRenderer::new();
        let mut placeholder = bubble("pending-1", Role::Assistant, "Thinking…");
        placeholder.is_placeholder = true;

        assert_eq!(renderer.render(&view(vec![placeholder.clone()], Vec::new())).len(), 2);
        assert!(renderer.render(&view(vec![placeholder], Vec::new())).is_empty());
        assert!(renderer.render(&view(Vec::new(), Vec::new())).is_empty());
    }
}
