use chat_core::{update, AppState, Effect, Msg, Role, TurnId, TurnPhase, TurnReceipt};
use pretty_assertions::assert_eq;

fn init_logging() {
    chat_logging::initialize_for_tests();
}

fn submit(state: AppState, text: &str) -> (AppState, Vec<Effect>) {
    update(state, Msg::InputSubmitted(text.to_string()))
}

fn submitted_turn_id(effects: &[Effect]) -> TurnId {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::SubmitTurn { turn_id, .. } => Some(*turn_id),
            _ => None,
        })
        .expect("submit effect")
}

fn receipt(chat_id: &str, user_id: &str, content: &str, pending: &str) -> TurnReceipt {
    TurnReceipt {
        chat_id: chat_id.to_string(),
        user_message_id: user_id.to_string(),
        user_message_content: content.to_string(),
        pending_message_id: pending.to_string(),
    }
}

#[test]
fn submission_shows_placeholder_and_requests_send() {
    init_logging();
    let (mut state, effects) = submit(AppState::new(), "  Plan a trip to Kyoto \n");

    assert_eq!(
        effects,
        vec![Effect::SubmitTurn {
            turn_id: 1,
            text: "Plan a trip to Kyoto".to_string(),
            chat_id: None,
        }]
    );
    let view = state.view();
    assert_eq!(view.bubbles.len(), 1);
    assert!(view.bubbles[0].is_placeholder);
    assert_eq!(view.bubbles[0].content, "Plan a trip to Kyoto");
    assert!(state.consume_dirty());
}

#[test]
fn blank_input_is_ignored() {
    init_logging();
    let (mut state, effects) = submit(AppState::new(), "   \n");

    assert!(effects.is_empty());
    assert!(state.view().bubbles.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn accepted_turn_replaces_placeholder_with_server_message() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "Plan a trip to Kyoto");
    let turn_id = submitted_turn_id(&effects);

    let (state, effects) = update(
        state,
        Msg::TurnAccepted {
            turn_id,
            receipt: receipt("chat-9", "u-41", "Plan a trip to Kyoto", "m-41"),
        },
    );

    let view = state.view();
    assert_eq!(view.chat_id.as_deref(), Some("chat-9"));
    assert_eq!(view.bubbles.len(), 1);
    assert_eq!(view.bubbles[0].id, "u-41");
    assert_eq!(view.bubbles[0].content, "Plan a trip to Kyoto");
    assert!(!view.bubbles[0].is_placeholder);
    assert!(state.turn(turn_id).unwrap().placeholders_purged());
    assert_eq!(state.turn(turn_id).unwrap().phase, TurnPhase::Processing);
    assert_eq!(
        effects,
        vec![
            Effect::StartScoreRefresh {
                chat_id: "chat-9".to_string()
            },
            Effect::TrackTurn {
                turn_id,
                pending_message_id: "m-41".to_string(),
                chat_id: "chat-9".to_string(),
                dual_output: false,
            },
        ]
    );
}

#[test]
fn server_normalized_user_text_is_shown_verbatim() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "hello   there");
    let turn_id = submitted_turn_id(&effects);

    let (state, _) = update(
        state,
        Msg::TurnAccepted {
            turn_id,
            receipt: receipt("c", "u-1", "hello there", "m-1"),
        },
    );

    assert_eq!(state.view().bubbles[0].content, "hello there");
}

#[test]
fn second_turn_in_same_chat_does_not_restart_score_refresh() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "first");
    let first = submitted_turn_id(&effects);
    let (state, _) = update(
        state,
        Msg::TurnAccepted {
            turn_id: first,
            receipt: receipt("c", "u-1", "first", "m-1"),
        },
    );

    let (state, effects) = submit(state, "second");
    assert_eq!(
        effects,
        vec![Effect::SubmitTurn {
            turn_id: 2,
            text: "second".to_string(),
            chat_id: Some("c".to_string()),
        }]
    );
    let (_, effects) = update(
        state,
        Msg::TurnAccepted {
            turn_id: 2,
            receipt: receipt("c", "u-2", "second", "m-2"),
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::TrackTurn { .. }]));
}

#[test]
fn rejected_turn_shows_single_error_and_never_polls() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "hello");
    let turn_id = submitted_turn_id(&effects);

    let (state, effects) = update(
        state,
        Msg::TurnRejected {
            turn_id,
            error: "network error".to_string(),
        },
    );
    assert!(effects.is_empty());

    // A duplicate failure report must not add a second bubble.
    let (state, effects) = update(
        state,
        Msg::TurnRejected {
            turn_id,
            error: "network error".to_string(),
        },
    );
    assert!(effects.is_empty());

    let view = state.view();
    assert_eq!(view.bubbles.len(), 1);
    assert_eq!(view.bubbles[0].role, Role::Error);
    assert!(view.bubbles[0].content.contains("network error"));
    assert_eq!(state.turn(turn_id).unwrap().phase, TurnPhase::Rejected);
}

#[test]
fn placeholders_of_other_pending_turns_survive() {
    init_logging();
    let (state, _) = submit(AppState::new(), "one");
    let (state, _) = submit(state, "two");

    let (state, _) = update(
        state,
        Msg::TurnAccepted {
            turn_id: 1,
            receipt: receipt("c", "u-1", "one", "m-1"),
        },
    );

    let view = state.view();
    let ids: Vec<_> = view.bubbles.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["pending-2", "u-1"]);
    assert!(view.bubbles[0].is_placeholder);
}

#[test]
fn no_view_ever_holds_placeholder_and_resolution_together() {
    init_logging();
    let (state, _) = submit(AppState::new(), "hello");
    let during = state.view();
    assert!(during.bubbles.iter().all(|b| b.is_placeholder));

    let (state, _) = update(
        state,
        Msg::TurnAccepted {
            turn_id: 1,
            receipt: receipt("c", "u-1", "hello", "m-1"),
        },
    );
    let after = state.view();
    assert!(after.bubbles.iter().all(|b| !b.is_placeholder));
}

#[test]
fn new_chat_clears_everything_and_cancels_loops() {
    init_logging();
    let (state, _) = submit(AppState::new(), "hello");
    let (state, _) = update(
        state,
        Msg::TurnAccepted {
            turn_id: 1,
            receipt: receipt("old", "u-1", "hello", "m-1"),
        },
    );

    let (state, effects) = update(state, Msg::NewChatRequested);
    assert_eq!(effects, vec![Effect::StartChat]);
    let (state, effects) = update(
        state,
        Msg::SessionStarted {
            chat_id: "new".to_string(),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::CancelTurns,
            Effect::StartScoreRefresh {
                chat_id: "new".to_string()
            },
        ]
    );
    let view = state.view();
    assert!(view.bubbles.is_empty());
    assert!(view.panels.is_empty());
    assert_eq!(view.chat_id.as_deref(), Some("new"));

    // A receipt for a turn from before the reset is dropped.
    let (state, effects) = update(
        state,
        Msg::TurnAccepted {
            turn_id: 1,
            receipt: receipt("old", "u-1", "hello", "m-1"),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view().bubbles.is_empty());
}

fn user_bubble_contents(state: &AppState) -> Vec<String> {
    state
        .view()
        .bubbles
        .iter()
        .filter(|b| b.role == Role::User && !b.is_placeholder)
        .map(|b| b.content.clone())
        .collect()
}

#[test]
fn launch_session_arriving_before_receipt_keeps_the_turn() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::NewChatRequested);
    assert_eq!(effects, vec![Effect::StartChat]);
    let (state, effects) = submit(state, "Plan a trip to Kyoto");
    let turn_id = submitted_turn_id(&effects);

    let (state, effects) = update(
        state,
        Msg::SessionStarted {
            chat_id: "A".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::StartScoreRefresh {
            chat_id: "A".to_string()
        }]
    );
    assert_eq!(state.view().bubbles.len(), 1);

    // The submission went out without a chat id, so the server picked its own.
    let (state, effects) = update(
        state,
        Msg::TurnAccepted {
            turn_id,
            receipt: receipt("B", "u-1", "Plan a trip to Kyoto", "m-1"),
        },
    );

    assert_eq!(user_bubble_contents(&state), vec!["Plan a trip to Kyoto"]);
    assert_eq!(state.view().chat_id.as_deref(), Some("B"));
    assert_eq!(state.turn(turn_id).unwrap().phase, TurnPhase::Processing);
    assert_eq!(
        effects,
        vec![
            Effect::StartScoreRefresh {
                chat_id: "B".to_string()
            },
            Effect::TrackTurn {
                turn_id,
                pending_message_id: "m-1".to_string(),
                chat_id: "B".to_string(),
                dual_output: false,
            },
        ]
    );
}

#[test]
fn launch_session_arriving_after_receipt_is_ignored() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::NewChatRequested);
    let (state, effects) = submit(state, "Plan a trip to Kyoto");
    let turn_id = submitted_turn_id(&effects);
    let (state, _) = update(
        state,
        Msg::TurnAccepted {
            turn_id,
            receipt: receipt("B", "u-1", "Plan a trip to Kyoto", "m-1"),
        },
    );

    let (state, effects) = update(
        state,
        Msg::SessionStarted {
            chat_id: "A".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(user_bubble_contents(&state), vec!["Plan a trip to Kyoto"]);
    assert_eq!(state.view().chat_id.as_deref(), Some("B"));
    assert_eq!(state.turn(turn_id).unwrap().phase, TurnPhase::Processing);
}

#[test]
fn failed_new_chat_does_not_reset_a_later_session() {
    init_logging();
    let (state, _) = submit(AppState::new(), "hello");
    let (state, _) = update(
        state,
        Msg::TurnAccepted {
            turn_id: 1,
            receipt: receipt("c", "u-1", "hello", "m-1"),
        },
    );
    let (state, _) = update(state, Msg::NewChatRequested);
    let (state, _) = update(
        state,
        Msg::SessionStartFailed {
            error: "network error".to_string(),
        },
    );

    let (state, effects) = update(
        state,
        Msg::SessionStarted {
            chat_id: "late".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(user_bubble_contents(&state), vec!["hello"]);
    assert_eq!(state.view().chat_id.as_deref(), Some("c"));
}
