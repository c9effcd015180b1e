use chat_core::{
    update, AppState, LoopExit, LoopPhase, Msg, OutputNumber, ProcessingData, ProcessingSnapshot,
    Role, SearchResults, StatusCode, TurnId, TurnPhase, TurnReceipt,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    chat_logging::initialize_for_tests();
}

/// A turn that has been accepted by the backend and is being polled.
fn processing_turn() -> (AppState, TurnId) {
    let (state, _) = update(AppState::new(), Msg::InputSubmitted("Plan a trip".to_string()));
    let (state, _) = update(
        state,
        Msg::TurnAccepted {
            turn_id: 1,
            receipt: TurnReceipt {
                chat_id: "chat-1".to_string(),
                user_message_id: "u-1".to_string(),
                user_message_content: "Plan a trip".to_string(),
                pending_message_id: "m-1".to_string(),
            },
        },
    );
    (state, 1)
}

fn snapshot(status: StatusCode) -> ProcessingSnapshot {
    ProcessingSnapshot {
        message_id: Some("a-1".to_string()),
        ..ProcessingSnapshot::new(status)
    }
}

fn poll(state: AppState, turn_id: TurnId, snapshot: ProcessingSnapshot) -> AppState {
    let (state, effects) = update(state, Msg::StatusPolled { turn_id, snapshot });
    assert!(effects.is_empty());
    state
}

#[test]
fn panel_renders_once_per_distinct_status() {
    init_logging();
    let (mut state, turn_id) = processing_turn();
    state.consume_dirty();

    let sequence = [
        StatusCode::ProcessingStarted,
        StatusCode::ProcessingStarted,
        StatusCode::NerStarted,
        StatusCode::NerStarted,
        StatusCode::NerStarted,
        StatusCode::NerCompleted,
        StatusCode::SearchStarted,
        StatusCode::SearchStarted,
    ];
    let mut renders = Vec::new();
    for status in sequence {
        state = poll(state, turn_id, snapshot(status));
        if state.consume_dirty() {
            renders.push(state.view().panels[0].status);
        }
    }

    assert_eq!(
        renders,
        vec![
            StatusCode::ProcessingStarted,
            StatusCode::NerStarted,
            StatusCode::NerCompleted,
            StatusCode::SearchStarted,
        ]
    );
    assert_eq!(state.view().panels[0].revision, 4);
}

#[test]
fn happy_path_renders_four_panels_and_one_assistant_bubble() {
    init_logging();
    let (mut state, turn_id) = processing_turn();
    state.consume_dirty();

    let mut panel_states = Vec::new();
    for status in [
        StatusCode::ProcessingStarted,
        StatusCode::NerStarted,
        StatusCode::SearchStarted,
        StatusCode::GeneratingResponse,
    ] {
        state = poll(state, turn_id, snapshot(status));
        assert!(state.consume_dirty());
        panel_states.push(state.view().panels[0].label);
    }
    assert_eq!(panel_states.len(), 4);
    assert!(state.view().bubbles.iter().all(|b| b.role == Role::User));

    let final_snapshot = ProcessingSnapshot {
        content: Some("Here are options…".to_string()),
        critic_score: Some(8.0),
        ..snapshot(StatusCode::ResponseGenerated)
    };
    state = poll(state, turn_id, final_snapshot.clone());
    // The same final snapshot delivered again changes nothing.
    state.consume_dirty();
    state = poll(state, turn_id, final_snapshot);
    assert!(!state.consume_dirty());

    let view = state.view();
    let assistants: Vec<_> = view
        .bubbles
        .iter()
        .filter(|b| b.role == Role::Assistant)
        .collect();
    assert_eq!(assistants.len(), 1);
    assert_eq!(assistants[0].id, "a-1");
    assert_eq!(assistants[0].content, "Here are options…");
    assert_eq!(assistants[0].parent_id.as_deref(), Some("m-1"));
    assert_eq!(assistants[0].output_number, Some(OutputNumber::First));
    assert_eq!(assistants[0].score_badge.as_deref(), Some("8.0"));
    assert_eq!(state.turn(turn_id).unwrap().phase, TurnPhase::Critiquing);
}

#[test]
fn terminal_status_without_content_keeps_polling() {
    init_logging();
    let (state, turn_id) = processing_turn();

    let state = poll(state, turn_id, snapshot(StatusCode::ResponseGenerated));
    let state = poll(
        state,
        turn_id,
        ProcessingSnapshot {
            content: Some("   ".to_string()),
            ..snapshot(StatusCode::ResponseGenerated)
        },
    );
    assert_eq!(state.turn(turn_id).unwrap().phase, TurnPhase::Processing);
    assert!(state.view().bubbles.iter().all(|b| b.role == Role::User));

    let state = poll(
        state,
        turn_id,
        ProcessingSnapshot {
            content: Some("Done".to_string()),
            ..snapshot(StatusCode::ResponseGenerated)
        },
    );
    assert_eq!(state.turn(turn_id).unwrap().phase, TurnPhase::Critiquing);
    assert_eq!(state.view().panels[0].revision, 1);
}

#[test]
fn non_terminal_status_with_content_is_not_final() {
    init_logging();
    let (state, turn_id) = processing_turn();

    let state = poll(
        state,
        turn_id,
        ProcessingSnapshot {
            content: Some("Processing your request...".to_string()),
            ..snapshot(StatusCode::NerStarted)
        },
    );

    assert_eq!(state.turn(turn_id).unwrap().phase, TurnPhase::Processing);
    assert_eq!(state.view().bubbles.len(), 1);
}

#[test]
fn processing_fields_accumulate_and_are_never_retracted() {
    init_logging();
    let (state, turn_id) = processing_turn();

    let state = poll(
        state,
        turn_id,
        ProcessingSnapshot {
            processing: ProcessingData {
                ner_results: Some("city: Kyoto".to_string()),
                ..ProcessingData::default()
            },
            ..snapshot(StatusCode::NerCompleted)
        },
    );
    let state = poll(
        state,
        turn_id,
        ProcessingSnapshot {
            processing: ProcessingData {
                search_call: Some("search_func(city=Kyoto)".to_string()),
                ..ProcessingData::default()
            },
            ..snapshot(StatusCode::SearchCallCompleted)
        },
    );
    let state = poll(
        state,
        turn_id,
        ProcessingSnapshot {
            processing: ProcessingData {
                search_results: Some(SearchResults {
                    num_matches: Some(3),
                    show_results_to_actor: true,
                    results: "Hotel name: Ryokan".to_string(),
                }),
                ..ProcessingData::default()
            },
            ..snapshot(StatusCode::SearchCompleted)
        },
    );
    // Status moves on with no processing data at all.
    let state = poll(state, turn_id, snapshot(StatusCode::GeneratingResponse));

    let panel = &state.view().panels[0];
    assert_eq!(panel.status, StatusCode::GeneratingResponse);
    assert_eq!(panel.ner_results.as_deref(), Some("city: Kyoto"));
    assert_eq!(panel.search_call.as_deref(), Some("search_func(city=Kyoto)"));
    assert_eq!(
        panel.search_results.as_deref(),
        Some("3 matches (shown to assistant)\nHotel name: Ryokan")
    );
}

#[test]
fn out_of_order_status_is_not_rendered() {
    init_logging();
    let (mut state, turn_id) = processing_turn();

    state = poll(state, turn_id, snapshot(StatusCode::SearchStarted));
    state.consume_dirty();
    state = poll(state, turn_id, snapshot(StatusCode::NerStarted));

    assert!(!state.consume_dirty());
    assert_eq!(state.view().panels[0].status, StatusCode::SearchStarted);
    assert_eq!(state.view().panels[0].revision, 1);
}

#[test]
fn error_is_terminal_from_any_state() {
    init_logging();
    let (state, turn_id) = processing_turn();

    let state = poll(state, turn_id, snapshot(StatusCode::SearchStarted));
    let state = poll(
        state,
        turn_id,
        ProcessingSnapshot {
            content: Some("I'm sorry, an error occurred while processing your request.".to_string()),
            ..snapshot(StatusCode::Error)
        },
    );

    let view = state.view();
    assert_eq!(view.panels[0].status, StatusCode::Error);
    assert!(view.panels[0].is_error);
    assert_eq!(state.turn(turn_id).unwrap().phase, TurnPhase::Critiquing);
    assert!(view.bubbles.iter().any(|b| b.role == Role::Assistant));
}

#[test]
fn expired_status_loop_leaves_last_panel_without_bubble_or_error() {
    init_logging();
    let (state, turn_id) = processing_turn();

    let state = poll(state, turn_id, snapshot(StatusCode::SearchStarted));
    let (mut state, effects) = update(
        state,
        Msg::LoopEnded {
            turn_id,
            phase: LoopPhase::Status,
            exit: LoopExit::Expired,
        },
    );
    assert!(effects.is_empty());

    let view = state.view();
    assert_eq!(view.panels[0].status, StatusCode::SearchStarted);
    assert!(view.bubbles.iter().all(|b| b.role == Role::User));
    assert!(view.notice.is_none());
    assert_eq!(state.turn(turn_id).unwrap().phase, TurnPhase::Expired);
    state.consume_dirty();

    // Anything that still trickles in after expiry is discarded.
    let state = poll(
        state,
        turn_id,
        ProcessingSnapshot {
            content: Some("late".to_string()),
            ..snapshot(StatusCode::Completed)
        },
    );
    assert_eq!(state.view().panels[0].status, StatusCode::SearchStarted);
    assert!(state.view().bubbles.iter().all(|b| b.role == Role::User));
}

#[test]
fn failed_poll_stalls_turn_silently() {
    init_logging();
    let (state, turn_id) = processing_turn();
    let state = poll(state, turn_id, snapshot(StatusCode::NerStarted));

    let (state, _) = update(
        state,
        Msg::LoopEnded {
            turn_id,
            phase: LoopPhase::Status,
            exit: LoopExit::Failed,
        },
    );

    assert_eq!(state.turn(turn_id).unwrap().phase, TurnPhase::Stalled);
    assert!(state.view().bubbles.iter().all(|b| b.role != Role::Error));
}
