use chat_logging::{chat_debug, chat_info, chat_warn};

use crate::{
    AppState, ChatId, Effect, LoopExit, LoopPhase, Message, MessageDetail, MessageFields, Msg,
    OutputNumber, PanelChange, ProcessingSnapshot, ScoreUpdate, Transcript, TurnId, TurnPhase,
    TurnReceipt,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputSubmitted(raw) => submit_input(&mut state, &raw),
        Msg::NewChatRequested => {
            state.request_new_chat();
            vec![Effect::StartChat]
        }
        Msg::SessionStarted { chat_id } => start_session(&mut state, chat_id),
        Msg::SessionStartFailed { error } => {
            chat_warn!("Could not start a chat: {}", error);
            state.take_restart();
            state.set_notice(format!("Could not start a new chat: {error}"));
            state.mark_dirty();
            Vec::new()
        }
        Msg::TurnAccepted { turn_id, receipt } => accept_turn(&mut state, turn_id, receipt),
        Msg::TurnRejected { turn_id, error } => {
            reject_turn(&mut state, turn_id, &error);
            Vec::new()
        }
        Msg::StatusPolled { turn_id, snapshot } => {
            apply_status(&mut state, turn_id, snapshot);
            Vec::new()
        }
        Msg::MessageDetailPolled { turn_id, detail } => {
            apply_detail(&mut state, turn_id, detail);
            Vec::new()
        }
        Msg::TranscriptLoaded(transcript) => {
            apply_transcript(&mut state, transcript);
            Vec::new()
        }
        Msg::LoopEnded {
            turn_id,
            phase,
            exit,
        } => {
            end_loop(&mut state, turn_id, phase, exit);
            Vec::new()
        }
        Msg::ScoresRefreshed(scores) => {
            apply_scores(&mut state, scores);
            Vec::new()
        }
        Msg::PreferClicked { parent_id, output } => {
            let Some(chat_id) = state.session().chat_id.clone() else {
                return (state, Vec::new());
            };
            if state.store().sibling(&parent_id, output).is_none() {
                chat_debug!("Ignoring preference for unknown output {}/{}", parent_id, output);
                return (state, Vec::new());
            }
            vec![Effect::SendPreference {
                chat_id,
                parent_id,
                output,
            }]
        }
        Msg::PreferenceRecorded { parent_id, output } => {
            hide_sibling(&mut state, &parent_id, output);
            Vec::new()
        }
        Msg::PreferenceFailed { parent_id, error } => {
            chat_warn!("Preference for {} rejected: {}", parent_id, error);
            state.set_notice(format!("Could not record your choice: {error}"));
            state.mark_dirty();
            Vec::new()
        }
        Msg::DualOutputToggled(enabled) => match state.session().chat_id.clone() {
            Some(chat_id) if state.session().dual_output != enabled => {
                vec![Effect::SetDualOutput { chat_id, enabled }]
            }
            _ => Vec::new(),
        },
        Msg::DualOutputChanged(enabled) => {
            if state.session().dual_output != enabled {
                state.session_mut().dual_output = enabled;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DualOutputFailed { error } => {
            state.set_notice(format!("Could not switch dual output: {error}"));
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_session(state: &mut AppState, chat_id: ChatId) -> Vec<Effect> {
    if state.take_restart() {
        chat_info!("New chat started chat_id={}", chat_id);
        state.reset_conversation();
        let session = state.session_mut();
        session.chat_id = Some(chat_id.clone());
        session.dual_output = false;
        state.mark_dirty();
        return vec![Effect::CancelTurns, Effect::StartScoreRefresh { chat_id }];
    }

    // A turn accepted before this response already bound the session.
    if let Some(current) = &state.session().chat_id {
        chat_debug!("Session {} kept; started chat {} unused", current, chat_id);
        return Vec::new();
    }

    chat_info!("Session started chat_id={}", chat_id);
    state.session_mut().chat_id = Some(chat_id.clone());
    state.mark_dirty();
    vec![Effect::StartScoreRefresh { chat_id }]
}

fn submit_input(state: &mut AppState, raw: &str) -> Vec<Effect> {
    let text = raw.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let turn_id = state.open_turn(text);
    state
        .store_mut()
        .push_placeholder(Message::placeholder(turn_id, text));
    state.mark_dirty();
    chat_info!(turn = turn_id; "Submitting turn len={}", text.len());

    vec![Effect::SubmitTurn {
        turn_id,
        text: text.to_string(),
        chat_id: state.session().chat_id.clone(),
    }]
}

fn accept_turn(state: &mut AppState, turn_id: TurnId, receipt: TurnReceipt) -> Vec<Effect> {
    let Some((turn, store)) = state.turn_and_store_mut(turn_id) else {
        chat_debug!(turn = turn_id; "Receipt for unknown turn ignored");
        return Vec::new();
    };
    if turn.phase != TurnPhase::Submitting {
        return Vec::new();
    }

    if turn.take_purge() {
        store.purge_placeholders(turn_id);
    }
    store.upsert(
        &receipt.user_message_id,
        MessageFields {
            turn_id: Some(turn_id),
            ..MessageFields::user(receipt.user_message_content.clone())
        },
    );
    turn.pending_message_id = Some(receipt.pending_message_id.clone());
    turn.phase = TurnPhase::Processing;
    chat_info!(
        turn = turn_id;
        "Accepted chat_id={} message_id={}",
        receipt.chat_id,
        receipt.pending_message_id
    );

    let mut effects = Vec::with_capacity(2);
    if state.session().chat_id.as_deref() != Some(receipt.chat_id.as_str()) {
        state.session_mut().chat_id = Some(receipt.chat_id.clone());
        effects.push(Effect::StartScoreRefresh {
            chat_id: receipt.chat_id.clone(),
        });
    }
    effects.push(Effect::TrackTurn {
        turn_id,
        pending_message_id: receipt.pending_message_id,
        chat_id: receipt.chat_id,
        dual_output: state.session().dual_output,
    });
    state.mark_dirty();
    effects
}

fn reject_turn(state: &mut AppState, turn_id: TurnId, error: &str) {
    let Some((turn, store)) = state.turn_and_store_mut(turn_id) else {
        return;
    };
    if turn.phase != TurnPhase::Submitting {
        return;
    }

    chat_warn!(turn = turn_id; "Submission failed: {}", error);
    if turn.take_purge() {
        store.purge_placeholders(turn_id);
    }
    store.insert(Message::submission_error(turn_id, error));
    turn.phase = TurnPhase::Rejected;
    state.mark_dirty();
}

fn apply_status(state: &mut AppState, turn_id: TurnId, snapshot: ProcessingSnapshot) {
    let Some((turn, store)) = state.turn_and_store_mut(turn_id) else {
        return;
    };
    if turn.phase != TurnPhase::Processing {
        chat_debug!(turn = turn_id; "Late status {} ignored", snapshot.status);
        return;
    }

    let mut changed = false;
    match turn.panel.observe(&snapshot) {
        PanelChange::Rendered => {
            chat_debug!(turn = turn_id; "Status -> {}", snapshot.status);
            changed = true;
        }
        PanelChange::Repeated => {}
        PanelChange::OutOfOrder => {
            chat_debug!(
                turn = turn_id;
                "Out-of-order status {} after {:?} ignored",
                snapshot.status,
                turn.panel.status()
            );
        }
    }

    let pending = turn.pending_message_id.clone();
    if let (Some(content), Some(pending)) = (snapshot.final_content(), pending) {
        if snapshot.status.is_terminal() {
            let id = snapshot.assistant_id(&pending);
            if turn.take_purge() {
                store.purge_placeholders(turn_id);
            }
            store.upsert(
                &id,
                MessageFields {
                    parent_id: Some(pending),
                    output_number: Some(OutputNumber::First),
                    critic_score: snapshot.critic_score,
                    turn_id: Some(turn_id),
                    ..MessageFields::assistant(content)
                },
            );
            chat_info!(turn = turn_id; "Finalized with {} as {}", snapshot.status, id);
            turn.assistant_message_id = Some(id);
            turn.phase = TurnPhase::Critiquing;
            changed = true;
        }
    }

    if changed {
        state.mark_dirty();
    }
}

fn apply_detail(state: &mut AppState, turn_id: TurnId, detail: MessageDetail) {
    let store = state.store_mut();
    if store.get(&detail.id).is_none() {
        chat_debug!(turn = turn_id; "Detail for unknown message {} ignored", detail.id);
        return;
    }

    let mut changed = false;
    if let Some(score) = detail.critic_score {
        changed |= store.set_score(&detail.id, score);
    }
    if let Some(critique) = detail.critique.filter(|critique| critique.has_news()) {
        if store.display_critique(&detail.id, critique) {
            chat_info!(turn = turn_id; "Critique displayed for {}", detail.id);
            changed = true;
        }
    }

    if changed {
        state.mark_dirty();
    }
}

fn apply_transcript(state: &mut AppState, transcript: Transcript) {
    if state.session().chat_id.as_deref() != Some(transcript.chat_id.as_str()) {
        chat_debug!("Transcript for another chat {} ignored", transcript.chat_id);
        return;
    }

    let mut changed = false;
    for turn in transcript.turns {
        if let Some((id, content)) = turn.user {
            changed |= state
                .store_mut()
                .upsert(&id, MessageFields::user(content))
                .changed();
        }
        for output in turn.outputs {
            changed |= state
                .store_mut()
                .upsert(
                    &output.id,
                    MessageFields {
                        parent_id: Some(turn.message_id.clone()),
                        output_number: Some(output.output_number),
                        critic_score: output.critic_score,
                        ..MessageFields::assistant(output.content)
                    },
                )
                .changed();
        }
        if let Some(preferred) = turn.preferred {
            changed |= hide_sibling_quiet(state, &turn.message_id, preferred);
        }
    }

    if changed {
        state.mark_dirty();
    }
}

fn end_loop(state: &mut AppState, turn_id: TurnId, phase: LoopPhase, exit: LoopExit) {
    let Some(turn) = state.turn_mut(turn_id) else {
        return;
    };

    chat_info!(turn = turn_id; "{:?} loop ended: {:?}", phase, exit);
    turn.phase = match (phase, exit, turn.phase) {
        (LoopPhase::Status, LoopExit::Expired, TurnPhase::Processing) => TurnPhase::Expired,
        (LoopPhase::Status, LoopExit::Failed, TurnPhase::Processing) => TurnPhase::Stalled,
        (LoopPhase::Status, LoopExit::Cancelled, TurnPhase::Processing) => TurnPhase::Stalled,
        (LoopPhase::Critic, _, TurnPhase::Critiquing) => TurnPhase::Settled,
        (_, _, current) => current,
    };
}

fn apply_scores(state: &mut AppState, scores: Vec<ScoreUpdate>) {
    let store = state.store_mut();
    let mut changed = false;
    for update in scores {
        let visible = store
            .get(&update.message_id)
            .is_some_and(|message| !message.hidden);
        if visible {
            changed |= store.set_score(&update.message_id, update.critic_score);
        }
    }
    if changed {
        state.mark_dirty();
    }
}

fn hide_sibling(state: &mut AppState, parent_id: &str, preferred: OutputNumber) {
    if hide_sibling_quiet(state, parent_id, preferred) {
        chat_info!("Preferred output {} for {}", preferred, parent_id);
        state.mark_dirty();
    }
}

fn hide_sibling_quiet(state: &mut AppState, parent_id: &str, preferred: OutputNumber) -> bool {
    let Some(sibling_id) = state
        .store()
        .sibling(parent_id, preferred.sibling())
        .map(|message| message.id.clone())
    else {
        return false;
    };
    state.store_mut().hide(&sibling_id)
}
