use std::sync::Arc;
use std::time::Duration;

use chat_engine::{
    ClientSettings, EngineEvent, EngineEvents, EngineHandle, PollSettings, ReqwestChatApi,
};
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    chat_logging::initialize_for_tests();
}

fn spawn_engine(server: &MockServer) -> (EngineHandle, EngineEvents) {
    let base = Url::parse(&server.uri()).unwrap();
    let api = ReqwestChatApi::new(ClientSettings::new(base)).expect("client");
    let settings = PollSettings {
        status_interval: Duration::from_millis(20),
        status_ceiling: Duration::from_secs(2),
        critic_interval: Duration::from_millis(20),
        critic_ceiling: Duration::from_secs(2),
        score_refresh_interval: Duration::from_secs(60),
    };
    EngineHandle::spawn(Arc::new(api), settings)
}

fn wait_for<F>(events: &EngineEvents, mut matches: F) -> Option<EngineEvent>
where
    F: FnMut(&EngineEvent) -> bool,
{
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while std::time::Instant::now() < deadline {
        if let Some(event) = events.recv_timeout(Duration::from_millis(50)) {
            if matches(&event) {
                return Some(event);
            }
        }
    }
    None
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_starts_chat_and_submits_turn() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assistant/chat/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chat_id": 9})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/assistant/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "Model offline"})))
        .mount(&server)
        .await;

    let (engine, events) = spawn_engine(&server);
    engine.start_chat();
    let started = wait_for(&events, |event| matches!(event, EngineEvent::ChatStarted { .. }));
    assert_eq!(
        started,
        Some(EngineEvent::ChatStarted {
            chat_id: "9".to_string()
        })
    );

    engine.submit_turn(4, "hello", Some("9".to_string()));
    let rejected = wait_for(&events, |event| matches!(event, EngineEvent::TurnRejected { .. }));
    match rejected {
        Some(EngineEvent::TurnRejected { turn_id, error }) => {
            assert_eq!(turn_id, 4);
            assert_eq!(error.user_message(), "Model offline");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    engine.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_turns_stop_reporting() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/assistant/chat/status/m-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ner_started"})))
        .mount(&server)
        .await;

    let (engine, events) = spawn_engine(&server);
    engine.track_turn(chat_engine::TurnPlan {
        turn_id: 1,
        pending_message_id: "m-1".to_string(),
        chat_id: "9".to_string(),
        dual_output: false,
    });
    assert!(wait_for(&events, |event| matches!(event, EngineEvent::Status { .. })).is_some());

    engine.cancel_turns();
    std::thread::sleep(Duration::from_millis(200));
    while events.try_recv().is_some() {}
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(events.try_recv(), None);
    engine.shutdown();
}
