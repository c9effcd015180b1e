use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chat_core::{update, AppState, Msg};
use chat_engine::{ApiError, EngineHandle, ReqwestChatApi};
use chat_logging::{chat_info, chat_warn};
use chrono::Local;

use super::config::{AppConfig, ConfigError, DEFAULT_CONFIG_FILE};
use super::effects::EffectRunner;
use super::input::{parse_line, Input, HELP};
use super::logging;
use super::render::TerminalRenderer;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not build the HTTP client: {0}")]
    Client(#[from] ApiError),
}

/// Everything the main loop reacts to.
enum Event {
    Msg(Msg),
    Help(String),
    Quit,
}

pub fn run_app() -> Result<(), StartupError> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let (config, config_error) = match AppConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    logging::initialize(config.log_destination, config.log_level);
    if let Some(err) = config_error {
        chat_warn!("Using default configuration: {}", err);
        eprintln!("Warning: using default configuration: {err}");
    }
    chat_info!("Connecting to {}", config.base_url);

    let api = ReqwestChatApi::new(config.client_settings()?)?;
    let (engine, engine_events) = EngineHandle::spawn(Arc::new(api), config.poll_settings());

    let (event_tx, event_rx) = mpsc::channel::<Event>();
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, engine_events, msg_tx.clone());
    forward_messages(msg_rx, event_tx.clone());
    spawn_input_reader(event_tx.clone());

    // Background tick to throttle rendering.
    thread::spawn(move || {
        let interval = Duration::from_millis(100);
        while msg_tx.send(Msg::Tick).is_ok() {
            thread::sleep(interval);
        }
    });

    println!("{HELP}");
    let _ = event_tx.send(Event::Msg(Msg::NewChatRequested));

    let mut state = AppState::new();
    let mut renderer = TerminalRenderer::new();
    while let Ok(event) = event_rx.recv() {
        match event {
            Event::Msg(Msg::Tick) => {
                if state.consume_dirty() {
                    print_lines(renderer.render(&state.view()));
                }
            }
            Event::Msg(msg) => {
                let (next, effects) = update(state, msg);
                state = next;
                runner.enqueue(effects);
            }
            Event::Help(text) => print_lines(vec![text]),
            Event::Quit => break,
        }
    }

    chat_info!("Shutting down");
    runner.shutdown();
    Ok(())
}

fn forward_messages(msg_rx: mpsc::Receiver<Msg>, event_tx: mpsc::Sender<Event>) {
    thread::spawn(move || {
        while let Ok(msg) = msg_rx.recv() {
            if event_tx.send(Event::Msg(msg)).is_err() {
                break;
            }
        }
    });
}

/// Reads stdin line by line; end of input quits.
fn spawn_input_reader(event_tx: mpsc::Sender<Event>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    chat_warn!("Failed to read input: {}", err);
                    break;
                }
            };
            let event = match parse_line(&line) {
                None => continue,
                Some(Input::Msg(msg)) => Event::Msg(msg),
                Some(Input::Help(text)) => Event::Help(text),
                Some(Input::Quit) => Event::Quit,
            };
            let quitting = matches!(event, Event::Quit);
            if event_tx.send(event).is_err() || quitting {
                return;
            }
        }
        let _ = event_tx.send(Event::Quit);
    });
}

fn print_lines(lines: Vec<String>) {
    let stamp = Local::now().format("%H:%M:%S");
    for line in lines {
        println!("{stamp} {line}");
    }
}
