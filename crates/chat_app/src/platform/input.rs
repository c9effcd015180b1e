use chat_core::{Msg, OutputNumber};

pub const HELP: &str = "Commands: /prefer <message_id> <1|2>, /dual on|off, /new, /quit. Anything else is sent as a message.";

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Msg(Msg),
    Help(String),
    Quit,
}

/// Turns one line typed by the user into an input. Blank lines are ignored.
pub fn parse_line(line: &str) -> Option<Input> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return Some(Input::Msg(Msg::InputSubmitted(line.trim_end().to_string())));
    };

    let mut words = command.split_whitespace();
    let input = match (words.next(), words.next(), words.next()) {
        (Some("quit"), None, None) => Input::Quit,
        (Some("new"), None, None) => Input::Msg(Msg::NewChatRequested),
        (Some("dual"), Some("on"), None) => Input::Msg(Msg::DualOutputToggled(true)),
        (Some("dual"), Some("off"), None) => Input::Msg(Msg::DualOutputToggled(false)),
        (Some("prefer"), Some(parent_id), Some(output)) => {
            match output.parse().ok().and_then(OutputNumber::from_number) {
                Some(output) => Input::Msg(Msg::PreferClicked {
                    parent_id: parent_id.to_string(),
                    output,
                }),
                None => Input::Help(format!("Output must be 1 or 2, got '{output}'.")),
            }
        }
        (Some("help"), None, None) => Input::Help(HELP.to_string()),
        _ => Input::Help(format!("Unknown command '/{command}'. {HELP}")),
    };
    Some(input)
}
