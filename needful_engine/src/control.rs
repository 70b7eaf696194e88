//! Control commands typed at the `needful` prompt.

use needful_script::unquote;

/// Requests the operator can make of the engine.
#[derive(Debug, Clone, PartialEq, Eq, variantly::Variantly)]
pub enum ControlCommand {
    /// Queue a saved macro, optionally with its last `/loop` replaced.
    Run {
        name: String,
        loops: Option<u32>,
    },
    Pause {
        at_loop: bool,
    },
    Resume,
    Step,
    Stop {
        at_loop: bool,
    },
    Status,
    List,
    Help(Option<String>),
    Login,
    Logout,
    /// Queue the rest of the line as a one-line ad hoc macro.
    Exec(String),
    Quit,
    Unknown,
}

/// Parses an input line into a [`ControlCommand`].
///
/// Keywords are case-insensitive. Macro names keep their original case and
/// may contain spaces or be wrapped in double quotes.
pub fn parse_control(input: &str) -> ControlCommand {
    let words: Vec<&str> = input.split_whitespace().collect();
    let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let lower: Vec<&str> = lowered.iter().map(String::as_str).collect();
    let rest = |from: usize| unquote(&words[from..].join(" ")).to_string();

    match lower.as_slice() {
        ["run", "loop", count, _, ..] if count.parse::<u32>().is_ok() => ControlCommand::Run {
            name: rest(3),
            loops: count.parse().ok(),
        },
        ["run", _, ..] => ControlCommand::Run {
            name: rest(1),
            loops: None,
        },
        ["pause"] => ControlCommand::Pause { at_loop: false },
        ["pause", "loop"] => ControlCommand::Pause { at_loop: true },
        ["resume" | "continue"] => ControlCommand::Resume,
        ["step" | "next"] => ControlCommand::Step,
        ["stop"] => ControlCommand::Stop { at_loop: false },
        ["stop", "loop"] => ControlCommand::Stop { at_loop: true },
        ["status"] => ControlCommand::Status,
        ["list" | "ls" | "macros"] => ControlCommand::List,
        ["help" | "?"] => ControlCommand::Help(None),
        ["help" | "?", topic] => ControlCommand::Help(Some(topic.trim_start_matches('/').to_string())),
        ["login"] => ControlCommand::Login,
        ["logout"] => ControlCommand::Logout,
        ["exec", _, ..] => ControlCommand::Exec(words[1..].join(" ")),
        ["quit" | "exit"] => ControlCommand::Quit,
        _ => ControlCommand::Unknown,
    }
}
