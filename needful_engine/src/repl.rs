//! Control REPL.
//!
//! Reads control commands from the terminal and forwards them to the
//! [`MacroEngine`]. The engine runs on its own thread, so every handler here
//! returns immediately; progress shows up as the host prints effects.

mod input;

use anyhow::Result;
use colored::Colorize;
use log::info;
use textwrap::{fill, termwidth};

use needful_data::{MacroDef, MacroLibrary};
use needful_script::help::{MODIFIERS, VERBS, verb_help};

use crate::control::{ControlCommand, parse_control};
use crate::engine::MacroEngine;
use crate::style::ConsoleStyle;

use input::{InputEvent, InputManager};

const CONTROL_HELP: &[(&str, &str)] = &[
    ("run <name>", "Queue a saved macro."),
    ("run loop <N> <name>", "Queue a saved macro with its last /loop replaced by /loop N."),
    ("pause", "Pause after the current command."),
    ("pause loop", "Pause when the running macro reaches its next /loop or /craft."),
    ("resume", "Continue a paused macro."),
    ("step", "While paused, run one more command."),
    ("stop", "Stop immediately, cancelling any wait, and clear the queue."),
    ("stop loop", "Stop when the running macro reaches its next /loop or /craft."),
    ("status", "Show the engine state and the queue."),
    ("list", "List saved macros."),
    ("exec <line>", "Run a single macro line."),
    ("login / logout", "Simulate the game session starting or ending."),
    ("help [verb]", "Show this text, or the reference for one macro verb or modifier."),
    ("quit", "Stop the engine and exit."),
];

/// Run the control loop until the user quits or input ends.
///
/// # Errors
/// Currently infallible; the signature matches the binary's `main`.
pub fn run_repl(engine: &MacroEngine, library: &MacroLibrary) -> Result<()> {
    let names = library.all_macros().iter().map(|m| m.name.clone()).collect();
    let mut input_manager = InputManager::new(names);

    loop {
        let prompt = format!("\n[{}]>> ", engine.status()).prompt_style().to_string();
        let Ok(event) = input_manager.read_line(&prompt) else {
            println!("{}", "Failed to read input. Try again.".error_style());
            continue;
        };
        let line = match event {
            InputEvent::Line(line) => line,
            InputEvent::Eof => "quit".to_string(),
            InputEvent::Interrupted => {
                println!("Command canceled.");
                continue;
            },
        };
        if line.trim().is_empty() {
            continue;
        }

        info!("control: {}", line.trim());
        match parse_control(&line) {
            ControlCommand::Run { name, loops } => match engine.enqueue_by_name(library, &name, loops) {
                Ok(_) => println!("Queued {}.", name.macro_name_style()),
                Err(err) => println!("{}", err.to_string().error_style()),
            },
            ControlCommand::Pause { at_loop } => engine.pause(at_loop),
            ControlCommand::Resume => engine.resume(),
            ControlCommand::Step => engine.next_step(),
            ControlCommand::Stop { at_loop } => engine.stop(at_loop),
            ControlCommand::Status => status_handler(engine),
            ControlCommand::List => list_handler(library),
            ControlCommand::Help(topic) => help_handler(topic.as_deref()),
            ControlCommand::Login => engine.set_logged_in(true),
            ControlCommand::Logout => engine.set_logged_in(false),
            ControlCommand::Exec(text) => {
                if let Err(err) = engine.enqueue(&MacroDef::new("exec", text)) {
                    println!("{}", err.to_string().error_style());
                }
            },
            ControlCommand::Quit => {
                engine.stop(false);
                println!("Goodbye.");
                break;
            },
            ControlCommand::Unknown => {
                println!("{}", "Didn't catch that. Type 'help' for commands.".italic());
            },
        }
    }
    Ok(())
}

fn status_handler(engine: &MacroEngine) {
    println!("{}", engine.status().state_style());
    let queued = engine.queued();
    if queued.is_empty() {
        println!("{}", "queue is empty".dimmed());
    }
    for (position, entry) in queued.iter().enumerate() {
        println!(
            "{:>3}. {} (step {} of {})",
            position + 1,
            entry.name.macro_name_style(),
            (entry.step + 1).min(entry.len),
            entry.len
        );
    }
}

fn list_handler(library: &MacroLibrary) {
    let macros = library.all_macros();
    if macros.is_empty() {
        println!("{}", "no saved macros".dimmed());
        return;
    }
    for def in macros {
        let marker = if def.craft_loop {
            format!(" craft loop {}", def.craft_loop_count).dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {}{marker}", def.name.macro_name_style());
    }
}

fn help_handler(topic: Option<&str>) {
    let width = termwidth();
    let Some(topic) = topic else {
        println!("{}", "control".section_style());
        for (usage, text) in CONTROL_HELP {
            println!("  {:<22}{text}", usage.bold());
        }
        println!("\n{}", "macro verbs".section_style());
        let names: Vec<&str> = VERBS.iter().map(|v| v.name).collect();
        println!("{}", fill(&names.join(", "), width));
        println!("\n{}", "modifiers".section_style());
        let names: Vec<&str> = MODIFIERS.iter().map(|m| m.name).collect();
        println!("{}", fill(&names.join(", "), width));
        return;
    };

    if let Some(verb) = verb_help(topic) {
        let alias = verb.alias.map(|a| format!(" (/{a})")).unwrap_or_default();
        println!("{}{alias}", format!("/{}", verb.name).bold());
        println!("{}", fill(verb.description, width));
        if !verb.modifiers.is_empty() {
            println!("modifiers: {}", verb.modifiers.join(", "));
        }
        for example in verb.examples {
            println!("  {example}");
        }
    } else if let Some(modifier) = MODIFIERS.iter().find(|m| m.name.eq_ignore_ascii_case(topic)) {
        println!("{}", format!("<{}>", modifier.name).bold());
        println!("{}", fill(modifier.description, width));
        for example in modifier.examples {
            println!("  {example}");
        }
    } else {
        println!("{}", format!("No help for \"{topic}\".").error_style());
    }
}
