//! A macro that has been parsed and queued for execution.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;
use uuid::Uuid;

use needful_data::{MacroDef, Settings};
use needful_script::{Command, CraftLoopTemplate, MacroParser, MacroSyntaxError, replace_last_loop, rewrite};

/// Parsed commands plus the cursor and loop counters of one run.
///
/// The command list is shared and immutable; cloning an `ActiveMacro` copies only the cursor
/// state, which is how the engine executes a command without holding the queue lock.
#[derive(Debug, Clone)]
pub struct ActiveMacro {
    id: Uuid,
    name: String,
    commands: Arc<[Command]>,
    step: usize,
    next_step: Option<usize>,
    finished: bool,
    /// Remaining passes for each `/loop` and `/craft`, keyed by the command's index.
    loop_counters: HashMap<usize, u32>,
}

impl ActiveMacro {
    pub fn new(name: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            commands: commands.into(),
            step: 0,
            next_step: None,
            finished: false,
            loop_counters: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn current(&self) -> Option<&Command> {
        if self.finished {
            None
        } else {
            self.commands.get(self.step)
        }
    }

    /// Continue from `index` instead of the following command.
    pub fn jump_to(&mut self, index: usize) {
        self.next_step = Some(index);
    }

    /// End the macro after the current command.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Move the cursor past the command that just ran.
    pub fn advance(&mut self) {
        self.step = self.next_step.take().unwrap_or(self.step + 1);
    }

    pub fn is_finished(&self) -> bool {
        self.finished || self.step >= self.commands.len()
    }

    /// Counter for the loop anchored at `index`, initialised on first use.
    pub fn counter(&mut self, index: usize, initial: u32) -> &mut u32 {
        self.loop_counters.entry(index).or_insert(initial)
    }

    /// Forget the counter anchored at `index` so the next pass starts fresh.
    pub fn reset_counter(&mut self, index: usize) {
        self.loop_counters.remove(&index);
    }
}

/// Apply the craft-loop rewrite and any `run loop N` override, then parse.
///
/// # Errors
/// Returns the first line that fails to parse.
pub fn prepare_macro(
    def: &MacroDef,
    settings: &Settings,
    parser: &MacroParser,
    loop_override: Option<u32>,
) -> Result<ActiveMacro, MacroSyntaxError> {
    let mut text = def.contents.clone();
    if def.craft_loop {
        let template = CraftLoopTemplate::from_settings(settings);
        let out = rewrite(&text, settings.craft_loop_from_recipe_note, def.craft_loop_count, &template);
        for warning in &out.warnings {
            warn!("macro \"{}\": {warning}", def.name);
        }
        text = out.text;
    }
    if let Some(count) = loop_override {
        text = replace_last_loop(&text, count);
    }
    let commands = parser.parse_macro(&text)?;
    Ok(ActiveMacro::new(def.name.clone(), commands))
}

#[cfg(test)]
mod tests {
    use super::*;
    use needful_script::CommandKind;

    #[test]
    fn advance_honours_jumps_once() {
        let parser = MacroParser::default();
        let mut active = ActiveMacro::new("m", parser.parse_macro("/echo a\n/echo b\n/echo c").unwrap());
        active.advance();
        active.jump_to(0);
        active.advance();
        assert_eq!(active.step(), 0);
        active.advance();
        assert_eq!(active.step(), 1);
    }

    #[test]
    fn finish_ends_early() {
        let parser = MacroParser::default();
        let mut active = ActiveMacro::new("m", parser.parse_macro("/echo a\n/echo b").unwrap());
        active.finish();
        active.advance();
        assert!(active.is_finished());
        assert!(active.current().is_none());
    }

    #[test]
    fn counters_initialise_once_and_reset() {
        let mut active = ActiveMacro::new("m", Vec::new());
        *active.counter(3, 5) -= 1;
        assert_eq!(*active.counter(3, 5), 4);
        active.reset_counter(3);
        assert_eq!(*active.counter(3, 5), 5);
    }

    #[test]
    fn prepare_applies_craft_loop_then_override() {
        let def = MacroDef::new("synth", "/ac Groundwork").with_craft_loop(-1);
        let active = prepare_macro(&def, &Settings::default(), &MacroParser::default(), Some(4)).unwrap();
        let last = active.commands().last().unwrap();
        assert_eq!(last.kind(), &CommandKind::Loop { count: Some(4) });
        assert!(matches!(active.commands()[0].kind(), CommandKind::WaitAddon { .. }));
    }

    #[test]
    fn prepare_reports_syntax_errors() {
        let def = MacroDef::new("bad", "/echo ok\n/bogus");
        let err = prepare_macro(&def, &Settings::default(), &MacroParser::default(), None).unwrap_err();
        assert_eq!(err.line, 2);
    }
}
