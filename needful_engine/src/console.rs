//! Dry-run host: a [`MacroContext`] that prints every effect to the terminal.
//!
//! Queries answer as if the game were in the most permissive state, so every
//! `/require...` and `/waitaddon` succeeds on the first probe and macros can be
//! rehearsed end to end without a client attached.

use colored::Colorize;

use needful_data::{LookupError, MacroDef, MacroLibrary};
use needful_script::VirtualKey;

use crate::context::{ContextError, CraftStats, MacroContext, RecipeEntry, TargetId};
use crate::style::ConsoleStyle;

#[derive(Debug, Clone, Default)]
pub struct ConsoleContext {
    library: MacroLibrary,
    next_target: u64,
}

impl ConsoleContext {
    pub fn new(library: MacroLibrary) -> Self {
        Self { library, next_target: 1 }
    }

    fn effect(&self, text: &str) {
        println!("{} {}", "~".dimmed(), text.effect_style());
    }
}

fn combo_text(key: VirtualKey, modifiers: &[VirtualKey]) -> String {
    let mut parts: Vec<String> = modifiers.iter().map(ToString::to_string).collect();
    parts.push(key.to_string());
    parts.join("+")
}

/// Stable pseudo recipe id for a name, so repeated runs show the same value.
fn recipe_id(name: &str) -> u32 {
    name.bytes()
        .fold(17u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)))
}

impl MacroContext for ConsoleContext {
    fn print(&mut self, message: &str) {
        println!("{}", message.chat_style());
    }

    fn print_error(&mut self, message: &str) {
        eprintln!("{}", message.error_style());
    }

    fn send_chat(&mut self, line: &str) {
        self.effect(&format!("chat: {line}"));
    }

    fn beep(&mut self, frequency: u32, duration_ms: u32) {
        self.effect(&format!("beep ({frequency} Hz, {duration_ms} ms)"));
    }

    fn send_keys(&mut self, key: VirtualKey, modifiers: &[VirtualKey]) {
        self.effect(&format!("press {}", combo_text(key, modifiers)));
    }

    fn hold_keys(&mut self, key: VirtualKey, modifiers: &[VirtualKey]) {
        self.effect(&format!("hold {}", combo_text(key, modifiers)));
    }

    fn release_keys(&mut self, key: VirtualKey, modifiers: &[VirtualKey]) {
        self.effect(&format!("release {}", combo_text(key, modifiers)));
    }

    fn click(&mut self, name: &str) -> Result<(), ContextError> {
        self.effect(&format!("click {name}"));
        Ok(())
    }

    fn is_addon_visible(&self, _name: &str) -> bool {
        false
    }

    fn is_addon_ready(&self, _name: &str) -> bool {
        true
    }

    fn find_target(&self, _name: &str, _index: Option<u32>) -> Option<TargetId> {
        Some(TargetId(self.next_target))
    }

    fn set_target(&mut self, target: TargetId) {
        self.effect(&format!("target #{}", target.0));
        self.next_target += 1;
    }

    fn recipes_named(&self, lowercase_name: &str) -> Vec<RecipeEntry> {
        vec![RecipeEntry {
            id: recipe_id(lowercase_name),
            craft_type: 0,
        }]
    }

    fn class_job(&self) -> Option<u32> {
        Some(8)
    }

    fn open_recipe(&mut self, recipe_id: u32) {
        self.effect(&format!("open recipe {recipe_id}"));
    }

    fn use_item(&mut self, name: &str, hq: bool) -> Result<(), ContextError> {
        let quality = if hq { " (HQ)" } else { "" };
        self.effect(&format!("use item {name}{quality}"));
        Ok(())
    }

    fn use_action(&mut self, name: &str) {
        self.effect(&format!("action {name}"));
    }

    fn action_acknowledged(&self) -> bool {
        true
    }

    fn is_craft_action(&self, _name: &str) -> bool {
        false
    }

    fn is_quality_action(&self, _name: &str) -> bool {
        false
    }

    fn craft_action_complete(&self) -> bool {
        true
    }

    fn is_crafting(&self) -> bool {
        true
    }

    fn crafting_condition(&self) -> Option<String> {
        Some("normal".to_string())
    }

    fn hq_chance(&self) -> u32 {
        0
    }

    fn quality(&self) -> u32 {
        u32::MAX
    }

    fn craft_stats(&self) -> CraftStats {
        CraftStats {
            craftsmanship: u32::MAX,
            control: u32::MAX,
            cp: u32::MAX,
        }
    }

    fn has_status(&self, _name: &str) -> bool {
        true
    }

    fn needs_repair(&self) -> bool {
        false
    }

    fn needs_extraction(&self, _within: Option<f32>) -> bool {
        false
    }

    fn find_macro(&self, name: &str) -> Result<MacroDef, LookupError> {
        self.library.find_unique(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_text_lists_modifiers_first() {
        let text = combo_text(VirtualKey::from_name("A").unwrap(), &[VirtualKey::CONTROL, VirtualKey::SHIFT]);
        assert_eq!(text, "CONTROL+SHIFT+A");
    }

    #[test]
    fn recipe_ids_are_stable() {
        assert_eq!(recipe_id("bronze ingot"), recipe_id("bronze ingot"));
        assert_ne!(recipe_id("bronze ingot"), recipe_id("iron ingot"));
    }

    #[test]
    fn nested_macros_resolve_from_the_library() {
        let library = MacroLibrary {
            macros: vec![MacroDef::new("inner", "/echo hi")],
            ..MacroLibrary::default()
        };
        let ctx = ConsoleContext::new(library);
        assert_eq!(ctx.find_macro("inner").unwrap().contents, "/echo hi");
        assert!(ctx.find_macro("outer").is_err());
    }
}
