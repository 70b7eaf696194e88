//! Capability context: everything the engine asks of the host.
//!
//! The engine never talks to a game or terminal directly. Each command goes
//! through a [`MacroContext`], so the same engine can drive a live client, the
//! console dry-run host, or a recording fake in tests.

use needful_data::{LookupError, MacroDef};
use needful_script::VirtualKey;
use thiserror::Error;

/// Opaque handle for a selectable game object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u64);

/// One recipe that produces an item with the requested name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeEntry {
    pub id: u32,
    /// Crafting discipline, `0` (carpenter) through `7` (culinarian).
    pub craft_type: u32,
}

impl RecipeEntry {
    /// Class job id of the discipline that crafts this recipe.
    pub fn class_job(&self) -> u32 {
        self.craft_type + 8
    }
}

/// Current crafter attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CraftStats {
    pub craftsmanship: u32,
    pub control: u32,
    pub cp: u32,
}

/// A capability call the host could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Failed(String),
}

/// Host services used by command execution.
///
/// Query methods take `&self` so they can be polled while the engine holds its timer.
pub trait MacroContext {
    // chat and alerts
    fn print(&mut self, message: &str);
    fn print_error(&mut self, message: &str);
    /// Hand a text command to the game's own command handler.
    fn send_chat(&mut self, line: &str);
    fn beep(&mut self, frequency: u32, duration_ms: u32);

    // input
    fn send_keys(&mut self, key: VirtualKey, modifiers: &[VirtualKey]);
    fn hold_keys(&mut self, key: VirtualKey, modifiers: &[VirtualKey]);
    fn release_keys(&mut self, key: VirtualKey, modifiers: &[VirtualKey]);

    /// Dispatch a named click.
    ///
    /// # Errors
    /// [`ContextError::NotFound`] when no click is registered under `name`.
    fn click(&mut self, name: &str) -> Result<(), ContextError>;

    // windows
    fn is_addon_visible(&self, name: &str) -> bool;
    /// Visible and accepting input.
    fn is_addon_ready(&self, name: &str) -> bool;

    // targeting
    fn find_target(&self, name: &str, index: Option<u32>) -> Option<TargetId>;
    fn set_target(&mut self, target: TargetId);

    // recipes and items
    fn recipes_named(&self, lowercase_name: &str) -> Vec<RecipeEntry>;
    fn class_job(&self) -> Option<u32>;
    fn open_recipe(&mut self, recipe_id: u32);

    /// # Errors
    /// [`ContextError::NotFound`] when the item is not in the inventory.
    fn use_item(&mut self, name: &str, hq: bool) -> Result<(), ContextError>;

    // actions
    /// Issue an action. Resets the acknowledgement flag for this attempt.
    fn use_action(&mut self, name: &str);
    fn action_acknowledged(&self) -> bool;
    fn is_craft_action(&self, name: &str) -> bool;
    fn is_quality_action(&self, name: &str) -> bool;
    /// The last crafting action has finished animating and the next one may be used.
    fn craft_action_complete(&self) -> bool;

    // crafting state
    fn is_crafting(&self) -> bool;
    fn crafting_condition(&self) -> Option<String>;
    /// High quality chance in percent.
    fn hq_chance(&self) -> u32;
    fn quality(&self) -> u32;
    fn craft_stats(&self) -> CraftStats;

    // character state
    fn has_status(&self, name: &str) -> bool;
    fn needs_repair(&self) -> bool;
    /// An item is ready for materia extraction. With `within`, only when no other
    /// item's spiritbond is at or above that value.
    fn needs_extraction(&self, within: Option<f32>) -> bool;

    /// Resolve a saved macro by its unique name.
    ///
    /// # Errors
    /// [`LookupError`] when the name is missing or shared by several macros.
    fn find_macro(&self, name: &str) -> Result<MacroDef, LookupError>;
}
