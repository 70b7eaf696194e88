use log::{debug, warn};

use needful_script::{Command, KeyCombo};

use super::ExecScope;
use crate::context::ContextError;
use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum KeyMotion {
    Press,
    Hold,
    Release,
}

pub(super) async fn click(cmd: &Command, name: &str, scope: &mut ExecScope<'_>) -> Result<(), CommandError> {
    match scope.ctx.click(&name.to_lowercase()) {
        Ok(()) => {},
        Err(ContextError::NotFound(_)) => return Err(CommandError::ClickNotFound(name.to_string())),
        Err(other) => return Err(other.into()),
    }
    scope.perform_wait(cmd).await
}

pub(super) async fn keys(
    cmd: &Command,
    motion: KeyMotion,
    combo: &KeyCombo,
    scope: &mut ExecScope<'_>,
) -> Result<(), CommandError> {
    let (key, modifiers) = (combo.primary(), combo.modifiers());
    match motion {
        KeyMotion::Press => scope.ctx.send_keys(key, modifiers),
        KeyMotion::Hold => scope.ctx.hold_keys(key, modifiers),
        KeyMotion::Release => scope.ctx.release_keys(key, modifiers),
    }
    scope.perform_wait(cmd).await
}

pub(super) async fn target(cmd: &Command, name: &str, scope: &mut ExecScope<'_>) -> Result<(), CommandError> {
    if !scope.settings.use_engine_targeting {
        scope.ctx.send_chat(&format!("/target {name}"));
        return scope.perform_wait(cmd).await;
    }
    match scope.ctx.find_target(name, cmd.index()) {
        Some(found) => scope.ctx.set_target(found),
        None if scope.settings.stop_macro_if_target_not_found => {
            return Err(CommandError::TargetNotFound(name.to_string()));
        },
        None => {
            warn!("target \"{name}\" not found, continuing");
            scope.ctx.print_error(&format!("Could not find target: {name}"));
        },
    }
    scope.perform_wait(cmd).await
}

pub(super) async fn recipe(cmd: &Command, name: &str, scope: &mut ExecScope<'_>) -> Result<(), CommandError> {
    if scope.ctx.is_addon_visible("Synthesis") {
        return Err(CommandError::SynthesisOpen);
    }
    let recipes = scope.ctx.recipes_named(name);
    let chosen = match recipes.as_slice() {
        [] => return Err(CommandError::RecipeNotFound(name.to_string())),
        [only] => *only,
        [first, ..] => {
            let job = scope.ctx.class_job();
            recipes
                .iter()
                .find(|r| Some(r.class_job()) == job)
                .copied()
                .unwrap_or(*first)
        },
    };
    debug!("recipe found: {}", chosen.id);
    scope.ctx.open_recipe(chosen.id);
    scope.perform_wait(cmd).await
}

pub(super) async fn item(cmd: &Command, name: &str, hq: bool, scope: &mut ExecScope<'_>) -> Result<(), CommandError> {
    match scope.ctx.use_item(name, hq) {
        Ok(()) => {},
        Err(ContextError::NotFound(_)) => return Err(CommandError::ItemNotFound(name.to_string())),
        Err(other) => return Err(other.into()),
    }
    scope.perform_wait(cmd).await
}
