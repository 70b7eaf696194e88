use std::time::Duration;

use log::info;

use needful_script::Command;

use super::{ExecScope, plural};
use crate::active_macro::{ActiveMacro, prepare_macro};
use crate::error::CommandError;

/// Fixed pause before every rewind, so a bare `/loop` cannot spin.
pub const LOOP_PAUSE: Duration = Duration::from_millis(10);

/// Rewind to the top of the macro while the loop has passes left.
///
/// An exhausted counter is reset and execution falls through, so a loop nested
/// inside an outer loop runs its full count again on every outer pass.
pub(super) async fn execute_loop(
    cmd: &Command,
    count: Option<u32>,
    active: &mut ActiveMacro,
    scope: &mut ExecScope<'_>,
) -> Result<(), CommandError> {
    let echo = cmd.echo() || scope.settings.loop_echo;
    let index = active.step();

    if let Some(count) = count {
        let initial = if scope.settings.loop_total {
            count.saturating_sub(1)
        } else {
            count
        };
        let remaining = *active.counter(index, initial);
        if echo {
            if remaining == 0 {
                scope.ctx.print("No loops remaining");
            } else {
                scope.ctx.print(&format!("{} remaining", plural(remaining, "loop")));
            }
        }
        if remaining == 0 {
            active.reset_counter(index);
            return Ok(());
        }
        *active.counter(index, initial) = remaining - 1;
    } else if echo {
        scope.ctx.print("Looping");
    }

    active.jump_to(0);
    scope.sleep(LOOP_PAUSE).await?;
    scope.perform_wait(cmd).await
}

/// Let the macro pass `count` times, then end it.
pub(super) async fn execute_craft(
    cmd: &Command,
    count: u32,
    active: &mut ActiveMacro,
    scope: &mut ExecScope<'_>,
) -> Result<(), CommandError> {
    let echo = cmd.echo() || scope.settings.loop_echo;
    let index = active.step();
    let remaining = *active.counter(index, count);
    if echo {
        if remaining == 0 {
            scope.ctx.print("No crafts remaining");
        } else {
            scope.ctx.print(&format!("{} remaining", plural(remaining, "craft")));
        }
    }
    if remaining == 0 {
        info!("craft gate closed for \"{}\"", active.name());
        active.reset_counter(index);
        active.finish();
        return Ok(());
    }
    *active.counter(index, count) = remaining - 1;
    scope.perform_wait(cmd).await
}

pub(super) async fn run_macro(cmd: &Command, name: &str, scope: &mut ExecScope<'_>) -> Result<(), CommandError> {
    let def = scope.ctx.find_macro(name)?;
    let nested = prepare_macro(&def, scope.settings, scope.parser, None)?;
    info!("starting nested macro \"{}\" ({} commands)", def.name, nested.len());
    scope.nested = Some(nested);
    scope.perform_wait(cmd).await
}
