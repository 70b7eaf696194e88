use std::time::Duration;

use log::{info, warn};

use needful_script::{Command, Condition};

use super::ExecScope;
use crate::error::CommandError;
use crate::timer::PollOutcome;

/// Interval between checks for an action's acknowledgement or completion.
pub const ACK_POLL: Duration = Duration::from_millis(50);

pub(super) async fn execute_action(
    cmd: &Command,
    name: &str,
    unsafe_action: bool,
    condition: Option<&Condition>,
    scope: &mut ExecScope<'_>,
) -> Result<(), CommandError> {
    if !scope.ctx.is_craft_action(name) {
        scope.ctx.use_action(name);
        return scope.perform_wait(cmd).await;
    }

    if scope.settings.craft_skip && !scope.ctx.is_crafting() {
        info!("not crafting, skipping {name}");
        return Ok(());
    }
    if let Some(condition) = condition {
        let current = scope.ctx.crafting_condition().unwrap_or_default();
        if !condition.matches(&current) {
            info!("condition is \"{current}\", skipping {name}");
            return Ok(());
        }
    }
    if scope.settings.quality_skip && scope.ctx.is_quality_action(name) && scope.ctx.hq_chance() >= 100 {
        info!("HQ chance is already 100%, skipping {name}");
        return Ok(());
    }

    let smart_wait = scope.settings.smart_wait;
    if unsafe_action && !smart_wait {
        scope.ctx.use_action(name);
        return scope.perform_wait(cmd).await;
    }

    let attempts = scope.settings.max_timeout_retries.min(10) + 1;
    let timeout = Duration::from_millis(cmd.max_wait_ms());
    for attempt in 1..=attempts {
        scope.ctx.use_action(name);
        let outcome = if smart_wait {
            scope.poll(ACK_POLL, timeout, |ctx| ctx.craft_action_complete()).await
        } else {
            scope.poll(ACK_POLL, timeout, |ctx| ctx.action_acknowledged()).await
        };
        match outcome {
            PollOutcome::Ready(()) if smart_wait => return Ok(()),
            PollOutcome::Ready(()) => return scope.perform_wait(cmd).await,
            PollOutcome::Cancelled => return Err(CommandError::Cancelled),
            PollOutcome::TimedOut => {
                warn!("no response for {name} (attempt {attempt} of {attempts})");
            },
        }
    }
    Err(CommandError::ActionTimeout {
        name: name.to_string(),
        attempts,
    })
}
