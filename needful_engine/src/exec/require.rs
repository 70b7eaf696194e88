use std::time::Duration;

use needful_script::Command;

use super::ExecScope;
use crate::context::MacroContext;
use crate::error::CommandError;
use crate::timer::PollOutcome;

pub const REQUIRE_POLL: Duration = Duration::from_millis(250);
pub const ADDON_POLL: Duration = Duration::from_millis(100);

pub(super) async fn require(
    cmd: &Command,
    what: &str,
    probe: impl Fn(&dyn MacroContext) -> bool,
    scope: &mut ExecScope<'_>,
) -> Result<(), CommandError> {
    let timeout = Duration::from_millis(cmd.max_wait_ms());
    match scope.poll(REQUIRE_POLL, timeout, probe).await {
        PollOutcome::Ready(()) => scope.perform_wait(cmd).await,
        PollOutcome::Cancelled => Err(CommandError::Cancelled),
        PollOutcome::TimedOut => Err(CommandError::RequirementTimeout {
            what: what.to_string(),
            waited_ms: cmd.max_wait_ms(),
        }),
    }
}

pub(super) async fn wait_addon(cmd: &Command, name: &str, scope: &mut ExecScope<'_>) -> Result<(), CommandError> {
    let timeout = Duration::from_millis(cmd.max_wait_ms());
    match scope.poll(ADDON_POLL, timeout, |ctx| ctx.is_addon_ready(name)).await {
        PollOutcome::Ready(()) => scope.perform_wait(cmd).await,
        PollOutcome::Cancelled => Err(CommandError::Cancelled),
        PollOutcome::TimedOut => Err(CommandError::AddonTimeout {
            name: name.to_string(),
            waited_ms: cmd.max_wait_ms(),
        }),
    }
}
