//! Command execution.
//!
//! [`Execute`] is implemented once for the closed [`Command`] type. Each kind
//! performs its effect through the [`MacroContext`] and finishes with the wait
//! resolved from its `<wait>` modifier. Loop-control kinds move the cursor of
//! the [`ActiveMacro`] they run in; `/runmacro` leaves the new macro in
//! [`ExecScope::nested`] for the engine to push onto the queue.

mod action;
mod flow;
mod require;
mod ui;

use std::time::Duration;

use log::debug;

use needful_data::Settings;
use needful_script::{Command, CommandKind, MacroParser};

use crate::active_macro::ActiveMacro;
use crate::context::MacroContext;
use crate::error::CommandError;
use crate::timer::{PollOutcome, SleepOutcome, Timer};

pub use action::ACK_POLL;
pub use flow::LOOP_PAUSE;
pub use require::{ADDON_POLL, REQUIRE_POLL};

/// Everything a command may touch while it runs.
pub struct ExecScope<'a> {
    pub ctx: &'a mut dyn MacroContext,
    pub timer: Timer,
    pub settings: &'a Settings,
    pub parser: &'a MacroParser,
    /// A macro started by `/runmacro`, to be pushed in front of its caller.
    pub nested: Option<ActiveMacro>,
}

impl<'a> ExecScope<'a> {
    pub fn new(ctx: &'a mut dyn MacroContext, timer: Timer, settings: &'a Settings, parser: &'a MacroParser) -> Self {
        Self {
            ctx,
            timer,
            settings,
            parser,
            nested: None,
        }
    }

    /// Sleep for the command's resolved `<wait>`, drawing a fresh value for ranges.
    ///
    /// # Errors
    /// [`CommandError::Cancelled`] when an immediate stop interrupts the wait.
    pub async fn perform_wait(&mut self, command: &Command) -> Result<(), CommandError> {
        let wait = command.wait();
        if wait.is_zero() {
            return Ok(());
        }
        let delay = {
            let mut rng = rand::rng();
            wait.sample(&mut rng)
        };
        if wait.is_range() {
            debug!("sleeping for {} ms ({} to {})", delay.as_millis(), wait.from_ms, wait.to_ms);
        } else {
            debug!("sleeping for {} ms", delay.as_millis());
        }
        self.sleep(delay).await
    }

    /// # Errors
    /// [`CommandError::Cancelled`] when an immediate stop interrupts the sleep.
    pub async fn sleep(&mut self, duration: Duration) -> Result<(), CommandError> {
        match self.timer.sleep(duration).await {
            SleepOutcome::Elapsed => Ok(()),
            SleepOutcome::Cancelled => Err(CommandError::Cancelled),
        }
    }

    /// Poll a context query until it holds or `timeout` is exceeded.
    pub async fn poll(
        &mut self,
        interval: Duration,
        timeout: Duration,
        probe: impl Fn(&dyn MacroContext) -> bool,
    ) -> PollOutcome<()> {
        let ctx: &dyn MacroContext = &*self.ctx;
        self.timer.poll(interval, timeout, || probe(ctx)).await
    }
}

/// Run one command to completion, including its trailing wait.
#[allow(async_fn_in_trait)]
pub trait Execute {
    /// # Errors
    /// Returns a [`CommandError`] when the command fails or is cancelled.
    async fn execute(&self, active: &mut ActiveMacro, scope: &mut ExecScope<'_>) -> Result<(), CommandError>;
}

impl Execute for Command {
    async fn execute(&self, active: &mut ActiveMacro, scope: &mut ExecScope<'_>) -> Result<(), CommandError> {
        debug!("executing: {}", self.text());
        match self.kind() {
            CommandKind::Action {
                name,
                unsafe_action,
                condition,
            } => action::execute_action(self, name, *unsafe_action, condition.as_ref(), scope).await,
            CommandKind::Click { name } => ui::click(self, name, scope).await,
            CommandKind::Send(combo) => ui::keys(self, ui::KeyMotion::Press, combo, scope).await,
            CommandKind::Hold(combo) => ui::keys(self, ui::KeyMotion::Hold, combo, scope).await,
            CommandKind::Release(combo) => ui::keys(self, ui::KeyMotion::Release, combo, scope).await,
            CommandKind::Target { name } => ui::target(self, name, scope).await,
            CommandKind::Recipe { name } => ui::recipe(self, name, scope).await,
            CommandKind::Item { name, hq } => ui::item(self, name, *hq, scope).await,
            CommandKind::Require { status } => {
                require::require(self, &format!("status \"{status}\""), |ctx| ctx.has_status(status), scope).await
            },
            CommandKind::RequireQuality { quality } => {
                let quality = *quality;
                require::require(self, &format!("quality {quality}"), |ctx| ctx.quality() >= quality, scope).await
            },
            CommandKind::RequireRepair => require::require(self, "repair", |ctx| !ctx.needs_repair(), scope).await,
            CommandKind::RequireSpiritbond { within } => {
                let within = *within;
                require::require(self, "spiritbond", |ctx| !ctx.needs_extraction(within), scope).await
            },
            CommandKind::RequireStats {
                craftsmanship,
                control,
                cp,
            } => {
                let (craftsmanship, control, cp) = (*craftsmanship, *control, *cp);
                require::require(
                    self,
                    &format!("stats {craftsmanship}/{control}/{cp}"),
                    |ctx| {
                        let stats = ctx.craft_stats();
                        stats.craftsmanship >= craftsmanship && stats.control >= control && stats.cp >= cp
                    },
                    scope,
                )
                .await
            },
            CommandKind::Loop { count } => flow::execute_loop(self, *count, active, scope).await,
            CommandKind::Craft { count } => flow::execute_craft(self, *count, active, scope).await,
            CommandKind::Wait => scope.perform_wait(self).await,
            CommandKind::RunMacro { name } => flow::run_macro(self, name, scope).await,
            CommandKind::WaitAddon { name } => require::wait_addon(self, name, scope).await,
            CommandKind::Native { line } => {
                scope.ctx.send_chat(line);
                scope.perform_wait(self).await
            },
        }
    }
}

fn plural(count: u32, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
