//! The macro engine: a queue of active macros driven one command at a time.
//!
//! All state shared with the control surface lives behind a single mutex that
//! is never held across an await. The execution path clones the front macro's
//! cursor, runs one command against that copy, then writes it back only if the
//! same macro is still at the front. A stop or error that clears the queue in
//! the meantime therefore wins over the command that was in flight.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info};
use tokio::sync::Notify;
use uuid::Uuid;
use variantly::Variantly;

use needful_data::{MacroDef, MacroLibrary, Settings};
use needful_script::{Command, MacroParser, ParseOptions};

use crate::active_macro::{ActiveMacro, prepare_macro};
use crate::context::MacroContext;
use crate::error::EngineError;
use crate::exec::{ExecScope, Execute};
use crate::timer::{StopSignal, StopToken, SuspendHook, Timer};

/// Run state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Variantly)]
pub enum LoopState {
    /// No authenticated session. Execution holds; the queue is kept.
    NotLoggedIn,
    Stopped,
    /// The in-flight command is suspended in a wait or poll.
    Waiting,
    Paused,
    Running,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoopState::NotLoggedIn => "Not Logged In",
            LoopState::Stopped => "Stopped",
            LoopState::Waiting => "Waiting",
            LoopState::Paused => "Paused",
            LoopState::Running => "Running",
        };
        f.write_str(label)
    }
}

/// Snapshot of one queued macro for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMacro {
    pub id: Uuid,
    pub name: String,
    pub step: usize,
    pub len: usize,
}

#[derive(Debug)]
struct Shared {
    queue: VecDeque<ActiveMacro>,
    state: LoopState,
    logged_in: bool,
    pause_at_loop: bool,
    stop_at_loop: bool,
    step_pending: bool,
    shutdown: bool,
}

impl Shared {
    fn halt(&mut self) {
        self.queue.clear();
        self.state = LoopState::Stopped;
        self.pause_at_loop = false;
        self.stop_at_loop = false;
        self.step_pending = false;
    }
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            state: LoopState::Stopped,
            logged_in: true,
            pause_at_loop: false,
            stop_at_loop: false,
            step_pending: false,
            shutdown: false,
        }
    }
}

enum Job {
    Run { active: ActiveMacro, token: StopToken },
    Idle,
    Shutdown,
}

/// Handle to the engine. Clones share the same queue and state.
#[derive(Clone)]
pub struct MacroEngine {
    shared: Arc<Mutex<Shared>>,
    wake: Arc<Notify>,
    stop: StopSignal,
    settings: Arc<Settings>,
    parser: Arc<MacroParser>,
}

impl fmt::Debug for MacroEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroEngine").field("state", &self.state()).finish_non_exhaustive()
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MacroEngine {
    pub fn new(settings: Settings) -> Self {
        let parser = MacroParser::new(ParseOptions::from_settings(&settings));
        Self {
            shared: Arc::new(Mutex::new(Shared::default())),
            wake: Arc::new(Notify::new()),
            stop: StopSignal::new(),
            settings: Arc::new(settings),
            parser: Arc::new(parser),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn parser(&self) -> &MacroParser {
        &self.parser
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        lock(&self.shared)
    }

    /// Queue a macro behind any already queued.
    ///
    /// # Errors
    /// [`EngineError::Syntax`] if any line fails to parse; nothing is queued.
    pub fn enqueue(&self, def: &MacroDef) -> Result<Uuid, EngineError> {
        self.enqueue_looped(def, None)
    }

    /// Queue a macro with its last `/loop` replaced by `/loop {loops}` (appended if absent).
    ///
    /// # Errors
    /// [`EngineError::Syntax`] if any line fails to parse; nothing is queued.
    pub fn enqueue_looped(&self, def: &MacroDef, loops: Option<u32>) -> Result<Uuid, EngineError> {
        let active = prepare_macro(def, &self.settings, &self.parser, loops).map_err(|source| EngineError::Syntax {
            name: def.name.clone(),
            source,
        })?;
        let id = active.id();
        {
            let mut shared = self.lock();
            if shared.shutdown {
                return Err(EngineError::ShutDown);
            }
            info!("queued macro \"{}\" ({} commands)", active.name(), active.len());
            shared.queue.push_back(active);
            if shared.state == LoopState::Stopped {
                shared.state = LoopState::Running;
                shared.pause_at_loop = false;
                shared.stop_at_loop = false;
            }
        }
        self.wake.notify_one();
        Ok(id)
    }

    /// Resolve `name` in `library` and queue it.
    ///
    /// # Errors
    /// [`EngineError::Lookup`] for a missing or ambiguous name, or any error from [`MacroEngine::enqueue_looped`].
    pub fn enqueue_by_name(&self, library: &MacroLibrary, name: &str, loops: Option<u32>) -> Result<Uuid, EngineError> {
        let def = library.find_unique(name)?;
        self.enqueue_looped(def, loops)
    }

    /// Pause now, or at the next `/loop` or `/craft` when `at_loop` is set.
    pub fn pause(&self, at_loop: bool) {
        let mut shared = self.lock();
        if at_loop {
            info!("pausing at the next loop");
            shared.pause_at_loop = true;
        } else if matches!(shared.state, LoopState::Running | LoopState::Waiting) {
            info!("pausing");
            shared.state = LoopState::Paused;
            shared.step_pending = false;
        }
    }

    pub fn resume(&self) {
        {
            let mut shared = self.lock();
            if shared.state != LoopState::Paused {
                return;
            }
            info!("resuming");
            shared.state = LoopState::Running;
            shared.pause_at_loop = false;
            shared.step_pending = false;
        }
        self.wake.notify_one();
    }

    /// While paused, run exactly one more command.
    pub fn next_step(&self) {
        {
            let mut shared = self.lock();
            if shared.state != LoopState::Paused {
                return;
            }
            debug!("stepping one command");
            shared.step_pending = true;
        }
        self.wake.notify_one();
    }

    /// Stop now, cancelling the in-flight wait and clearing the queue, or at the next
    /// `/loop` or `/craft` when `at_loop` is set.
    pub fn stop(&self, at_loop: bool) {
        {
            let mut shared = self.lock();
            if at_loop {
                info!("stopping at the next loop");
                shared.stop_at_loop = true;
                return;
            }
            info!("stopping, {} macro(s) discarded", shared.queue.len());
            shared.halt();
            self.stop.trigger();
        }
        self.wake.notify_one();
    }

    /// Record whether a game session is active. Execution holds while logged out.
    pub fn set_logged_in(&self, logged_in: bool) {
        {
            let mut shared = self.lock();
            if shared.logged_in == logged_in {
                return;
            }
            info!("session {}", if logged_in { "started" } else { "ended" });
            shared.logged_in = logged_in;
        }
        self.wake.notify_one();
    }

    /// Stop everything and make [`MacroEngine::serve`] return.
    pub fn shutdown(&self) {
        {
            let mut shared = self.lock();
            shared.halt();
            shared.shutdown = true;
            self.stop.trigger();
        }
        self.wake.notify_one();
    }

    pub fn state(&self) -> LoopState {
        let shared = self.lock();
        if shared.logged_in {
            shared.state
        } else {
            LoopState::NotLoggedIn
        }
    }

    /// State label including any pending loop latch.
    pub fn status(&self) -> String {
        let shared = self.lock();
        if !shared.logged_in {
            LoopState::NotLoggedIn.to_string()
        } else if shared.stop_at_loop {
            "Stopping Soon".to_string()
        } else if shared.pause_at_loop {
            "Pausing Soon".to_string()
        } else {
            shared.state.to_string()
        }
    }

    pub fn queued(&self) -> Vec<QueuedMacro> {
        self.lock()
            .queue
            .iter()
            .map(|m| QueuedMacro {
                id: m.id(),
                name: m.name().to_string(),
                step: m.step(),
                len: m.len(),
            })
            .collect()
    }

    /// Execute queued commands until shutdown, sleeping whenever there is nothing to do.
    pub async fn serve(&self, ctx: &mut dyn MacroContext) {
        info!("engine started");
        loop {
            match self.next_job() {
                Job::Run { active, token } => self.run_job(ctx, active, token).await,
                Job::Idle => self.wake.notified().await,
                Job::Shutdown => break,
            }
        }
        info!("engine shut down");
    }

    /// Execute queued commands until the engine has nothing runnable.
    pub async fn run_until_idle(&self, ctx: &mut dyn MacroContext) {
        while let Job::Run { active, token } = self.next_job() {
            self.run_job(ctx, active, token).await;
        }
    }

    /// Pick the next command to run, applying loop latches and pause state.
    fn next_job(&self) -> Job {
        let mut shared = self.lock();
        if shared.shutdown {
            return Job::Shutdown;
        }
        if !shared.logged_in {
            return Job::Idle;
        }
        while shared.queue.front().is_some_and(ActiveMacro::is_finished) {
            if let Some(done) = shared.queue.pop_front() {
                info!("macro \"{}\" finished", done.name());
            }
        }

        let at_boundary = match shared.queue.front() {
            Some(front) => front.current().is_some_and(Command::is_loop_boundary),
            None => {
                if !shared.state.is_stopped() {
                    info!("queue empty, engine stopped");
                    shared.halt();
                }
                return Job::Idle;
            },
        };
        if shared.state.is_stopped() {
            return Job::Idle;
        }

        if at_boundary && shared.stop_at_loop {
            info!("stopped at loop");
            shared.halt();
            return Job::Idle;
        }
        if at_boundary && shared.pause_at_loop {
            shared.pause_at_loop = false;
            if matches!(shared.state, LoopState::Running | LoopState::Waiting) {
                info!("paused at loop");
                shared.state = LoopState::Paused;
            }
        }
        if shared.state.is_paused() {
            if !shared.step_pending {
                return Job::Idle;
            }
            shared.step_pending = false;
        }

        match shared.queue.front().cloned() {
            Some(active) => Job::Run {
                active,
                token: self.stop.token(),
            },
            None => Job::Idle,
        }
    }

    async fn run_job(&self, ctx: &mut dyn MacroContext, mut active: ActiveMacro, token: StopToken) {
        let Some(command) = active.current().cloned() else {
            return;
        };

        let hook_shared = Arc::clone(&self.shared);
        let hook: SuspendHook = Arc::new(move |suspended| {
            let mut shared = lock(&hook_shared);
            match (suspended, shared.state) {
                (true, LoopState::Running) => shared.state = LoopState::Waiting,
                (false, LoopState::Waiting) => shared.state = LoopState::Running,
                _ => {},
            }
        });
        let timer = Timer::new(token).with_suspend_hook(hook);

        let (result, nested) = {
            let mut scope = ExecScope::new(ctx, timer, &self.settings, &self.parser);
            let result = command.execute(&mut active, &mut scope).await;
            (result, scope.nested.take())
        };

        match result {
            Ok(()) => {
                active.advance();
                let mut shared = self.lock();
                if shared.queue.front().is_some_and(|front| front.id() == active.id()) {
                    if let Some(front) = shared.queue.front_mut() {
                        *front = active;
                    }
                    if let Some(nested) = nested {
                        shared.queue.push_front(nested);
                    }
                } else {
                    debug!("macro \"{}\" left the queue while running", active.name());
                }
            },
            Err(err) if err.is_cancelled() => {
                debug!("cancelled: {}", command.text());
            },
            Err(err) => {
                self.lock().halt();
                error!("macro \"{}\" failed at \"{}\": {err}", active.name(), command.text());
                ctx.print_error(&format!("{}: {err}", active.name()));
                if self.settings.noisy_errors {
                    for _ in 0..self.settings.beep_count {
                        ctx.beep(self.settings.beep_frequency, self.settings.beep_duration);
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MacroEngine {
        MacroEngine::new(Settings::default())
    }

    #[test]
    fn enqueue_starts_a_stopped_engine() {
        let engine = engine();
        assert_eq!(engine.state(), LoopState::Stopped);
        engine.enqueue(&MacroDef::new("m", "/echo hi")).unwrap();
        assert_eq!(engine.state(), LoopState::Running);
        assert_eq!(engine.queued().len(), 1);
    }

    #[test]
    fn syntax_error_queues_nothing() {
        let engine = engine();
        let err = engine.enqueue(&MacroDef::new("bad", "/echo ok\n/bogus foo")).unwrap_err();
        assert!(matches!(err, EngineError::Syntax { ref name, .. } if name == "bad"));
        assert!(engine.queued().is_empty());
        assert_eq!(engine.state(), LoopState::Stopped);
    }

    #[test]
    fn loop_latches_show_in_status() {
        let engine = engine();
        engine.enqueue(&MacroDef::new("m", "/echo hi")).unwrap();
        engine.pause(true);
        assert_eq!(engine.status(), "Pausing Soon");
        engine.stop(true);
        assert_eq!(engine.status(), "Stopping Soon");
        assert_eq!(engine.state(), LoopState::Running);
    }

    #[test]
    fn immediate_pause_and_resume() {
        let engine = engine();
        engine.pause(false);
        assert_eq!(engine.state(), LoopState::Stopped);
        engine.enqueue(&MacroDef::new("m", "/echo hi")).unwrap();
        engine.pause(false);
        assert_eq!(engine.state(), LoopState::Paused);
        engine.resume();
        assert_eq!(engine.state(), LoopState::Running);
    }

    #[test]
    fn immediate_stop_empties_the_queue() {
        let engine = engine();
        engine.enqueue(&MacroDef::new("a", "/echo a")).unwrap();
        engine.enqueue(&MacroDef::new("b", "/echo b")).unwrap();
        engine.stop(false);
        assert!(engine.queued().is_empty());
        assert_eq!(engine.state(), LoopState::Stopped);
    }

    #[test]
    fn logged_out_overrides_the_displayed_state() {
        let engine = engine();
        engine.enqueue(&MacroDef::new("m", "/echo hi")).unwrap();
        engine.set_logged_in(false);
        assert_eq!(engine.state(), LoopState::NotLoggedIn);
        assert_eq!(engine.status(), "Not Logged In");
        assert_eq!(engine.queued().len(), 1);
        engine.set_logged_in(true);
        assert_eq!(engine.state(), LoopState::Running);
    }

    #[test]
    fn lookup_errors_surface_from_enqueue_by_name() {
        let engine = engine();
        let library = MacroLibrary::default();
        let err = engine.enqueue_by_name(&library, "missing", None).unwrap_err();
        assert!(matches!(err, EngineError::Lookup(_)));
    }

    #[test]
    fn shutdown_rejects_new_work() {
        let engine = engine();
        engine.shutdown();
        assert!(matches!(
            engine.enqueue(&MacroDef::new("m", "/echo hi")),
            Err(EngineError::ShutDown)
        ));
    }
}
