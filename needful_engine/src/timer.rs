//! Cancellable suspension.
//!
//! Every wait a command performs goes through a [`Timer`]: a `tokio` sleep
//! raced against the engine's stop signal. A stop issued while a command is
//! suspended resolves the suspension as [`SleepOutcome::Cancelled`] and the
//! command unwinds without running its remaining steps.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// Broadcasts immediate-stop requests to the running command.
///
/// Each trigger bumps an epoch; a [`StopToken`] taken before the bump sees it as a change.
#[derive(Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<u64>>,
}

pub type StopToken = watch::Receiver<u64>;

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        self.tx.send_modify(|epoch| *epoch = epoch.wrapping_add(1));
    }

    /// A token that observes only triggers issued after this call.
    pub fn token(&self) -> StopToken {
        self.tx.subscribe()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    Elapsed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready(T),
    TimedOut,
    Cancelled,
}

/// Called with `true` when a command starts waiting and `false` when it resumes.
pub type SuspendHook = Arc<dyn Fn(bool) + Send + Sync>;

pub struct Timer {
    stop: StopToken,
    cancelled: bool,
    on_suspend: Option<SuspendHook>,
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("stopped", &self.is_stopped())
            .field("has_hook", &self.on_suspend.is_some())
            .finish()
    }
}

impl Timer {
    pub fn new(stop: StopToken) -> Self {
        Self {
            stop,
            cancelled: false,
            on_suspend: None,
        }
    }

    #[must_use]
    pub fn with_suspend_hook(mut self, hook: SuspendHook) -> Self {
        self.on_suspend = Some(hook);
        self
    }

    /// True once a stop has been issued after this timer's token was taken.
    pub fn is_stopped(&self) -> bool {
        // changed() marks the epoch as seen, so a stop it observed is remembered separately
        self.cancelled || self.stop.has_changed().unwrap_or(true)
    }

    pub async fn sleep(&mut self, duration: Duration) -> SleepOutcome {
        if self.is_stopped() {
            return SleepOutcome::Cancelled;
        }
        self.suspend(true);
        let outcome = tokio::select! {
            () = tokio::time::sleep(duration) => SleepOutcome::Elapsed,
            _ = self.stop.changed() => SleepOutcome::Cancelled,
        };
        if outcome == SleepOutcome::Cancelled {
            self.cancelled = true;
        }
        self.suspend(false);
        outcome
    }

    /// Evaluate `probe` every `interval` until it returns `true` or more than `timeout` has been spent waiting.
    pub async fn poll(&mut self, interval: Duration, timeout: Duration, mut probe: impl FnMut() -> bool) -> PollOutcome<()> {
        self.poll_value(interval, timeout, || probe().then_some(())).await
    }

    /// Like [`Timer::poll`], returning the value the probe produced.
    pub async fn poll_value<T>(
        &mut self,
        interval: Duration,
        timeout: Duration,
        mut probe: impl FnMut() -> Option<T>,
    ) -> PollOutcome<T> {
        let mut waited = Duration::ZERO;
        loop {
            if self.is_stopped() {
                return PollOutcome::Cancelled;
            }
            if let Some(value) = probe() {
                return PollOutcome::Ready(value);
            }
            waited += interval;
            if waited > timeout {
                return PollOutcome::TimedOut;
            }
            if self.sleep(interval).await == SleepOutcome::Cancelled {
                return PollOutcome::Cancelled;
            }
        }
    }

    fn suspend(&self, suspended: bool) {
        if let Some(hook) = &self.on_suspend {
            hook(suspended);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn sleep_elapses_in_virtual_time() {
        let signal = StopSignal::new();
        let mut timer = Timer::new(signal.token());
        let start = Instant::now();
        assert_eq!(timer.sleep(Duration::from_secs(3)).await, SleepOutcome::Elapsed);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_cancels_a_pending_sleep() {
        let signal = StopSignal::new();
        let mut timer = Timer::new(signal.token());
        let start = Instant::now();
        let stopper = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            signal.trigger();
        };
        let (outcome, ()) = tokio::join!(timer.sleep(Duration::from_secs(60)), stopper);
        assert_eq!(outcome, SleepOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(timer.is_stopped());
        assert_eq!(timer.sleep(Duration::from_millis(1)).await, SleepOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_triggers_do_not_affect_new_tokens() {
        let signal = StopSignal::new();
        signal.trigger();
        let timer = Timer::new(signal.token());
        assert!(!timer.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn poll_times_out_after_exceeding_the_limit() {
        let signal = StopSignal::new();
        let mut timer = Timer::new(signal.token());
        let mut probes = 0;
        let start = Instant::now();
        let outcome = timer
            .poll(Duration::from_millis(250), Duration::from_millis(1000), || {
                probes += 1;
                false
            })
            .await;
        assert_eq!(outcome, PollOutcome::TimedOut);
        // probes at 0, 250, 500, 750 and 1000 ms
        assert_eq!(probes, 5);
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_value_returns_what_the_probe_found() {
        let signal = StopSignal::new();
        let mut timer = Timer::new(signal.token());
        let mut n = 0;
        let outcome = timer
            .poll_value(Duration::from_millis(100), Duration::from_secs(5), || {
                n += 1;
                (n == 3).then_some(n * 10)
            })
            .await;
        assert_eq!(outcome, PollOutcome::Ready(30));
    }

    #[tokio::test(start_paused = true)]
    async fn suspend_hook_brackets_each_sleep() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&calls);
        let signal = StopSignal::new();
        let mut timer = Timer::new(signal.token()).with_suspend_hook(Arc::new(move |s| seen.lock().unwrap().push(s)));
        timer.sleep(Duration::from_millis(10)).await;
        assert_eq!(*calls.lock().unwrap(), vec![true, false]);
    }
}
