use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DebouncerConfig {
    /// Time without further changes before the pending action fires
    pub quiet_period: Duration,
}

impl Default for DebouncerConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(300),
        }
    }
}

/// Trailing-edge debouncer: each `schedule` restarts the quiet period and
/// supersedes the previously scheduled action without running it.
///
/// The timer task may already be past its sleep when it is superseded, so the
/// fired callback receives the epoch it was scheduled under and must confirm it
/// with [`Debouncer::take_if_current`] before acting.
pub struct Debouncer {
    config: DebouncerConfig,
    epoch: u64,
    timer: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(config: Option<DebouncerConfig>) -> Self {
        Self {
            config: config.unwrap_or_default(),
            epoch: 0,
            timer: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.config.quiet_period
    }

    /// Whether an action is waiting for the quiet period to elapse.
    pub fn is_pending(&self) -> bool {
        self.timer.is_some()
    }

    /// (Re)starts the quiet period. Returns true if a pending action was superseded.
    pub fn schedule<F>(&mut self, runtime: &Handle, fire: F) -> bool
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let superseded = self.cancel();
        let epoch = self.epoch;
        let delay = self.config.quiet_period;

        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            fire(epoch);
        }));

        superseded
    }

    /// Drops any pending action. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.epoch += 1;
        match self.timer.take() {
            Some(timer) => {
                timer.abort();
                debug!("Dropped pending debounced action");
                true
            }
            None => false,
        }
    }

    /// Called from a fired action: true if `epoch` is still the live schedule,
    /// in which case the debouncer goes back to idle.
    pub fn take_if_current(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || self.timer.is_none() {
            return false;
        }
        self.timer = None;
        true
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<u64>>>, Arc<Mutex<Debouncer>>) {
        let config = DebouncerConfig { quiet_period: Duration::from_millis(300) };
        (Arc::new(Mutex::new(Vec::new())), Arc::new(Mutex::new(Debouncer::new(Some(config)))))
    }

    fn schedule(debouncer: &Arc<Mutex<Debouncer>>, fired: &Arc<Mutex<Vec<u64>>>, label: u64) -> bool {
        let shared = Arc::clone(debouncer);
        let fired = Arc::clone(fired);
        debouncer.lock().unwrap().schedule(&Handle::current(), move |epoch| {
            if shared.lock().unwrap().take_if_current(epoch) {
                fired.lock().unwrap().push(label);
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_last_action() {
        let (fired, debouncer) = recorder();

        assert!(!schedule(&debouncer, &fired, 1));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(schedule(&debouncer, &fired, 2));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(schedule(&debouncer, &fired, 3));

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(fired.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*fired.lock().unwrap(), vec![3]);
        assert!(!debouncer.lock().unwrap().is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_action_never_fires() {
        let (fired, debouncer) = recorder();

        schedule(&debouncer, &fired, 1);
        assert!(debouncer.lock().unwrap().cancel());
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(fired.lock().unwrap().is_empty());
    }

    #[test]
    fn stale_epoch_is_refused() {
        let mut debouncer = Debouncer::new(None);
        debouncer.cancel();
        assert!(!debouncer.take_if_current(0));
        assert_eq!(debouncer.quiet_period(), Duration::from_millis(300));
    }
}
