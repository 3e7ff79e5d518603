use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::DraftSession;

pub type SharedSession = Arc<Mutex<DraftSession>>;

/// Periodic autosave bound to one editing session. Cancelled on drop.
#[derive(Debug)]
pub struct AutosaveTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl AutosaveTask {
    /// Starts ticking `period` from now; the first write happens after one full period.
    pub fn spawn(runtime: &Handle, session: SharedSession, period: Duration) -> Self {
        let token = CancellationToken::new();
        let child = token.clone();
        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        let guard = session.lock().unwrap_or_else(PoisonError::into_inner);
                        match guard.autosave() {
                            Ok(true) => debug!(key = %guard.autosave_key(), "autosaved draft"),
                            Ok(false) => {}
                            Err(err) => warn!(error = %err, "autosave failed"),
                        }
                    }
                }
            }
        });
        Self { token, handle }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for AutosaveTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
