//! # Payment Confirmation
//!
//! After the customer comes back from the hosted payment page, the processor
//! may not have settled yet. The poller asks for the session status a bounded
//! number of times and settles on one terminal state:
//!
//! ```text
//!             session id missing
//!   Loading ───────────────────────────────▶ Error
//!      │
//!      │ check ──▶ paid ──────────────────▶ Success (cart cleared)
//!      │       ──▶ expired ───────────────▶ Expired
//!      │       ──▶ other / failure
//!      │              attempt < max ──▶ wait, attempt += 1, check again
//!      │              attempt == max ──▶ Pending (status) | Error (failure)
//! ```
//!
//! With the defaults that is at most 6 checks spaced 2 seconds apart.
//! [`evaluate`] is the pure transition function; [`PaymentConfirmationPoller`]
//! drives it on a task and hands back a [`PollHandle`]. Dropping or
//! cancelling the handle aborts the task, so no scheduled check fires after
//! the consumer has gone away.

use crate::cart::CartStore;
use crate::error::ShopResult;
use crate::gateway::SessionStatusGateway;
use crate::session::SessionStatus;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Retries after the first check; total checks are `max_attempts + 1`
    pub max_attempts: u32,
    /// Fixed spacing between checks
    pub retry_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl PollerConfig {
    /// Upper bound on status checks in one run
    pub fn max_checks(&self) -> u32 {
        self.max_attempts.saturating_add(1)
    }
}

/// Where a confirmation run stands
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationState {
    /// Checks in progress
    Loading,
    /// Paid; carries the session projection that proved it
    Success(SessionStatus),
    /// The processor expired the session; checkout must restart
    Expired,
    /// Still unpaid after the last check; it may settle later
    Pending,
    /// No session id, or every check failed
    Error(String),
}

impl ConfirmationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConfirmationState::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConfirmationState::Success(_))
    }
}

/// Snapshot of a run, published after every transition
#[derive(Debug, Clone, PartialEq)]
pub struct PollState {
    pub session_id: Option<String>,
    /// Retries performed so far
    pub attempt: u32,
    pub state: ConfirmationState,
}

/// Outcome of evaluating one status check
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Stop with this terminal state
    Settle(ConfirmationState),
    /// Wait the retry delay, then check again as `next_attempt`
    Retry { next_attempt: u32 },
}

/// Decide what follows the check made at `attempt`.
pub fn evaluate(attempt: u32, max_attempts: u32, check: &ShopResult<SessionStatus>) -> Step {
    match check {
        Ok(status) if status.is_paid() => Step::Settle(ConfirmationState::Success(status.clone())),
        Ok(status) if status.is_expired() => Step::Settle(ConfirmationState::Expired),
        _ if attempt < max_attempts => Step::Retry {
            next_attempt: attempt + 1,
        },
        Ok(_) => Step::Settle(ConfirmationState::Pending),
        Err(e) => Step::Settle(ConfirmationState::Error(e.to_string())),
    }
}

/// Told once when a session is confirmed paid
#[async_trait]
pub trait ConfirmationListener: Send + Sync {
    async fn on_paid(&self, session_id: &str, status: &SessionStatus);
}

/// The shared cart empties itself on confirmed payment
#[async_trait]
impl ConfirmationListener for Mutex<CartStore> {
    async fn on_paid(&self, session_id: &str, _status: &SessionStatus) {
        match self.lock().await.clear() {
            Ok(()) => info!("Cart cleared after payment of {}", session_id),
            Err(e) => warn!("Could not clear cart after payment of {}: {}", session_id, e),
        }
    }
}

pub struct PaymentConfirmationPoller {
    gateway: Arc<dyn SessionStatusGateway>,
    listener: Arc<dyn ConfirmationListener>,
    config: PollerConfig,
}

impl PaymentConfirmationPoller {
    pub fn new(
        gateway: Arc<dyn SessionStatusGateway>,
        listener: Arc<dyn ConfirmationListener>,
    ) -> Self {
        Self {
            gateway,
            listener,
            config: PollerConfig::default(),
        }
    }

    /// Builder: override the retry budget
    pub fn with_config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    /// Run to a terminal state on the current task
    pub async fn run(&self, session_id: Option<&str>) -> ConfirmationState {
        let session_id = session_id.map(str::to_string);
        let (tx, _rx) = watch::channel(initial_state(&session_id));
        drive(
            self.gateway.clone(),
            self.listener.clone(),
            self.config,
            session_id,
            tx,
        )
        .await
    }

    /// Run on a spawned task; the returned handle owns it.
    pub fn start(&self, session_id: Option<String>) -> PollHandle {
        let (tx, rx) = watch::channel(initial_state(&session_id));
        let task = tokio::spawn(drive(
            self.gateway.clone(),
            self.listener.clone(),
            self.config,
            session_id,
            tx,
        ));

        PollHandle {
            state: rx,
            task: Some(task),
        }
    }
}

fn initial_state(session_id: &Option<String>) -> PollState {
    PollState {
        session_id: session_id.clone(),
        attempt: 0,
        state: ConfirmationState::Loading,
    }
}

#[instrument(skip(gateway, listener, config, tx))]
async fn drive(
    gateway: Arc<dyn SessionStatusGateway>,
    listener: Arc<dyn ConfirmationListener>,
    config: PollerConfig,
    session_id: Option<String>,
    tx: watch::Sender<PollState>,
) -> ConfirmationState {
    let Some(session_id) = session_id.filter(|s| !s.trim().is_empty()) else {
        warn!("No session id to confirm");
        let state = ConfirmationState::Error("missing session id".to_string());
        tx.send_replace(PollState {
            session_id: None,
            attempt: 0,
            state: state.clone(),
        });
        return state;
    };

    let mut attempt = 0;
    loop {
        let check = gateway.session_status(&session_id).await;
        if let Err(ref e) = check {
            warn!("Status check {} failed: {}", attempt, e);
        }

        match evaluate(attempt, config.max_attempts, &check) {
            Step::Settle(state) => {
                if let ConfirmationState::Success(ref status) = state {
                    listener.on_paid(&session_id, status).await;
                }
                info!("Session {} settled after {} retries: {:?}", session_id, attempt, state);
                tx.send_replace(PollState {
                    session_id: Some(session_id),
                    attempt,
                    state: state.clone(),
                });
                return state;
            }
            Step::Retry { next_attempt } => {
                debug!("Session {} unresolved, retry {}", session_id, next_attempt);
                tokio::time::sleep(config.retry_delay).await;
                attempt = next_attempt;
                tx.send_replace(PollState {
                    session_id: Some(session_id.clone()),
                    attempt,
                    state: ConfirmationState::Loading,
                });
            }
        }
    }
}

/// Owner of a running confirmation. Dropping it cancels the run.
pub struct PollHandle {
    state: watch::Receiver<PollState>,
    task: Option<JoinHandle<ConfirmationState>>,
}

impl PollHandle {
    /// Latest published snapshot
    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Wait for the next snapshot; `None` once the run is over and seen
    pub async fn changed(&mut self) -> Option<PollState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Wait for the terminal state
    pub async fn wait(mut self) -> ConfirmationState {
        let Some(task) = self.task.take() else {
            return self.state().state;
        };
        match task.await {
            Ok(state) => state,
            Err(e) => ConfirmationState::Error(format!("confirmation task failed: {}", e)),
        }
    }

    /// Abort the run; no further checks are made
    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("Cancelling payment confirmation");
            }
            task.abort();
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
