//! Lifecycle of a broker task.
//!
//! A [`BrokerSupervisor`] owns at most one running [`serve`] task. The UDP
//! socket is bound inside [`BrokerSupervisor::start`], so the caller gets
//! the real port back (useful with port 0) and a bind failure is reported
//! synchronously instead of from inside the task. The serve task only ends
//! on its own if the socket fails; [`BrokerSupervisor::status`] reports that
//! as [`BrokerStatus::Crashed`].

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use ufan_core::{Clock, SystemClock};

use crate::error::BrokerError;
use crate::server::{BrokerConfig, serve};

/// Grace period for the serve loop to notice cancellation.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

struct RunningBroker {
    cancel: CancellationToken,
    task: JoinHandle<Result<(), BrokerError>>,
    addr: SocketAddr,
}

impl RunningBroker {
    fn is_live(&self) -> bool {
        !self.task.is_finished()
    }
}

/// What the supervisor knows about its broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerStatus {
    Stopped,
    /// Receiving on `address`.
    Running { address: SocketAddr },
    /// The serve task ended without being asked to.
    Crashed,
}

impl fmt::Display for BrokerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "Stopped"),
            Self::Running { address } => write!(f, "Running on {address}"),
            Self::Crashed => write!(f, "Crashed"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("Broker is already running on {0}")]
    AlreadyRunning(SocketAddr),

    #[error("Failed to bind to {address}: {reason}")]
    BindFailed { address: String, reason: String },

    #[error("Broker is not running")]
    NotRunning,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Starts, stops and inspects one broker.
///
/// ```ignore
/// let supervisor = BrokerSupervisor::new();
/// let addr = supervisor.start(BrokerConfig::default()).await?;
/// // ... publish and subscribe against `addr` ...
/// supervisor.stop().await?;
/// ```
#[derive(Default)]
pub struct BrokerSupervisor {
    slot: Mutex<Option<RunningBroker>>,
}

impl BrokerSupervisor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a broker on the wall clock.
    pub async fn start(&self, config: BrokerConfig) -> Result<SocketAddr, SupervisorError> {
        self.start_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Bind `config.bind`, spawn the serve loop, and return the bound address.
    pub async fn start_with_clock(
        &self,
        config: BrokerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<SocketAddr, SupervisorError> {
        let mut slot = self.slot.lock().await;

        match slot.take() {
            Some(current) if current.is_live() => {
                let addr = current.addr;
                *slot = Some(current);
                return Err(SupervisorError::AlreadyRunning(addr));
            }
            Some(finished) => reap(finished).await,
            None => {}
        }

        let socket = UdpSocket::bind(config.bind)
            .await
            .map_err(|e| SupervisorError::BindFailed {
                address: config.bind.to_string(),
                reason: e.to_string(),
            })?;
        let addr = socket
            .local_addr()
            .map_err(|e| SupervisorError::Internal(format!("no local address: {e}")))?;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(serve(socket, config, clock, cancel.clone()));
        info!(%addr, "Broker started");

        *slot = Some(RunningBroker { cancel, task, addr });
        Ok(addr)
    }

    /// Cancel the serve loop and wait for it, aborting after 5 s.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        let Some(RunningBroker { cancel, mut task, addr }) = self.slot.lock().await.take() else {
            return Err(SupervisorError::NotRunning);
        };

        debug!(%addr, "Cancelling broker");
        cancel.cancel();

        match tokio::time::timeout(STOP_TIMEOUT, &mut task).await {
            Ok(Ok(Ok(()))) => {
                info!(%addr, "Broker stopped");
                Ok(())
            }
            Ok(Ok(Err(e))) => {
                error!(%addr, "Broker failed while stopping: {e}");
                Err(SupervisorError::Internal(e.to_string()))
            }
            Ok(Err(join)) => {
                error!(%addr, "Broker task panicked: {join}");
                Err(SupervisorError::Internal(format!("broker task panicked: {join}")))
            }
            Err(_) => {
                warn!(%addr, "Broker ignored cancellation for {STOP_TIMEOUT:?}, aborting");
                task.abort();
                Err(SupervisorError::Internal("broker did not stop in time".into()))
            }
        }
    }

    /// Current status. A broker that ended on its own is cleared and
    /// reported once as [`BrokerStatus::Crashed`].
    pub async fn status(&self) -> BrokerStatus {
        let mut slot = self.slot.lock().await;
        let Some(running) = slot.as_ref() else {
            return BrokerStatus::Stopped;
        };
        if running.is_live() {
            return BrokerStatus::Running {
                address: running.addr,
            };
        }

        let cancelled = running.cancel.is_cancelled();
        let addr = running.addr;
        *slot = None;
        if cancelled {
            BrokerStatus::Stopped
        } else {
            warn!(%addr, "Broker task exited unexpectedly");
            BrokerStatus::Crashed
        }
    }

    /// Address of the live broker, if any.
    pub async fn bound_address(&self) -> Option<SocketAddr> {
        self.slot
            .lock()
            .await
            .as_ref()
            .filter(|running| running.is_live())
            .map(|running| running.addr)
    }
}

/// Collect the result of a serve task that already finished.
async fn reap(finished: RunningBroker) {
    match finished.task.await {
        Ok(Ok(())) => debug!(addr = %finished.addr, "Previous broker exited cleanly"),
        Ok(Err(e)) => warn!(addr = %finished.addr, "Previous broker failed: {e}"),
        Err(e) => warn!(addr = %finished.addr, "Previous broker panicked: {e}"),
    }
}

impl fmt::Debug for BrokerSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerSupervisor").finish_non_exhaustive()
    }
}
