//! Periodic background reconciliation.
//!
//! # Responsibility
//! - Run one reconcile cycle at start and then on every interval tick.
//! - Report each cycle's outcome to the presentation layer.
//! - Provide a handle for graceful shutdown.
//!
//! # Invariants
//! - A failed cycle is reported and skipped; the loop keeps running.
//! - Reporting never blocks the loop; events past the buffer are dropped.
//! - `stop` lets an in-flight cycle finish before the task exits.
//! - Missed ticks are delayed, never bursted.

use crate::service::quote_service::{ServiceError, SharedQuoteService};
use crate::store::KeyValueStore;
use crate::sync::reconciler::reconcile_shared;
use crate::sync::remote_source::RemoteSource;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const EVENT_BUFFER: usize = 16;

/// Reason a sync loop could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    ZeroInterval,
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroInterval => write!(f, "sync interval must be greater than zero"),
        }
    }
}

impl Error for ScheduleError {}

/// Outcome of one sync cycle.
#[derive(Debug)]
pub enum SyncEvent {
    Synced { added: usize },
    Failed(ServiceError),
}

/// Handle to a running sync loop.
pub struct SyncHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    cycles: Arc<AtomicU64>,
    events: mpsc::Receiver<SyncEvent>,
}

impl SyncHandle {
    /// Number of cycles that have completed, successful or not.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cycle outcomes in completion order.
    ///
    /// `recv` yields `None` once the loop has exited and the buffer is drained.
    pub fn events(&mut self) -> &mut mpsc::Receiver<SyncEvent> {
        &mut self.events
    }

    /// Signals shutdown and waits for the loop to exit.
    ///
    /// Dropping the handle without calling `stop` also ends the loop after
    /// the current cycle, but nothing waits for it.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Err(err) = (&mut self.task).await {
            warn!("event=sync_stop module=sync status=error error={err}");
            return;
        }
        info!(
            "event=sync_stop module=sync status=ok cycles={}",
            self.cycles()
        );
    }
}

/// Spawns the sync loop on the current tokio runtime.
///
/// The first cycle runs immediately.
///
/// # Errors
/// - `ZeroInterval` when `interval` is zero; nothing is spawned.
///
/// # Panics
/// - Panics when called outside a tokio runtime, like `tokio::spawn`.
pub fn start_sync<S, T, R>(
    service: SharedQuoteService<S, T>,
    source: Arc<R>,
    interval: Duration,
) -> Result<SyncHandle, ScheduleError>
where
    S: KeyValueStore + Send + 'static,
    T: KeyValueStore + Send + 'static,
    R: RemoteSource + ?Sized + 'static,
{
    if interval.is_zero() {
        warn!(
            "event=sync_start module=sync status=error error_code=zero_interval source={}",
            source.source_id()
        );
        return Err(ScheduleError::ZeroInterval);
    }

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let cycles = Arc::new(AtomicU64::new(0));
    let task_cycles = Arc::clone(&cycles);

    info!(
        "event=sync_start module=sync status=ok source={} interval_ms={}",
        source.source_id(),
        interval.as_millis()
    );

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    let event = match reconcile_shared(&service, source.as_ref()).await {
                        Ok(added) => {
                            info!("event=sync_cycle module=sync status=ok added={added}");
                            SyncEvent::Synced { added }
                        }
                        Err(err) => {
                            warn!("event=sync_cycle module=sync status=skip error={err}");
                            SyncEvent::Failed(err)
                        }
                    };
                    task_cycles.fetch_add(1, Ordering::SeqCst);
                    if events_tx.try_send(event).is_err() {
                        debug!("event=sync_event module=sync status=dropped");
                    }
                }
            }
        }
    });

    Ok(SyncHandle {
        shutdown: Some(shutdown_tx),
        task,
        cycles,
        events: events_rx,
    })
}
