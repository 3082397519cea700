//! Monitoring loop.
//!
//! Each cycle walks `Probing -> Recording -> Sleeping`:
//!
//! 1. snapshot the registry and probe every device, at most
//!    `concurrency` probes in flight
//! 2. append one record per device, in registry order, as a single batch
//! 3. sleep for the schedule interval
//!
//! The batch append is the only synchronisation point of a cycle. Registry
//! and log failures end the loop with an error; probe failures are recorded
//! as unreachable and never end it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use tokio::sync::watch;

use crate::collector::{MonitorError, Prober, Schedule};
use crate::registry::DeviceRegistry;
use crate::storage::{AvailabilityLog, AvailabilityRecord, Device};

/// Default number of probes in flight per cycle.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Default delay between cycles (5 minutes).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

/// Phase the monitor is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No cycle has started, or a standalone cycle has finished.
    Idle,
    /// Loading the registry and waiting on probes.
    Probing,
    /// Appending the cycle's batch to the availability log.
    Recording,
    /// Waiting for the next cycle.
    Sleeping,
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Records appended, in registry order.
    pub records: Vec<AvailabilityRecord>,
    /// Wall time from registry load to append.
    pub elapsed: Duration,
}

impl CycleReport {
    /// Number of devices that answered.
    pub fn reachable(&self) -> usize {
        self.records.iter().filter(|r| r.reachable).count()
    }

    /// Number of devices that did not answer.
    pub fn unreachable(&self) -> usize {
        self.records.len() - self.reachable()
    }
}

/// Periodic probe-and-record driver.
pub struct Monitor<P: Prober> {
    registry: DeviceRegistry,
    log: AvailabilityLog,
    prober: Arc<P>,
    schedule: Schedule,
    concurrency: usize,
    state: watch::Sender<MonitorState>,
}

impl<P: Prober> Monitor<P> {
    /// Create a monitor with the default schedule and concurrency.
    pub fn new(registry: DeviceRegistry, log: AvailabilityLog, prober: P) -> Self {
        let (state, _) = watch::channel(MonitorState::Idle);
        Self {
            registry,
            log,
            prober: Arc::new(prober),
            schedule: Schedule::interval(DEFAULT_INTERVAL),
            concurrency: DEFAULT_CONCURRENCY,
            state,
        }
    }

    /// Set the delay between cycles.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Set the maximum number of probes in flight. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Current phase.
    pub fn state(&self) -> MonitorState {
        *self.state.borrow()
    }

    /// Watch phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.subscribe()
    }

    /// Run cycles forever, sleeping between them.
    ///
    /// Only returns on a registry or log failure.
    pub async fn run(&self) -> Result<(), MonitorError> {
        tracing::info!(
            schedule = %self.schedule,
            concurrency = self.concurrency,
            registry = %self.registry.store().path().display(),
            log = %self.log.path().display(),
            "Monitoring loop started"
        );

        loop {
            let report = self.cycle().await.inspect_err(|e| {
                tracing::error!(error = %e, "Monitoring cycle failed");
            })?;

            tracing::info!(
                devices = report.records.len(),
                reachable = report.reachable(),
                unreachable = report.unreachable(),
                duration_ms = report.elapsed.as_millis(),
                "Monitoring cycle recorded"
            );

            self.state.send_replace(MonitorState::Sleeping);
            tokio::time::sleep(self.schedule.period()).await;
        }
    }

    /// Probe every registered device once and append the batch.
    ///
    /// The monitor is `Idle` afterwards.
    pub async fn run_cycle(&self) -> Result<CycleReport, MonitorError> {
        let report = self.cycle().await?;
        self.state.send_replace(MonitorState::Idle);
        Ok(report)
    }

    /// One cycle, leaving the state at `Recording` for the caller to advance.
    async fn cycle(&self) -> Result<CycleReport, MonitorError> {
        let start = Instant::now();
        self.state.send_replace(MonitorState::Probing);

        let registry = self.registry.clone();
        let devices = tokio::task::spawn_blocking(move || registry.list())
            .await
            .map_err(|e| MonitorError::Task(e.to_string()))??;

        let records = self.probe_all(&devices).await;

        self.state.send_replace(MonitorState::Recording);
        let log = self.log.clone();
        let records = tokio::task::spawn_blocking(move || log.append(&records).map(|()| records))
            .await
            .map_err(|e| MonitorError::Task(e.to_string()))??;

        Ok(CycleReport {
            records,
            elapsed: start.elapsed(),
        })
    }

    /// Probe `devices` with bounded concurrency, keeping their order.
    ///
    /// Each record is stamped when its own probe completes.
    async fn probe_all(&self, devices: &[Device]) -> Vec<AvailabilityRecord> {
        futures::stream::iter(devices.iter().map(|device| {
            let prober = Arc::clone(&self.prober);
            async move {
                let reachable = prober.probe(&device.address).await;
                tracing::debug!(
                    device_id = device.id,
                    name = %device.name,
                    address = %device.address,
                    reachable,
                    "Device probed"
                );
                AvailabilityRecord::now(device.id, reachable)
            }
        }))
        .buffered(self.concurrency)
        .collect()
        .await
    }
}

impl<P: Prober> std::fmt::Debug for Monitor<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("registry", &self.registry)
            .field("log", &self.log)
            .field("schedule", &self.schedule)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}
