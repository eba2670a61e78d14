/**
 * DASHBOARD ENGINE - Boots and tears down every simulated stream
 *
 * ROLE: Validates the mission config, builds each component with its own
 * random source, publishes its initial view and hands it to a dedicated
 * periodic task. Components never share mutable state; each one only writes
 * its own slice of the read model.
 *
 * The alert manager is the one component with inbound traffic: operator
 * actions arrive as messages on a channel served by the same task that runs
 * the synthesis tick, so ticks and actions never interleave.
 */

use crate::alerts::{AlertBook, AlertFilter, AlertOutcome, SeverityFilter};
use crate::clock::{MissionClock, MISSION_CLOCK_PERIOD};
use crate::config::MissionConfig;
use crate::error::{ConfigError, DashboardError};
use crate::events::EventLog;
use crate::link::LinkSimulator;
use crate::metrics::MetricStreams;
use crate::navigation::Navigator;
use crate::read_model::{DashboardSnapshot, SharedReadModel};
use crate::scheduler::PeriodicTask;
use crate::state::component_rng;
use crate::subsystems::SubsystemMonitor;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertAction {
    Acknowledge,
    Monitor,
    Resolve,
    Dismiss,
}

#[derive(Debug)]
pub enum AlertCommand {
    Apply {
        action: AlertAction,
        id: String,
        reply: oneshot::Sender<AlertOutcome>,
    },
    SetSeverityFilter {
        severity: SeverityFilter,
        reply: oneshot::Sender<AlertFilter>,
    },
    SetShowAcknowledged {
        show: bool,
        reply: oneshot::Sender<AlertFilter>,
    },
}

/// Operator-side handle to the alert manager. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AlertHandle {
    tx: mpsc::Sender<AlertCommand>,
}

impl AlertHandle {
    pub async fn apply(
        &self,
        action: AlertAction,
        id: &str,
    ) -> Result<AlertOutcome, DashboardError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(AlertCommand::Apply { action, id: id.to_string(), reply })
            .await
            .map_err(|_| DashboardError::AlertManagerStopped)?;
        rx.await.map_err(|_| DashboardError::AlertManagerStopped)
    }

    pub async fn acknowledge(&self, id: &str) -> Result<AlertOutcome, DashboardError> {
        self.apply(AlertAction::Acknowledge, id).await
    }

    pub async fn monitor(&self, id: &str) -> Result<AlertOutcome, DashboardError> {
        self.apply(AlertAction::Monitor, id).await
    }

    pub async fn resolve(&self, id: &str) -> Result<AlertOutcome, DashboardError> {
        self.apply(AlertAction::Resolve, id).await
    }

    pub async fn dismiss(&self, id: &str) -> Result<AlertOutcome, DashboardError> {
        self.apply(AlertAction::Dismiss, id).await
    }

    pub async fn set_severity_filter(
        &self,
        severity: SeverityFilter,
    ) -> Result<AlertFilter, DashboardError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(AlertCommand::SetSeverityFilter { severity, reply })
            .await
            .map_err(|_| DashboardError::AlertManagerStopped)?;
        rx.await.map_err(|_| DashboardError::AlertManagerStopped)
    }

    pub async fn set_show_acknowledged(&self, show: bool) -> Result<AlertFilter, DashboardError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(AlertCommand::SetShowAcknowledged { show, reply })
            .await
            .map_err(|_| DashboardError::AlertManagerStopped)?;
        rx.await.map_err(|_| DashboardError::AlertManagerStopped)
    }
}

fn apply_action(book: &mut AlertBook, action: AlertAction, id: &str) -> AlertOutcome {
    let outcome = match action {
        AlertAction::Acknowledge => book.acknowledge(id),
        AlertAction::Monitor => book.monitor(id),
        AlertAction::Resolve => book.resolve(id),
        AlertAction::Dismiss => book.dismiss(id),
    };
    match outcome {
        AlertOutcome::Applied => info!("[alerts] {:?} {}", action, id),
        AlertOutcome::NotFound => warn!("[alerts] {:?} ignored, unknown alert {}", action, id),
        other => debug!("[alerts] {:?} {} -> {:?}", action, id, other),
    }
    outcome
}

/// Runs the alert manager: synthesis on every tick, operator commands in between.
fn spawn_alert_manager(
    mut book: AlertBook,
    period: Duration,
    read_model: SharedReadModel,
) -> (PeriodicTask, AlertHandle) {
    let (tx, mut rx) = mpsc::channel::<AlertCommand>(32);
    read_model.publish_alerts(book.view());

    let handle = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Some(alert) = book.maybe_synthesize(OffsetDateTime::now_utc()) {
                        info!(
                            "[alerts] raised {} ({:?}, {:?}) at {}",
                            alert.id, alert.severity, alert.category, alert.location
                        );
                        read_model.publish_alerts(book.view());
                    }
                }
                command = rx.recv() => {
                    let Some(command) = command else { break };
                    // publish before replying so the caller reads its own write
                    match command {
                        AlertCommand::Apply { action, id, reply } => {
                            let outcome = apply_action(&mut book, action, &id);
                            read_model.publish_alerts(book.view());
                            let _ = reply.send(outcome);
                        }
                        AlertCommand::SetSeverityFilter { severity, reply } => {
                            let filter = book.set_severity_filter(severity);
                            read_model.publish_alerts(book.view());
                            let _ = reply.send(filter);
                        }
                        AlertCommand::SetShowAcknowledged { show, reply } => {
                            let filter = book.set_show_acknowledged(show);
                            read_model.publish_alerts(book.view());
                            let _ = reply.send(filter);
                        }
                    }
                }
            }
        }
        debug!("[alerts] command channel closed, manager exiting");
    });

    (PeriodicTask::from_handle("alerts", period, handle), AlertHandle { tx })
}

/// A running dashboard. Dropping it (or calling [`Dashboard::stop`]) cancels every timer.
pub struct Dashboard {
    tasks: Vec<PeriodicTask>,
    alerts: AlertHandle,
    read_model: SharedReadModel,
}

impl Dashboard {
    /// Starts every stream. Must be called from within a tokio runtime.
    pub fn start(config: &MissionConfig, read_model: SharedReadModel) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed;
        let mut tasks = MetricStreams::new(&config.metrics, seed)?.spawn(read_model.clone());

        let alerts_rng = component_rng(seed, "alerts");
        let book = AlertBook::new(config.alerts.synthesis_probability, alerts_rng)
            .with_seeds(&config.alerts.initial, OffsetDateTime::now_utc());
        let alerts_period = Duration::from_millis(config.alerts.period_ms);
        let (alert_task, alerts) = spawn_alert_manager(book, alerts_period, read_model.clone());
        tasks.push(alert_task);

        let mut link =
            LinkSimulator::new(config.link.change_probability, component_rng(seed, "link"));
        read_model.publish_link(link.status());
        let rm = read_model.clone();
        tasks.push(PeriodicTask::spawn(
            "link",
            Duration::from_millis(config.link.period_ms),
            move || rm.publish_link(link.tick()),
        ));

        let mut clock = MissionClock::new();
        read_model.publish_mission_time(clock.elapsed());
        let rm = read_model.clone();
        tasks.push(PeriodicTask::spawn("clock", MISSION_CLOCK_PERIOD, move || {
            rm.publish_mission_time(clock.tick());
        }));

        let mut navigator = Navigator::new(&config.navigation);
        read_model.publish_navigation(navigator.view());
        let rm = read_model.clone();
        tasks.push(PeriodicTask::spawn(
            "navigation",
            Duration::from_millis(config.navigation.period_ms),
            move || {
                if navigator.tick() {
                    rm.publish_navigation(navigator.view());
                }
            },
        ));

        let mut subsystems =
            SubsystemMonitor::new(&config.subsystems, component_rng(seed, "subsystems"));
        read_model.publish_subsystems(subsystems.view());
        let rm = read_model.clone();
        tasks.push(PeriodicTask::spawn(
            "subsystems",
            Duration::from_millis(config.subsystems.period_ms),
            move || rm.publish_subsystems(subsystems.tick()),
        ));

        let mut events = EventLog::new(config.events.capacity, component_rng(seed, "events"));
        read_model.publish_events(events.entries());
        let rm = read_model.clone();
        tasks.push(PeriodicTask::spawn(
            "events",
            Duration::from_millis(config.events.period_ms),
            move || {
                events.tick(OffsetDateTime::now_utc());
                rm.publish_events(events.entries());
            },
        ));

        info!(
            "[dashboard] started {} streams (session {})",
            tasks.len(),
            read_model.session_id()
        );
        Ok(Self { tasks, alerts, read_model })
    }

    pub fn alerts(&self) -> AlertHandle {
        self.alerts.clone()
    }

    pub fn read_model(&self) -> &SharedReadModel {
        &self.read_model
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.read_model.snapshot()
    }

    pub fn tasks(&self) -> &[PeriodicTask] {
        &self.tasks
    }

    pub fn running_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_running()).count()
    }

    pub fn stop(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        for task in &mut self.tasks {
            task.stop();
        }
        self.tasks.clear();
        info!("[dashboard] stopped");
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.stop();
    }
}
