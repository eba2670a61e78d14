/**
 * DASHBOARD READ MODEL - The observable surface of the engine
 *
 * ROLE: Holds the latest published copy of every slice (metrics, alerts,
 * link, mission clock, navigation, subsystems, operator log). Only the task
 * owning a slice writes it, and each write swaps the whole slice under its
 * own lock, so a reader never sees a half-updated metric.
 *
 * No logic lives here: snapshots are plain copies, safe to poll at any rate.
 */

use crate::alerts::{Alert, AlertSummary, AlertsView};
use crate::clock::format_mission_time;
use crate::error::DashboardError;
use crate::events::LogEntry;
use crate::link::LinkStatus;
use crate::metrics::MetricView;
use crate::navigation::NavigationView;
use crate::subsystems::SubsystemsView;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

pub type SharedReadModel = Arc<ReadModel>;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub session_id: Uuid,
    pub metrics: BTreeMap<String, MetricView>,
    pub alerts: AlertsView,
    pub link_status: LinkStatus,
    pub mission_time_seconds: u64,
    pub mission_time: String,
    pub navigation: NavigationView,
    pub subsystems: SubsystemsView,
    pub events: Vec<LogEntry>,
}

#[derive(Debug)]
pub struct ReadModel {
    session_id: Uuid,
    metrics: RwLock<BTreeMap<String, MetricView>>,
    alerts: RwLock<AlertsView>,
    link: RwLock<LinkStatus>,
    mission_time: RwLock<u64>,
    navigation: RwLock<NavigationView>,
    subsystems: RwLock<SubsystemsView>,
    events: RwLock<Vec<LogEntry>>,
}

impl Default for ReadModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadModel {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            metrics: RwLock::default(),
            alerts: RwLock::default(),
            link: RwLock::default(),
            mission_time: RwLock::default(),
            navigation: RwLock::default(),
            subsystems: RwLock::default(),
            events: RwLock::default(),
        }
    }

    pub fn shared() -> SharedReadModel {
        Arc::new(Self::new())
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    // --- publishers (one writer per slice) ---

    pub fn publish_metric(&self, view: MetricView) {
        self.metrics.write().insert(view.name.clone(), view);
    }

    pub fn publish_alerts(&self, view: AlertsView) {
        *self.alerts.write() = view;
    }

    pub fn publish_link(&self, status: LinkStatus) {
        *self.link.write() = status;
    }

    pub fn publish_mission_time(&self, seconds: u64) {
        *self.mission_time.write() = seconds;
    }

    pub fn publish_navigation(&self, view: NavigationView) {
        *self.navigation.write() = view;
    }

    pub fn publish_subsystems(&self, view: SubsystemsView) {
        *self.subsystems.write() = view;
    }

    pub fn publish_events(&self, entries: Vec<LogEntry>) {
        *self.events.write() = entries;
    }

    // --- readers ---

    pub fn metric(&self, name: &str) -> Result<MetricView, DashboardError> {
        self.metrics
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownMetric(name.to_string()))
    }

    pub fn metrics(&self) -> BTreeMap<String, MetricView> {
        self.metrics.read().clone()
    }

    pub fn alerts(&self) -> AlertsView {
        self.alerts.read().clone()
    }

    pub fn visible_alerts(&self) -> Vec<Alert> {
        self.alerts.read().visible.clone()
    }

    pub fn alert_summary(&self) -> AlertSummary {
        self.alerts.read().summary
    }

    pub fn link_status(&self) -> LinkStatus {
        *self.link.read()
    }

    pub fn mission_time_seconds(&self) -> u64 {
        *self.mission_time.read()
    }

    pub fn navigation(&self) -> NavigationView {
        self.navigation.read().clone()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let mission_time_seconds = self.mission_time_seconds();
        DashboardSnapshot {
            session_id: self.session_id,
            metrics: self.metrics(),
            alerts: self.alerts(),
            link_status: self.link_status(),
            mission_time_seconds,
            mission_time: format_mission_time(mission_time_seconds),
            navigation: self.navigation(),
            subsystems: self.subsystems.read().clone(),
            events: self.events.read().clone(),
        }
    }
}
