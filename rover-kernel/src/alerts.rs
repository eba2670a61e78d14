/**
 * ALERT LIFECYCLE - Operational alerts raised against the rover
 *
 * ROLE: Owns the alert collection (newest first), synthesizes alerts at random
 * and applies operator actions.
 *
 * LIFECYCLE:
 * - synthesized alerts start `active`, unacknowledged
 * - acknowledge only flips the flag, never the status
 * - monitor: active → monitoring
 * - resolve: active | monitoring → resolved (and acknowledged)
 * - dismiss removes the alert for good, from any state
 *
 * Unknown ids are tolerated: every action reports an [`AlertOutcome`] instead
 * of failing. Summary counts are reductions over the collection at read time.
 */

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertCategory {
    Environmental,
    Navigation,
    System,
    Communication,
}

impl AlertCategory {
    pub const ALL: [AlertCategory; 4] = [
        AlertCategory::Environmental,
        AlertCategory::Navigation,
        AlertCategory::System,
        AlertCategory::Communication,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Active,
    Monitoring,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub severity: Severity,
    pub category: AlertCategory,
    pub title: String,
    pub description: String,
    pub location: String,
    pub status: AlertStatus,
    pub acknowledged: bool,
}

/// Alert present when the dashboard starts; its id is assigned on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSeed {
    /// How long ago the alert was raised.
    #[serde(default)]
    pub age_secs: u64,
    pub severity: Severity,
    pub category: AlertCategory,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub status: AlertStatus,
    #[serde(default)]
    pub acknowledged: bool,
}

/// Severity selector of the alert list (`all` or one severity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityFilter {
    #[default]
    All,
    Low,
    Medium,
    High,
}

impl SeverityFilter {
    pub fn severity(self) -> Option<Severity> {
        match self {
            SeverityFilter::All => None,
            SeverityFilter::Low => Some(Severity::Low),
            SeverityFilter::Medium => Some(Severity::Medium),
            SeverityFilter::High => Some(Severity::High),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilter {
    pub severity: SeverityFilter,
    pub show_acknowledged: bool,
}

impl Default for AlertFilter {
    fn default() -> Self {
        Self { severity: SeverityFilter::All, show_acknowledged: true }
    }
}

/// Result of an operator action. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertOutcome {
    Applied,
    /// The alert was already in the requested state.
    Unchanged,
    NotFound,
    /// e.g. monitoring an alert that is already resolved.
    InvalidTransition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AlertSummary {
    /// High severity, still active.
    pub critical_active: usize,
    /// Medium severity, not resolved.
    pub warning_open: usize,
    /// Low severity, any status.
    pub info: usize,
    pub resolved: usize,
    pub unacknowledged_active: usize,
}

impl AlertSummary {
    pub fn of(alerts: &[Alert]) -> Self {
        alerts.iter().fold(Self::default(), |mut acc, a| {
            let active = a.status == AlertStatus::Active;
            let resolved = a.status == AlertStatus::Resolved;
            match a.severity {
                Severity::High if active => acc.critical_active += 1,
                Severity::Medium if !resolved => acc.warning_open += 1,
                Severity::Low => acc.info += 1,
                _ => {}
            }
            if resolved {
                acc.resolved += 1;
            }
            if active && !a.acknowledged {
                acc.unacknowledged_active += 1;
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertsView {
    /// Every alert, newest first.
    pub alerts: Vec<Alert>,
    /// Alerts passing the current filter.
    pub visible: Vec<Alert>,
    pub filter: AlertFilter,
    pub summary: AlertSummary,
}

const SYNTHETIC_TITLE: &str = "System Alert Generated";
const SYNTHETIC_DESCRIPTION: &str =
    "Automated system monitoring detected an anomaly requiring attention";

pub struct AlertBook {
    alerts: Vec<Alert>,
    next_seq: u32,
    filter: AlertFilter,
    synthesis_probability: f64,
    rng: StdRng,
}

impl AlertBook {
    pub fn new(synthesis_probability: f64, rng: StdRng) -> Self {
        Self {
            alerts: Vec::new(),
            next_seq: 1,
            filter: AlertFilter::default(),
            synthesis_probability,
            rng,
        }
    }

    /// Loads start-up alerts, oldest last, each with a fresh id.
    pub fn with_seeds(mut self, seeds: &[AlertSeed], now: OffsetDateTime) -> Self {
        let mut seeded: Vec<Alert> = seeds
            .iter()
            .map(|seed| Alert {
                id: self.next_id(),
                timestamp: i64::try_from(seed.age_secs)
                    .ok()
                    .and_then(|age| now.checked_sub(time::Duration::seconds(age)))
                    .unwrap_or(now),
                severity: seed.severity,
                category: seed.category,
                title: seed.title.clone(),
                description: seed.description.clone(),
                location: seed.location.clone(),
                status: seed.status,
                // a resolved alert is always acknowledged
                acknowledged: seed.acknowledged || seed.status == AlertStatus::Resolved,
            })
            .collect();
        seeded.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        seeded.append(&mut self.alerts);
        self.alerts = seeded;
        self
    }

    fn next_id(&mut self) -> String {
        let id = format!("ALT-{:03}", self.next_seq);
        self.next_seq += 1;
        id
    }

    /// Creates a new active alert with random severity, category and sector
    /// and puts it at the head of the collection.
    pub fn synthesize(&mut self, now: OffsetDateTime) -> Alert {
        let severity = Severity::ALL[self.rng.gen_range(0..Severity::ALL.len())];
        let category = AlertCategory::ALL[self.rng.gen_range(0..AlertCategory::ALL.len())];
        let sector = char::from(b'A' + self.rng.gen_range(0..6u8));
        let zone = self.rng.gen_range(1..=3);
        let alert = Alert {
            id: self.next_id(),
            timestamp: now,
            severity,
            category,
            title: SYNTHETIC_TITLE.into(),
            description: SYNTHETIC_DESCRIPTION.into(),
            location: format!("Sector {sector}{zone}"),
            status: AlertStatus::Active,
            acknowledged: false,
        };
        self.alerts.insert(0, alert.clone());
        alert
    }

    /// One synthesis tick: raises an alert with the configured probability.
    pub fn maybe_synthesize(&mut self, now: OffsetDateTime) -> Option<Alert> {
        let sample: f64 = self.rng.gen();
        if sample > 1.0 - self.synthesis_probability {
            Some(self.synthesize(now))
        } else {
            None
        }
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Alert> {
        self.alerts.iter_mut().find(|a| a.id == id)
    }

    pub fn acknowledge(&mut self, id: &str) -> AlertOutcome {
        match self.find_mut(id) {
            None => AlertOutcome::NotFound,
            Some(alert) if alert.acknowledged => AlertOutcome::Unchanged,
            Some(alert) => {
                alert.acknowledged = true;
                AlertOutcome::Applied
            }
        }
    }

    pub fn monitor(&mut self, id: &str) -> AlertOutcome {
        match self.find_mut(id) {
            None => AlertOutcome::NotFound,
            Some(alert) => match alert.status {
                AlertStatus::Active => {
                    alert.status = AlertStatus::Monitoring;
                    AlertOutcome::Applied
                }
                AlertStatus::Monitoring => AlertOutcome::Unchanged,
                AlertStatus::Resolved => AlertOutcome::InvalidTransition,
            },
        }
    }

    pub fn resolve(&mut self, id: &str) -> AlertOutcome {
        match self.find_mut(id) {
            None => AlertOutcome::NotFound,
            Some(alert) if alert.status == AlertStatus::Resolved => AlertOutcome::Unchanged,
            Some(alert) => {
                alert.status = AlertStatus::Resolved;
                alert.acknowledged = true;
                AlertOutcome::Applied
            }
        }
    }

    pub fn dismiss(&mut self, id: &str) -> AlertOutcome {
        match self.alerts.iter().position(|a| a.id == id) {
            Some(index) => {
                self.alerts.remove(index);
                AlertOutcome::Applied
            }
            None => AlertOutcome::NotFound,
        }
    }

    /// Pure projection: alerts of one severity (or all), optionally hiding
    /// acknowledged ones. Order is preserved.
    pub fn filter(&self, severity: Option<Severity>, include_acknowledged: bool) -> Vec<Alert> {
        self.alerts
            .iter()
            .filter(|a| severity.map_or(true, |s| a.severity == s))
            .filter(|a| include_acknowledged || !a.acknowledged)
            .cloned()
            .collect()
    }

    pub fn set_severity_filter(&mut self, severity: SeverityFilter) -> AlertFilter {
        self.filter.severity = severity;
        self.filter
    }

    pub fn set_show_acknowledged(&mut self, show: bool) -> AlertFilter {
        self.filter.show_acknowledged = show;
        self.filter
    }

    pub fn current_filter(&self) -> AlertFilter {
        self.filter
    }

    pub fn visible(&self) -> Vec<Alert> {
        self.filter(self.filter.severity.severity(), self.filter.show_acknowledged)
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn summary(&self) -> AlertSummary {
        AlertSummary::of(&self.alerts)
    }

    pub fn view(&self) -> AlertsView {
        AlertsView {
            alerts: self.alerts.clone(),
            visible: self.visible(),
            filter: self.filter,
            summary: self.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlertsConf;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn book(seed: u64) -> AlertBook {
        AlertBook::new(0.3, StdRng::seed_from_u64(seed))
    }

    fn now() -> OffsetDateTime {
        time::macros::datetime!(2026-10-16 12:00 UTC)
    }

    #[test]
    fn test_hundred_synthesized_alerts_are_fresh_and_unique() {
        let mut book = book(1);
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let alert = book.synthesize(now());
            assert_eq!(alert.status, AlertStatus::Active);
            assert!(!alert.acknowledged);
            assert!(Severity::ALL.contains(&alert.severity));
            assert!(ids.insert(alert.id));
        }
        assert_eq!(book.len(), 100);
    }

    #[test]
    fn test_synthesized_alerts_are_prepended() {
        let mut book = book(2);
        let first = book.synthesize(now());
        let second = book.synthesize(now());
        assert_eq!(book.alerts()[0].id, second.id);
        assert_eq!(book.alerts()[1].id, first.id);
        assert!(first.location.starts_with("Sector "));
    }

    #[test]
    fn test_acknowledge_unknown_id_changes_nothing() {
        let mut book = book(3);
        book.synthesize(now());
        let before = book.alerts().to_vec();
        assert_eq!(book.acknowledge("ALT-999"), AlertOutcome::NotFound);
        assert_eq!(book.alerts(), &before[..]);
    }

    #[test]
    fn test_acknowledge_flips_flag_only() {
        let mut book = book(4);
        let alert = book.synthesize(now());
        assert_eq!(book.acknowledge(&alert.id), AlertOutcome::Applied);
        assert_eq!(book.acknowledge(&alert.id), AlertOutcome::Unchanged);
        let stored = book.get(&alert.id).unwrap();
        assert!(stored.acknowledged);
        assert_eq!(stored.status, AlertStatus::Active);
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut book = book(5);
        let keep = book.synthesize(now());
        let drop = book.synthesize(now());
        assert_eq!(book.dismiss(&drop.id), AlertOutcome::Applied);
        assert_eq!(book.len(), 1);
        assert_eq!(book.dismiss(&drop.id), AlertOutcome::NotFound);
        assert_eq!(book.dismiss(&drop.id), AlertOutcome::NotFound);
        assert_eq!(book.len(), 1);
        assert!(book.get(&keep.id).is_some());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut book = book(6);
        let alert = book.synthesize(now());
        assert_eq!(book.monitor(&alert.id), AlertOutcome::Applied);
        assert_eq!(book.monitor(&alert.id), AlertOutcome::Unchanged);
        assert_eq!(book.resolve(&alert.id), AlertOutcome::Applied);
        let stored = book.get(&alert.id).unwrap();
        assert_eq!(stored.status, AlertStatus::Resolved);
        assert!(stored.acknowledged);
        assert_eq!(book.resolve(&alert.id), AlertOutcome::Unchanged);
        assert_eq!(book.monitor(&alert.id), AlertOutcome::InvalidTransition);
        assert_eq!(book.resolve("nope"), AlertOutcome::NotFound);
        // resolution never deletes
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_filter_high_unacknowledged() {
        let mut book = book(7);
        for _ in 0..60 {
            book.synthesize(now());
        }
        let ids: Vec<String> = book.alerts().iter().step_by(3).map(|a| a.id.clone()).collect();
        for id in &ids {
            book.acknowledge(id);
        }
        let before = book.alerts().to_vec();
        let high = book.filter(Some(Severity::High), false);
        assert!(!high.is_empty());
        assert!(high.len() <= book.len());
        assert!(high.iter().all(|a| a.severity == Severity::High && !a.acknowledged));
        let expected = before
            .iter()
            .filter(|a| a.severity == Severity::High && !a.acknowledged)
            .count();
        assert_eq!(high.len(), expected);
        assert_eq!(book.alerts(), &before[..]);
        assert_eq!(book.filter(None, true).len(), book.len());
    }

    #[test]
    fn test_stored_filter_drives_visible_list() {
        let mut book = book(8);
        for _ in 0..30 {
            book.synthesize(now());
        }
        let id = book.alerts()[0].id.clone();
        book.acknowledge(&id);
        book.set_show_acknowledged(false);
        assert!(book.visible().iter().all(|a| a.id != id));
        let filter = book.set_severity_filter(SeverityFilter::Low);
        assert_eq!(filter, AlertFilter { severity: SeverityFilter::Low, show_acknowledged: false });
        assert!(book.visible().iter().all(|a| a.severity == Severity::Low));
    }

    #[test]
    fn test_summary_is_derived_from_collection() {
        let seeds = AlertsConf::default().initial;
        let mut book = book(9).with_seeds(&seeds, now());
        assert_eq!(book.alerts()[0].id, "ALT-001");
        let summary = book.summary();
        assert_eq!(summary.critical_active, 1);
        assert_eq!(summary.warning_open, 1);
        assert_eq!(summary.info, 1);
        assert_eq!(summary.resolved, 2);
        assert_eq!(summary.unacknowledged_active, 1);
        assert!(AlertCategory::ALL
            .iter()
            .all(|c| book.alerts().iter().any(|a| a.category == *c)));
        let battery = book.get("ALT-003").unwrap();
        assert_eq!((battery.severity, battery.category), (Severity::Low, AlertCategory::System));

        book.resolve("ALT-001");
        let summary = book.summary();
        assert_eq!(summary.critical_active, 0);
        assert_eq!(summary.resolved, 3);
        assert_eq!(summary.unacknowledged_active, 0);

        let next = book.synthesize(now());
        assert_eq!(next.id, format!("ALT-{:03}", seeds.len() + 1));
    }

    #[test]
    fn test_synthesis_rate_tracks_probability() {
        let mut book = book(10);
        let raised = (0..10_000).filter_map(|_| book.maybe_synthesize(now())).count();
        assert!((2_700..=3_300).contains(&raised), "raised {raised}");

        let mut silent = AlertBook::new(0.0, StdRng::seed_from_u64(11));
        assert!((0..1_000).all(|_| silent.maybe_synthesize(now()).is_none()));
    }

    #[test]
    fn test_alert_serializes_for_presentation() {
        let mut book = book(12);
        let alert = book.synthesize(now());
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["timestamp"], "2026-10-16T12:00:00Z");
        assert!(matches!(json["severity"].as_str(), Some("low" | "medium" | "high")));
    }
}
