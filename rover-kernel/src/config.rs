/**
 * MISSION CONFIG - Configuration of every simulated stream
 *
 * ROLE: Loads `mission.yaml` (path overridable with ROVER_KERNEL_CONFIG) and
 * validates it before anything starts. A missing file means the built-in
 * catalogue below; a broken or inconsistent file is an error.
 *
 * The defaults reproduce the rover dashboard: environment metrics every 2s,
 * system health every 3s, telemetry strips every 4s, link every 5s, alert
 * synthesis every 30s, rover motion every 200ms.
 */

use crate::alerts::{AlertCategory, AlertSeed, AlertStatus, Severity};
use crate::error::ConfigError;
use crate::history::HistoryOrder;
use crate::navigation::{Obstacle, ObstacleKind, Position};
use crate::trend::Trend;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

pub const CONFIG_ENV: &str = "ROVER_KERNEL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "mission.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    /// Master seed; every component derives its own stream from it.
    pub seed: Option<u64>,
    pub http: HttpConf,
    pub mqtt: Option<MqttConf>,
    pub metrics: Vec<MetricConfig>,
    pub alerts: AlertsConf,
    pub link: LinkConf,
    pub navigation: NavigationConf,
    pub subsystems: SubsystemsConf,
    pub events: EventsConf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConf {
    pub bind: SocketAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConf {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_publish_interval")]
    pub publish_interval_secs: u64,
}

fn default_topic() -> String {
    "rover/telemetry/snapshot@v1".into()
}

fn default_publish_interval() -> u64 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub initial: f64,
    pub step_scale: f64,
    pub period_ms: u64,
    pub history_capacity: usize,
    #[serde(default)]
    pub history_order: HistoryOrder,
    #[serde(default = "default_reroll")]
    pub trend_reroll_probability: f64,
    #[serde(default)]
    pub initial_trend: Trend,
    #[serde(default)]
    pub nominal: Option<NominalBand>,
}

fn default_reroll() -> f64 {
    0.2
}

/// Range a reading is expected to sit in; outside it the metric reads `caution`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NominalBand {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConf {
    pub period_ms: u64,
    pub synthesis_probability: f64,
    pub initial: Vec<AlertSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConf {
    pub period_ms: u64,
    pub change_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConf {
    pub start: Position,
    pub target: Position,
    pub step: f64,
    pub arrival_threshold: f64,
    pub period_ms: u64,
    pub obstacles: Vec<Obstacle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsystemsConf {
    pub period_ms: u64,
    pub refresh_probability: f64,
    pub warning_probability: f64,
    pub comm_warning_probability: f64,
    pub sensors: Vec<SensorConf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConf {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConf {
    pub period_ms: u64,
    pub capacity: usize,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            http: HttpConf::default(),
            mqtt: None,
            metrics: default_metrics(),
            alerts: AlertsConf::default(),
            link: LinkConf::default(),
            navigation: NavigationConf::default(),
            subsystems: SubsystemsConf::default(),
            events: EventsConf::default(),
        }
    }
}

impl Default for HttpConf {
    fn default() -> Self {
        Self { bind: SocketAddr::from(([0, 0, 0, 0], 8080)) }
    }
}

impl Default for LinkConf {
    fn default() -> Self {
        Self { period_ms: 5_000, change_probability: 0.2 }
    }
}

impl Default for EventsConf {
    fn default() -> Self {
        Self { period_ms: 4_000, capacity: 10 }
    }
}

impl Default for AlertsConf {
    fn default() -> Self {
        Self {
            period_ms: 30_000,
            synthesis_probability: 0.3,
            initial: vec![
                AlertSeed {
                    age_secs: 3_600,
                    severity: Severity::High,
                    category: AlertCategory::Environmental,
                    title: "Temperature Spike Detected".into(),
                    description: "Rover temperature exceeded safe operating limits in Sector C2"
                        .into(),
                    location: "Sector C2".into(),
                    status: AlertStatus::Active,
                    acknowledged: false,
                },
                AlertSeed {
                    age_secs: 7_200,
                    severity: Severity::Medium,
                    category: AlertCategory::Navigation,
                    title: "Obstacle Detection".into(),
                    description: "Large boulder blocking planned route to waypoint Delta-7".into(),
                    location: "Grid 45.2, 67.8".into(),
                    status: AlertStatus::Resolved,
                    acknowledged: true,
                },
                AlertSeed {
                    age_secs: 14_400,
                    severity: Severity::Low,
                    category: AlertCategory::System,
                    title: "Battery Optimization".into(),
                    description: "Power consumption 15% above normal during sample analysis".into(),
                    location: "Sector A1".into(),
                    status: AlertStatus::Monitoring,
                    acknowledged: true,
                },
                AlertSeed {
                    age_secs: 21_600,
                    severity: Severity::High,
                    category: AlertCategory::Communication,
                    title: "Signal Interference".into(),
                    description: "Communication link unstable due to solar storm activity".into(),
                    location: "All Sectors".into(),
                    status: AlertStatus::Resolved,
                    acknowledged: true,
                },
                AlertSeed {
                    age_secs: 28_800,
                    severity: Severity::Medium,
                    category: AlertCategory::Environmental,
                    title: "Dust Storm Warning".into(),
                    description: "Approaching dust storm may affect visibility and sensors".into(),
                    location: "Sector D3-F1".into(),
                    status: AlertStatus::Monitoring,
                    acknowledged: false,
                },
            ],
        }
    }
}

impl Default for NavigationConf {
    fn default() -> Self {
        Self {
            start: Position { x: 45.0, y: 30.0 },
            target: Position { x: 75.0, y: 65.0 },
            step: 0.5,
            arrival_threshold: 2.0,
            period_ms: 200,
            obstacles: vec![
                Obstacle { position: Position { x: 60.0, y: 40.0 }, kind: ObstacleKind::Crater },
                Obstacle { position: Position { x: 50.0, y: 55.0 }, kind: ObstacleKind::Rock },
                Obstacle { position: Position { x: 70.0, y: 25.0 }, kind: ObstacleKind::Slope },
            ],
        }
    }
}

impl Default for SubsystemsConf {
    fn default() -> Self {
        let sensor = |id: &str, name: &str| SensorConf { id: id.into(), name: name.into() };
        Self {
            period_ms: 3_000,
            refresh_probability: 0.15,
            warning_probability: 0.2,
            comm_warning_probability: 0.1,
            sensors: vec![
                sensor("lidar", "LiDAR"),
                sensor("imu", "IMU"),
                sensor("camera", "RGB-D Camera"),
                sensor("arm", "Robotic Arm"),
            ],
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn metric(
    name: &str,
    group: &str,
    unit: &str,
    (min, max): (f64, f64),
    initial: f64,
    step_scale: f64,
    period_ms: u64,
    history: (usize, HistoryOrder),
    nominal: Option<(f64, f64)>,
) -> MetricConfig {
    MetricConfig {
        name: name.into(),
        group: group.into(),
        unit: unit.into(),
        min,
        max,
        initial,
        step_scale,
        period_ms,
        history_capacity: history.0,
        history_order: history.1,
        trend_reroll_probability: default_reroll(),
        initial_trend: Trend::Stable,
        nominal: nominal.map(|(low, high)| NominalBand { low, high }),
    }
}

/// Sensor catalogue of the rover dashboard.
#[rustfmt::skip]
pub fn default_metrics() -> Vec<MetricConfig> {
    use HistoryOrder::{NewestFirst, OldestFirst};
    let panel = (20, OldestFirst);
    let strip = (30, NewestFirst);
    vec![
        metric("temperature", "environment", "°C", (-60.0, -20.0), -45.2, 2.0, 2_000, panel, Some((-55.0, -30.0))),
        metric("pressure", "environment", "kPa", (0.08, 0.2), 0.12, 0.02, 2_000, panel, Some((0.09, 0.16))),
        metric("dustIndex", "environment", "", (0.0, 100.0), 23.5, 5.0, 2_000, panel, Some((0.0, 60.0))),
        metric("o2Level", "environment", "%", (0.0, 21.0), 0.0, 0.1, 2_000, panel, None),
        metric("batteryLevel", "system", "%", (0.0, 100.0), 94.0, 2.0, 3_000, panel, Some((20.0, 100.0))),
        metric("cpuUsage", "system", "%", (0.0, 100.0), 45.0, 10.0, 3_000, panel, Some((0.0, 80.0))),
        metric("signalStrength", "system", "%", (0.0, 100.0), 87.0, 5.0, 3_000, panel, Some((30.0, 100.0))),
        metric("telemetryTemperature", "telemetry", "°C", (-60.0, -20.0), -40.0, 10.0, 4_000, strip, None),
        metric("telemetryO2", "telemetry", "%", (0.0, 0.1), 0.05, 0.1, 4_000, strip, None),
    ]
}

impl MetricConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let stream = || self.name.clone();
        for (field, value) in [("min", self.min), ("max", self.max), ("initial", self.initial)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { stream: stream(), field });
            }
        }
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                stream: stream(),
                min: self.min,
                max: self.max,
            });
        }
        if self.initial < self.min || self.initial > self.max {
            return Err(ConfigError::InitialOutOfRange {
                stream: stream(),
                value: self.initial,
                min: self.min,
                max: self.max,
            });
        }
        if self.step_scale.is_nan() || self.step_scale < 0.0 {
            return Err(ConfigError::InvalidStep { stream: stream(), step: self.step_scale });
        }
        if !self.step_scale.is_finite() {
            return Err(ConfigError::NonFinite { stream: stream(), field: "step_scale" });
        }
        check_period(&self.name, self.period_ms)?;
        if self.history_capacity == 0 {
            return Err(ConfigError::NonPositiveCapacity { stream: stream() });
        }
        check_probability(&self.name, "trend_reroll_probability", self.trend_reroll_probability)?;
        if let Some(band) = self.nominal {
            let inside = |v: f64| v.is_finite() && v >= self.min && v <= self.max;
            if !inside(band.low) || !inside(band.high) || band.low > band.high {
                return Err(ConfigError::InvalidNominalBand {
                    stream: stream(),
                    low: band.low,
                    high: band.high,
                });
            }
        }
        Ok(())
    }
}

impl MissionConfig {
    /// Checks every stream; the first violation wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for metric in &self.metrics {
            metric.validate()?;
            if !names.insert(metric.name.as_str()) {
                return Err(ConfigError::DuplicateMetric(metric.name.clone()));
            }
        }

        check_period("alerts", self.alerts.period_ms)?;
        check_probability("alerts", "synthesis_probability", self.alerts.synthesis_probability)?;

        check_period("link", self.link.period_ms)?;
        check_probability("link", "change_probability", self.link.change_probability)?;

        let nav = &self.navigation;
        check_period("navigation", nav.period_ms)?;
        let coords = [nav.start.x, nav.start.y, nav.target.x, nav.target.y];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::NonFinite { stream: "navigation".into(), field: "position" });
        }
        if !(nav.step.is_finite() && nav.step > 0.0) {
            return Err(ConfigError::InvalidNavigation(format!(
                "step must be positive, got {}",
                nav.step
            )));
        }
        if !(nav.arrival_threshold.is_finite() && nav.arrival_threshold > 0.0) {
            return Err(ConfigError::InvalidNavigation(format!(
                "arrival threshold must be positive, got {}",
                nav.arrival_threshold
            )));
        }

        let subsystems = &self.subsystems;
        check_period("subsystems", subsystems.period_ms)?;
        check_probability("subsystems", "refresh_probability", subsystems.refresh_probability)?;
        check_probability("subsystems", "warning_probability", subsystems.warning_probability)?;
        check_probability(
            "subsystems",
            "comm_warning_probability",
            subsystems.comm_warning_probability,
        )?;

        check_period("events", self.events.period_ms)?;
        if self.events.capacity == 0 {
            return Err(ConfigError::NonPositiveCapacity { stream: "events".into() });
        }

        if let Some(mqtt) = &self.mqtt {
            if mqtt.publish_interval_secs == 0 {
                return Err(ConfigError::NonPositivePeriod { stream: "mqtt".into() });
            }
        }
        Ok(())
    }
}

fn check_period(stream: &str, period_ms: u64) -> Result<(), ConfigError> {
    if period_ms == 0 {
        return Err(ConfigError::NonPositivePeriod { stream: stream.into() });
    }
    Ok(())
}

fn check_probability(stream: &str, field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidProbability { stream: stream.into(), field, value });
    }
    Ok(())
}

pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into())
        .into()
}

/// Reads and validates the mission config. A missing or empty file yields the
/// defaults; anything unparseable or invalid is returned as an error.
pub async fn load_config(path: &Path) -> Result<MissionConfig, ConfigError> {
    let config = if path.exists() {
        let txt = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        if txt.trim().is_empty() {
            MissionConfig::default()
        } else {
            serde_yaml::from_str(&txt)?
        }
    } else {
        tracing::warn!("[config] no {} found, using built-in mission profile", path.display());
        MissionConfig::default()
    };
    config.validate()?;
    Ok(config)
}
