//! Simulated metric streams.
//!
//! Each metric owns its value, trend, history and random source. A tick runs
//! walk → history push → trend re-roll in one step, and the resulting
//! [`MetricView`] is what gets published. Every metric has its own period;
//! [`MetricStreams::spawn`] gives each one a dedicated timer.

use crate::config::MetricConfig;
use crate::error::ConfigError;
use crate::history::{History, HistoryOrder};
use crate::read_model::SharedReadModel;
use crate::scheduler::PeriodicTask;
use crate::state::component_rng;
use crate::trend::{self, Trend};
use crate::walk;
use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    #[default]
    Nominal,
    Caution,
}

/// Read-only projection of one metric, published atomically per tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricView {
    pub name: String,
    pub group: String,
    pub unit: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub trend: Trend,
    pub status: MetricStatus,
    pub history: Vec<f64>,
    pub history_order: HistoryOrder,
    pub history_capacity: usize,
    pub ticks: u64,
}

#[derive(Debug)]
pub struct Metric {
    config: MetricConfig,
    value: f64,
    trend: Trend,
    history: History,
    ticks: u64,
    rng: StdRng,
}

impl Metric {
    pub fn new(config: MetricConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.history_capacity)
            .ok_or_else(|| ConfigError::NonPositiveCapacity { stream: config.name.clone() })?;
        let mut history = History::new(capacity, config.history_order);
        history.push(config.initial);
        Ok(Self {
            value: config.initial,
            trend: config.initial_trend,
            history,
            ticks: 0,
            config,
            rng,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn period(&self) -> Duration {
        self.config.period()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tick(&mut self) -> MetricView {
        let cfg = &self.config;
        self.value = walk::next_value(&mut self.rng, self.value, cfg.min, cfg.max, cfg.step_scale);
        self.history.push(self.value);
        self.trend = trend::classify(self.trend, &mut self.rng, cfg.trend_reroll_probability);
        self.ticks += 1;
        self.view()
    }

    pub fn status(&self) -> MetricStatus {
        match self.config.nominal {
            Some(band) if self.value < band.low || self.value > band.high => MetricStatus::Caution,
            _ => MetricStatus::Nominal,
        }
    }

    pub fn view(&self) -> MetricView {
        MetricView {
            name: self.config.name.clone(),
            group: self.config.group.clone(),
            unit: self.config.unit.clone(),
            value: self.value,
            min: self.config.min,
            max: self.config.max,
            trend: self.trend,
            status: self.status(),
            history: self.history.snapshot(),
            history_order: self.history.order(),
            history_capacity: self.history.capacity(),
            ticks: self.ticks,
        }
    }
}

/// Named metrics, each with its own cadence.
#[derive(Debug, Default)]
pub struct MetricStreams {
    metrics: BTreeMap<String, Metric>,
}

impl MetricStreams {
    pub fn new(configs: &[MetricConfig], seed: Option<u64>) -> Result<Self, ConfigError> {
        let mut metrics = BTreeMap::new();
        for config in configs {
            if metrics.contains_key(&config.name) {
                return Err(ConfigError::DuplicateMetric(config.name.clone()));
            }
            let rng = component_rng(seed, &format!("metric:{}", config.name));
            metrics.insert(config.name.clone(), Metric::new(config.clone(), rng)?);
        }
        Ok(Self { metrics })
    }

    /// Advances one metric. Unknown names are ignored.
    pub fn tick(&mut self, name: &str) -> Option<MetricView> {
        self.metrics.get_mut(name).map(Metric::tick)
    }

    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.metrics.get(name)
    }

    pub fn views(&self) -> Vec<MetricView> {
        self.metrics.values().map(Metric::view).collect()
    }

    pub fn cadences(&self) -> Vec<(String, Duration)> {
        self.metrics
            .values()
            .map(|m| (m.name().to_string(), m.period()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Hands every metric to its own periodic task. Each task is the sole owner
    /// of its metric and republishes the metric's view after every tick.
    pub fn spawn(self, read_model: SharedReadModel) -> Vec<PeriodicTask> {
        self.metrics
            .into_values()
            .map(|mut metric| {
                read_model.publish_metric(metric.view());
                let read_model = read_model.clone();
                let name = format!("metric:{}", metric.name());
                debug!("[metrics] scheduling {} every {:?}", name, metric.period());
                PeriodicTask::spawn(name, metric.period(), move || {
                    read_model.publish_metric(metric.tick());
                })
            })
            .collect()
    }
}
