//! On-board sensor suite health and the health panel's comm indicator.

use crate::config::SubsystemsConf;
use crate::link::LinkStatus;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    #[default]
    Online,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensor {
    pub id: String,
    pub name: String,
    pub status: SensorStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubsystemsView {
    pub sensors: Vec<Sensor>,
    pub comm_status: LinkStatus,
}

pub struct SubsystemMonitor {
    sensors: Vec<Sensor>,
    comm_status: LinkStatus,
    refresh_probability: f64,
    warning_probability: f64,
    comm_warning_probability: f64,
    rng: StdRng,
}

impl SubsystemMonitor {
    pub fn new(conf: &SubsystemsConf, rng: StdRng) -> Self {
        Self {
            sensors: conf
                .sensors
                .iter()
                .map(|s| Sensor {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    status: SensorStatus::Online,
                })
                .collect(),
            comm_status: LinkStatus::Online,
            refresh_probability: conf.refresh_probability,
            warning_probability: conf.warning_probability,
            comm_warning_probability: conf.comm_warning_probability,
            rng,
        }
    }

    fn roll(&mut self, probability: f64) -> bool {
        self.rng.gen::<f64>() > 1.0 - probability
    }

    /// Comm indicator is re-drawn every tick; the sensor suite only sometimes,
    /// and then every sensor at once.
    pub fn tick(&mut self) -> SubsystemsView {
        self.comm_status = if self.roll(self.comm_warning_probability) {
            LinkStatus::Warning
        } else {
            LinkStatus::Online
        };
        if self.roll(self.refresh_probability) {
            for i in 0..self.sensors.len() {
                let status = if self.roll(self.warning_probability) {
                    SensorStatus::Warning
                } else {
                    SensorStatus::Online
                };
                self.sensors[i].status = status;
            }
        }
        self.view()
    }

    pub fn view(&self) -> SubsystemsView {
        SubsystemsView { sensors: self.sensors.clone(), comm_status: self.comm_status }
    }
}
