//! Rover motion toward a fixed target in percentage-space coordinates.
//!
//! Each tick advances a fixed step along the unit vector to the target until
//! the remaining distance drops to the arrival threshold; from then on the
//! position is frozen.

use crate::config::NavigationConf;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn distance_to(self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Crater,
    Rock,
    Slope,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    #[serde(flatten)]
    pub position: Position,
    #[serde(rename = "type")]
    pub kind: ObstacleKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavigationView {
    pub position: Position,
    pub target: Position,
    pub obstacles: Vec<Obstacle>,
    pub distance_to_target: f64,
    /// Bearing to the target, clockwise from north (decreasing y).
    pub heading_deg: f64,
    pub arrived: bool,
    pub eta_seconds: f64,
}

pub struct Navigator {
    position: Position,
    target: Position,
    step: f64,
    arrival_threshold: f64,
    period: Duration,
    obstacles: Vec<Obstacle>,
    arrived: bool,
}

impl Navigator {
    pub fn new(conf: &NavigationConf) -> Self {
        let arrived = conf.start.distance_to(conf.target) <= conf.arrival_threshold;
        Self {
            position: conf.start,
            target: conf.target,
            step: conf.step,
            arrival_threshold: conf.arrival_threshold,
            period: Duration::from_millis(conf.period_ms),
            obstacles: conf.obstacles.clone(),
            arrived,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn arrived(&self) -> bool {
        self.arrived
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn distance_to_target(&self) -> f64 {
        self.position.distance_to(self.target)
    }

    /// Moves one step; returns whether the rover moved.
    pub fn tick(&mut self) -> bool {
        let distance = self.distance_to_target();
        if distance <= self.arrival_threshold {
            return false;
        }
        // never step past the target itself
        let advance = self.step.min(distance);
        self.position.x += (self.target.x - self.position.x) / distance * advance;
        self.position.y += (self.target.y - self.position.y) / distance * advance;
        if !self.arrived && self.distance_to_target() <= self.arrival_threshold {
            self.arrived = true;
            info!(
                "[navigation] rover arrived near target ({:.1}, {:.1})",
                self.target.x, self.target.y
            );
        }
        true
    }

    pub fn heading_deg(&self) -> f64 {
        let dx = self.target.x - self.position.x;
        let dy = self.target.y - self.position.y;
        if dx == 0.0 && dy == 0.0 {
            return 0.0;
        }
        dx.atan2(-dy).to_degrees().rem_euclid(360.0)
    }

    pub fn eta_seconds(&self) -> f64 {
        let remaining = self.distance_to_target() - self.arrival_threshold;
        if remaining <= 0.0 {
            return 0.0;
        }
        (remaining / self.step).ceil() * self.period.as_secs_f64()
    }

    pub fn view(&self) -> NavigationView {
        NavigationView {
            position: self.position,
            target: self.target,
            obstacles: self.obstacles.clone(),
            distance_to_target: self.distance_to_target(),
            heading_deg: self.heading_deg(),
            arrived: self.arrived,
            eta_seconds: self.eta_seconds(),
        }
    }
}
