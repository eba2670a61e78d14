//! Telemetry simulation and alert lifecycle engine behind the rover mission dashboard.
//!
//! [`dashboard::Dashboard`] wires every simulated stream to its own periodic task.
//! Consumers read through the [`read_model::ReadModel`] and send operator actions
//! through [`dashboard::AlertHandle`].

pub mod alerts;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod health;
pub mod history;
pub mod http;
pub mod link;
pub mod metrics;
pub mod navigation;
pub mod read_model;
pub mod scheduler;
pub mod state;
pub mod subsystems;
pub mod trend;
pub mod walk;
