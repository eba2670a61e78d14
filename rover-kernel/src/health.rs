use crate::config::MqttConf;
use crate::read_model::{ReadModel, SharedReadModel};
use crate::scheduler::PeriodicTask;
use parking_lot::Mutex;
use rumqttc::{AsyncClient, ClientError, Event, Incoming, MqttOptions, QoS};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct KernelHealth {
    pub uptime_seconds: u64,
    pub session_id: Uuid,
    pub running_tasks: u32,
    pub memory_usage_mb: f32,
    pub mqtt_status: String,
    pub mqtt_reconnects: u32,
}

#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    mqtt_reconnects: Arc<AtomicU32>,
    mqtt_status: Arc<Mutex<String>>,
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            mqtt_reconnects: Arc::new(AtomicU32::new(0)),
            mqtt_status: Arc::new(Mutex::new("disabled".to_string())),
        }
    }

    pub fn mark_mqtt_connecting(&self) {
        *self.mqtt_status.lock() = "connecting".to_string();
    }

    pub fn mark_mqtt_connected(&self) {
        *self.mqtt_status.lock() = "connected".to_string();
    }

    pub fn increment_reconnects(&self) {
        self.mqtt_reconnects.fetch_add(1, Ordering::Relaxed);
        *self.mqtt_status.lock() = "reconnecting".to_string();
    }

    pub fn mqtt_status(&self) -> String {
        self.mqtt_status.lock().clone()
    }

    pub fn get_health(&self, read_model: &ReadModel, running_tasks: usize) -> KernelHealth {
        KernelHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            session_id: read_model.session_id(),
            running_tasks: u32::try_from(running_tasks).unwrap_or(u32::MAX),
            memory_usage_mb: get_memory_usage_mb(),
            mqtt_status: self.mqtt_status(),
            mqtt_reconnects: self.mqtt_reconnects.load(Ordering::Relaxed),
        }
    }
}

/// JSON body published on the snapshot topic.
pub fn snapshot_payload(read_model: &ReadModel) -> Result<String, serde_json::Error> {
    serde_json::to_string(&read_model.snapshot())
}

const REQUEST_QUEUE: usize = 10;

/// Queues one snapshot without waiting. While the broker is unreachable the
/// request queue fills up; the snapshot is then dropped so the event loop keeps
/// being polled and reconnecting.
fn publish_snapshot(client: &AsyncClient, topic: &str, read_model: &ReadModel) {
    let payload = match snapshot_payload(read_model) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("[mqtt] failed to serialize snapshot: {}", e);
            return;
        }
    };
    match client.try_publish(topic, QoS::AtLeastOnce, false, payload) {
        Ok(()) => debug!("[mqtt] queued snapshot"),
        Err(ClientError::TryRequest(_)) => debug!("[mqtt] request queue full, snapshot dropped"),
        Err(e) => warn!("[mqtt] failed to publish snapshot: {:?}", e),
    }
}

/// Publishes the dashboard snapshot over MQTT every `publish_interval_secs`.
/// Outbound only: nothing is subscribed to.
pub fn spawn_snapshot_publisher(
    conf: MqttConf,
    read_model: SharedReadModel,
    health: HealthTracker,
) -> PeriodicTask {
    let period = Duration::from_secs(conf.publish_interval_secs);
    health.mark_mqtt_connecting();

    let handle = task::spawn(async move {
        let client_id = format!("rover-kernel-{}", read_model.session_id().simple());
        let mut opts = MqttOptions::new(client_id, &conf.host, conf.port);
        opts.set_keep_alive(Duration::from_secs(15));

        let (client, mut eventloop) = AsyncClient::new(opts, REQUEST_QUEUE);
        let mut interval = tokio::time::interval(period);
        info!(
            "[mqtt] publishing snapshots to {}:{} on {}",
            conf.host, conf.port, conf.topic
        );

        loop {
            tokio::select! {
                _ = interval.tick() => publish_snapshot(&client, &conf.topic, &read_model),
                event = eventloop.poll() => {
                    match event {
                        Ok(Event::Incoming(Incoming::ConnAck(_))) => health.mark_mqtt_connected(),
                        Ok(_) => {},
                        Err(e) => {
                            warn!("[mqtt] connection error: {:?}", e);
                            health.increment_reconnects();
                            tokio::time::sleep(Duration::from_secs(2)).await;
                        }
                    }
                }
            }
        }
    });

    PeriodicTask::from_handle("mqtt-publisher", period, handle)
}

fn get_memory_usage_mb() -> f32 {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            let rss_kb = status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<u64>().ok());
            if let Some(kb) = rss_kb {
                return kb as f32 / 1024.0;
            }
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkStatus;

    #[test]
    fn test_health_reports_publisher_state() {
        let tracker = HealthTracker::new();
        let read_model = ReadModel::new();
        let health = tracker.get_health(&read_model, 4);
        assert_eq!(health.mqtt_status, "disabled");
        assert_eq!(health.running_tasks, 4);
        assert_eq!(health.session_id, read_model.session_id());

        tracker.mark_mqtt_connecting();
        tracker.increment_reconnects();
        tracker.increment_reconnects();
        let health = tracker.get_health(&read_model, 4);
        assert_eq!(health.mqtt_status, "reconnecting");
        assert_eq!(health.mqtt_reconnects, 2);

        tracker.mark_mqtt_connected();
        assert_eq!(tracker.mqtt_status(), "connected");
    }

    #[test]
    fn test_snapshot_payload_is_json() {
        let read_model = ReadModel::new();
        read_model.publish_link(LinkStatus::Warning);
        let payload = snapshot_payload(&read_model).unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(json["link_status"], "warning");
        assert_eq!(json["session_id"], read_model.session_id().to_string());
    }

    #[tokio::test(start_paused = true)]
    async fn test_publisher_keeps_reconnecting_while_broker_is_down() {
        // grab a free port, then close it so every connect is refused
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let conf = MqttConf {
            host: "127.0.0.1".into(),
            port,
            topic: "rover/test".into(),
            publish_interval_secs: 1,
        };
        let tracker = HealthTracker::new();
        let _publisher = spawn_snapshot_publisher(conf, ReadModel::shared(), tracker.clone());

        // well past the point where ten queued snapshots fill the request queue
        tokio::time::sleep(Duration::from_secs(30)).await;
        let early = tracker.get_health(&ReadModel::new(), 0).mqtt_reconnects;
        tokio::time::sleep(Duration::from_secs(30)).await;
        let late = tracker.get_health(&ReadModel::new(), 0).mqtt_reconnects;

        assert!(early >= 1);
        assert!(late > early, "reconnects stalled at {early}");
        assert_eq!(tracker.mqtt_status(), "reconnecting");
    }
}
