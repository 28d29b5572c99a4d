//! Live local device instances.
//!
//! One instance exists per identifier for the controller's lifetime,
//! created lazily by [`super::DeviceCache`]. Each variant subscribes to its
//! vendor record's telemetry stream at construction and exposes exactly the
//! fields its declared capabilities require; there is no explicit teardown,
//! dropping the instance drops the subscription.

use serde_json::json;
use tokio::sync::watch;

use crate::vendor::CameraFeed;
use crate::vendor::CameraRecord;
use crate::vendor::DeviceFeed;
use crate::vendor::DeviceRecord;

/// A live local device, dispatched over the identifier-suffix convention.
#[derive(Debug)]
pub enum DeviceInstance {
    Sensor(SensorDevice),
    Lock(LockDevice),
    Camera(CameraDevice),
}

impl DeviceInstance {
    /// Local identifier this instance was created for.
    pub fn id(&self) -> &str {
        match self {
            DeviceInstance::Sensor(d) => &d.id,
            DeviceInstance::Lock(d) => &d.id,
            DeviceInstance::Camera(d) => &d.id,
        }
    }

    /// Serialize the current state to JSON for the host.
    pub fn state_json(&self) -> serde_json::Value {
        match self {
            DeviceInstance::Sensor(d) => d.state_json(),
            DeviceInstance::Lock(d) => d.state_json(),
            DeviceInstance::Camera(d) => d.state_json(),
        }
    }
}

/// Generic sensor: entry, motion, or flood, plus tamper and battery.
#[derive(Debug)]
pub struct SensorDevice {
    id: String,
    rx: watch::Receiver<DeviceRecord>,
}

impl SensorDevice {
    pub(crate) fn new(id: String, feed: &DeviceFeed) -> Self {
        Self {
            id,
            rx: feed.subscribe(),
        }
    }

    pub fn faulted(&self) -> bool {
        self.rx.borrow().faulted
    }

    pub fn tampered(&self) -> bool {
        self.rx.borrow().tampered
    }

    pub fn flooded(&self) -> bool {
        self.rx.borrow().flooded
    }

    pub fn battery_low(&self) -> bool {
        self.rx.borrow().battery_status == "low"
    }

    fn state_json(&self) -> serde_json::Value {
        let record = self.rx.borrow();
        json!({
            "faulted": record.faulted,
            "tampered": record.tampered,
            "flooded": record.flooded,
            "battery_status": record.battery_status,
        })
    }
}

/// Door lock.
#[derive(Debug)]
pub struct LockDevice {
    id: String,
    rx: watch::Receiver<DeviceRecord>,
}

impl LockDevice {
    pub(crate) fn new(id: String, feed: &DeviceFeed) -> Self {
        Self {
            id,
            rx: feed.subscribe(),
        }
    }

    /// Bolt state as last reported ("locked"/"unlocked"/"jammed"), if any.
    pub fn locked(&self) -> Option<String> {
        self.rx.borrow().locked.clone()
    }

    fn state_json(&self) -> serde_json::Value {
        let record = self.rx.borrow();
        json!({
            "locked": record.locked,
            "battery_status": record.battery_status,
        })
    }
}

/// Camera or doorbell.
#[derive(Debug)]
pub struct CameraDevice {
    id: String,
    rx: watch::Receiver<CameraRecord>,
}

impl CameraDevice {
    pub(crate) fn new(id: String, feed: &CameraFeed) -> Self {
        Self {
            id,
            rx: feed.subscribe(),
        }
    }

    pub fn battery_level(&self) -> Option<u8> {
        self.rx.borrow().battery_level
    }

    fn state_json(&self) -> serde_json::Value {
        let record = self.rx.borrow();
        json!({
            "battery_level": record.battery_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_tracks_telemetry() {
        let mut record = DeviceRecord::new("1", "contact-sensor", "Front Door");
        let (tx, feed) = DeviceFeed::channel(record.clone());
        let sensor = SensorDevice::new("1-sensor".to_string(), &feed);

        assert!(!sensor.faulted());

        record.faulted = true;
        record.tampered = true;
        tx.send(record).unwrap();

        assert!(sensor.faulted());
        assert!(sensor.tampered());
    }

    #[test]
    fn test_sensor_state_json() {
        let mut record = DeviceRecord::new("1", "contact-sensor", "Front Door");
        record.battery_status = "full".to_string();
        let (_tx, feed) = DeviceFeed::channel(record);
        let instance = DeviceInstance::Sensor(SensorDevice::new("1-sensor".to_string(), &feed));

        let state = instance.state_json();
        assert_eq!(state["faulted"], false);
        assert_eq!(state["battery_status"], "full");
    }

    #[test]
    fn test_lock_tracks_bolt_state() {
        let mut record = DeviceRecord::new("2", "lock.v2", "Back Door");
        let (tx, feed) = DeviceFeed::channel(record.clone());
        let lock = LockDevice::new("2-lock".to_string(), &feed);

        assert_eq!(lock.locked(), None);

        record.locked = Some("locked".to_string());
        tx.send(record).unwrap();
        assert_eq!(lock.locked(), Some("locked".to_string()));
    }

    #[test]
    fn test_camera_battery_level() {
        let mut record = CameraRecord::new("cam-1", "Porch");
        record.battery_level = Some(67);
        let (_tx, feed) = CameraFeed::channel(record);
        let camera = CameraDevice::new("cam-1".to_string(), &feed);

        assert_eq!(camera.battery_level(), Some(67));
        assert_eq!(
            DeviceInstance::Camera(camera).state_json()["battery_level"],
            67
        );
    }

    #[test]
    fn test_instance_id_dispatch() {
        let (_tx, feed) = DeviceFeed::channel(DeviceRecord::new("1", "contact-sensor", "Door"));
        let instance = DeviceInstance::Sensor(SensorDevice::new("1-sensor".to_string(), &feed));
        assert_eq!(instance.id(), "1-sensor");
    }
}
