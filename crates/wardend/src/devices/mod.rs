//! Local capability-typed device model.
//!
//! The vendor's taxonomy is far finer-grained than what the host registry
//! understands; [`classify`] collapses it into descriptors over the closed
//! [`DeviceKind`]/[`Capability`] sets, [`cache`] manages lazy instantiation,
//! and [`instance`] holds the live per-device adapters.

mod cache;
mod classify;
mod instance;

use serde::Deserialize;
use serde::Serialize;

pub use cache::DeviceCache;
pub use cache::DeviceError;
pub use cache::RecordSource;
pub use classify::Classification;
pub use classify::classify_camera;
pub use classify::classify_device;
pub(crate) use classify::is_contact_kind;
pub use instance::CameraDevice;
pub use instance::DeviceInstance;
pub use instance::LockDevice;
pub use instance::SensorDevice;

/// Identifier suffix for generic sensors, so one vendor identifier can back
/// several local roles.
pub const SENSOR_SUFFIX: &str = "-sensor";

/// Identifier suffix for locks.
pub const LOCK_SUFFIX: &str = "-lock";

/// Local device type, the closed set the host registry understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum DeviceKind {
    Camera,
    Doorbell,
    Sensor,
    Lock,
}

/// Behavioral role a device instance fulfils.
///
/// A descriptor's capability set is fully determined by the vendor record's
/// type tag plus its boolean feature flags; see [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Capability {
    Camera,
    MotionSensor,
    /// Real-time signaling session setup for live viewing.
    Signaling,
    VideoCamera,
    Intercom,
    VideoClips,
    Battery,
    /// Binary trigger fired on a doorbell press.
    DoorbellPress,
    LightAccessory,
    SirenAccessory,
    TamperSensor,
    EntrySensor,
    FloodSensor,
    Lock,
}

/// Vendor-reported hardware metadata carried on a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub firmware: Option<String>,
    pub serial: Option<String>,
}

/// Declarative record a discovery pass produces for one local device,
/// independent of any live instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Stable local identifier: the vendor id, suffixed by role for
    /// sensors and locks.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    pub kind: DeviceKind,

    /// Ordered capability set, built in a fixed order so identical records
    /// always yield identical descriptors.
    pub capabilities: Vec<Capability>,

    pub metadata: DeviceMetadata,
}
