//! Capability classification: vendor record in, typed descriptor out.
//!
//! This is the single place the vendor taxonomy is collapsed into the local
//! capability model. Both entry points are pure and total: rules are
//! evaluated in order, first match wins, and identical inputs always yield
//! identical descriptors, which is what makes re-discovery idempotent.

use crate::vendor::BATTERY_NONE;
use crate::vendor::CameraRecord;
use crate::vendor::DeviceRecord;
use crate::vendor::STATUS_DISABLED;

use super::Capability;
use super::DeviceDescriptor;
use super::DeviceKind;
use super::DeviceMetadata;
use super::LOCK_SUFFIX;
use super::SENSOR_SUFFIX;

/// Outcome of classifying one vendor record.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Recognized device with its derived descriptor.
    Device(DeviceDescriptor),

    /// Recognized-but-unsupported or disabled device. Not an error: callers
    /// log it at diagnostic level and continue.
    Skip { id: String, reason: &'static str },
}

/// Contact-family sensors all map to the entry-sensor capability set, and
/// are the only devices eligible for night-mode bypass lists.
pub(crate) fn is_contact_kind(kind: &str) -> bool {
    matches!(kind, "contact-sensor" | "retrofit-zone" | "tilt-sensor")
}

fn is_flood_kind(kind: &str) -> bool {
    matches!(kind, "flood-freeze-sensor" | "water-sensor")
}

/// "lock" as a whole token or dotted prefix, e.g. `lock` or `lock.v2`.
fn is_lock_kind(kind: &str) -> bool {
    kind == "lock" || kind.starts_with("lock.")
}

fn device_metadata(record: &DeviceRecord) -> DeviceMetadata {
    DeviceMetadata {
        model: record.model.clone(),
        manufacturer: record.manufacturer.clone(),
        firmware: record.firmware.clone(),
        serial: record.serial.clone(),
    }
}

fn camera_metadata(record: &CameraRecord) -> DeviceMetadata {
    DeviceMetadata {
        model: record.model.clone(),
        manufacturer: record.manufacturer.clone(),
        firmware: record.firmware.clone(),
        serial: record.serial.clone(),
    }
}

/// Classify one camera-family record.
pub fn classify_camera(record: &CameraRecord) -> Classification {
    if record.status == STATUS_DISABLED {
        return Classification::Skip {
            id: record.id.clone(),
            reason: "disabled by account owner",
        };
    }

    let kind = if record.doorbell {
        DeviceKind::Doorbell
    } else {
        DeviceKind::Camera
    };

    let mut capabilities = vec![
        Capability::Camera,
        Capability::MotionSensor,
        Capability::Signaling,
    ];

    // Edge-processed cameras expose no cloud stream, talkback, or clip
    // history.
    if !record.edge_processed {
        capabilities.push(Capability::VideoCamera);
        capabilities.push(Capability::Intercom);
        capabilities.push(Capability::VideoClips);
    }
    if record.battery_operated {
        capabilities.push(Capability::Battery);
    }
    if record.doorbell {
        capabilities.push(Capability::DoorbellPress);
    }
    if record.has_light {
        capabilities.push(Capability::LightAccessory);
    }
    if record.has_siren {
        capabilities.push(Capability::SirenAccessory);
    }

    Classification::Device(DeviceDescriptor {
        id: record.id.clone(),
        name: record.name.clone(),
        kind,
        capabilities,
        metadata: camera_metadata(record),
    })
}

/// Classify one generic (non-camera) record.
pub fn classify_device(record: &DeviceRecord) -> Classification {
    if record.status == STATUS_DISABLED {
        return Classification::Skip {
            id: record.id.clone(),
            reason: "disabled by account owner",
        };
    }

    let (kind, suffix, mut capabilities) = if is_contact_kind(&record.kind) {
        (
            DeviceKind::Sensor,
            SENSOR_SUFFIX,
            vec![Capability::TamperSensor, Capability::EntrySensor],
        )
    } else if record.kind == "motion-sensor" {
        (
            DeviceKind::Sensor,
            SENSOR_SUFFIX,
            vec![Capability::TamperSensor, Capability::MotionSensor],
        )
    } else if is_flood_kind(&record.kind) {
        (
            DeviceKind::Sensor,
            SENSOR_SUFFIX,
            vec![Capability::TamperSensor, Capability::FloodSensor],
        )
    } else if is_lock_kind(&record.kind) {
        (DeviceKind::Lock, LOCK_SUFFIX, vec![Capability::Lock])
    } else {
        return Classification::Skip {
            id: record.id.clone(),
            reason: "unsupported device type",
        };
    };

    if record.battery_status != BATTERY_NONE {
        capabilities.push(Capability::Battery);
    }

    Classification::Device(DeviceDescriptor {
        id: format!("{}{}", record.id, suffix),
        name: record.name.clone(),
        kind,
        capabilities,
        metadata: device_metadata(record),
    })
}
