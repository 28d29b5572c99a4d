//! Boundary to the host device registry.

use tracing::debug;
use tracing::info;

use crate::devices::DeviceDescriptor;

/// Host-side registry that turns descriptors into platform device objects.
///
/// `replace_devices` has full-replace semantics: every call carries the
/// complete descriptor set for the location, never an incremental patch.
pub trait DeviceRegistry: Send + Sync {
    fn replace_devices(&self, location_id: &str, devices: &[DeviceDescriptor]);
}

/// Registry that just logs the published set. Used by the demo binary.
#[derive(Debug, Default)]
pub struct LoggingRegistry;

impl DeviceRegistry for LoggingRegistry {
    fn replace_devices(&self, location_id: &str, devices: &[DeviceDescriptor]) {
        info!(
            "registry: publishing {} devices for location {}",
            devices.len(),
            location_id
        );
        for device in devices {
            debug!(
                "registry: {} '{}' ({}, capabilities: {:?})",
                device.id, device.name, device.kind, device.capabilities
            );
        }
    }
}

/// Recording registry for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    batches: std::sync::Mutex<Vec<(String, Vec<DeviceDescriptor>)>>,
}

#[cfg(test)]
impl RecordingRegistry {
    /// Every batch published so far, oldest first.
    pub fn batches(&self) -> Vec<(String, Vec<DeviceDescriptor>)> {
        self.batches.lock().expect("batch log poisoned").clone()
    }
}

#[cfg(test)]
impl DeviceRegistry for RecordingRegistry {
    fn replace_devices(&self, location_id: &str, devices: &[DeviceDescriptor]) {
        self.batches
            .lock()
            .expect("batch log poisoned")
            .push((location_id.to_string(), devices.to_vec()));
    }
}
