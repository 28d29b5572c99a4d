//! Device discovery: enumerate the vendor location, classify, publish.

use std::collections::HashMap;

use tracing::debug;
use tracing::info;

use crate::devices::Classification;
use crate::devices::DeviceCache;
use crate::devices::DeviceDescriptor;
use crate::devices::RecordSource;
use crate::devices::classify_camera;
use crate::devices::classify_device;
use crate::registry::DeviceRegistry;
use crate::vendor::Location;
use crate::vendor::VendorError;

/// Enumerate and classify every device at `location`, rebuild the cache's
/// identifier→feed index, and publish the full descriptor list to the host
/// registry in one full-replace batch.
///
/// Safe to re-invoke at any time; the index is rebuilt from scratch each
/// pass rather than patched. Skipped devices are logged at debug level and
/// never abort the pass. Vendor enumeration failures propagate; retry
/// belongs to the vendor client.
pub async fn discover(
    location: &dyn Location,
    cache: &DeviceCache,
    registry: &dyn DeviceRegistry,
) -> Result<Vec<DeviceDescriptor>, VendorError> {
    let mut index = HashMap::new();
    let mut descriptors = Vec::new();

    for camera in location.cameras() {
        match classify_camera(&camera.latest()) {
            Classification::Device(descriptor) => {
                index.insert(descriptor.id.clone(), RecordSource::Camera(camera));
                descriptors.push(descriptor);
            }
            Classification::Skip { id, reason } => {
                debug!("skipping camera {}: {}", id, reason);
            }
        }
    }

    for device in location.fetch_devices().await? {
        match classify_device(&device.latest()) {
            Classification::Device(descriptor) => {
                index.insert(descriptor.id.clone(), RecordSource::Device(device));
                descriptors.push(descriptor);
            }
            Classification::Skip { id, reason } => {
                debug!("skipping device {}: {}", id, reason);
            }
        }
    }

    cache.rebuild_index(index);
    registry.replace_devices(location.id(), &descriptors);

    info!(
        "discovered {} devices at location {}",
        descriptors.len(),
        location.id()
    );
    Ok(descriptors)
}
