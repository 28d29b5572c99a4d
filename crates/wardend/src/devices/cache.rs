//! Device cache: at most one live instance per identifier.
//!
//! The identifier→feed index is rebuilt wholesale by every discovery pass;
//! instances are created lazily on first lookup and persist for the
//! controller's lifetime (re-discovery never evicts them, and release is a
//! deliberate no-op).

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use super::CameraDevice;
use super::DeviceInstance;
use super::LOCK_SUFFIX;
use super::LockDevice;
use super::SENSOR_SUFFIX;
use super::SensorDevice;
use crate::vendor::CameraFeed;
use crate::vendor::DeviceFeed;
use crate::vendor::DeviceRecord;

/// Backing vendor feed for one local identifier.
#[derive(Debug, Clone)]
pub enum RecordSource {
    Camera(CameraFeed),
    Device(DeviceFeed),
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The identifier is not in the index (never discovered, or removed by
    /// a later discovery pass).
    #[error("no vendor device backs identifier '{0}'")]
    UnknownDevice(String),
}

#[derive(Debug, Default)]
pub struct DeviceCache {
    /// identifier → backing vendor feed; written only by discovery.
    index: Mutex<HashMap<String, RecordSource>>,

    /// identifier → live instance; entries are never removed.
    instances: Mutex<HashMap<String, Arc<DeviceInstance>>>,
}

impl DeviceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self) -> MutexGuard<'_, HashMap<String, RecordSource>> {
        self.index.lock().expect("device index lock poisoned")
    }

    fn instances(&self) -> MutexGuard<'_, HashMap<String, Arc<DeviceInstance>>> {
        self.instances.lock().expect("device instance lock poisoned")
    }

    /// Replace the identifier→feed index with the result of a discovery
    /// pass. Existing instances are untouched.
    pub(crate) fn rebuild_index(&self, entries: HashMap<String, RecordSource>) {
        *self.index() = entries;
    }

    /// Get the instance for `id`, constructing it on first lookup.
    ///
    /// The construction path is chosen purely from the identifier's suffix
    /// convention; the backing feed comes from the index the last discovery
    /// pass built. The same identifier always yields the same `Arc`.
    pub fn get_or_create(&self, id: &str) -> Result<Arc<DeviceInstance>, DeviceError> {
        let mut instances = self.instances();
        if let Some(existing) = instances.get(id) {
            return Ok(existing.clone());
        }

        let source = self
            .index()
            .get(id)
            .cloned()
            .ok_or_else(|| DeviceError::UnknownDevice(id.to_string()))?;

        let instance = if id.ends_with(SENSOR_SUFFIX) {
            match source {
                RecordSource::Device(feed) => {
                    DeviceInstance::Sensor(SensorDevice::new(id.to_string(), &feed))
                }
                RecordSource::Camera(_) => {
                    return Err(DeviceError::UnknownDevice(id.to_string()));
                }
            }
        } else if id.ends_with(LOCK_SUFFIX) {
            match source {
                RecordSource::Device(feed) => {
                    DeviceInstance::Lock(LockDevice::new(id.to_string(), &feed))
                }
                RecordSource::Camera(_) => {
                    return Err(DeviceError::UnknownDevice(id.to_string()));
                }
            }
        } else {
            match source {
                RecordSource::Camera(feed) => {
                    DeviceInstance::Camera(CameraDevice::new(id.to_string(), &feed))
                }
                RecordSource::Device(_) => {
                    return Err(DeviceError::UnknownDevice(id.to_string()));
                }
            }
        };

        let instance = Arc::new(instance);
        instances.insert(id.to_string(), instance.clone());
        Ok(instance)
    }

    /// Accepted for interface symmetry with the host; instances persist for
    /// the controller's lifetime.
    pub fn release(&self, _id: &str) {}

    /// Latest record of every indexed generic device. Used for night-mode
    /// bypass computation.
    pub(crate) fn device_records(&self) -> Vec<DeviceRecord> {
        self.index()
            .values()
            .filter_map(|source| match source {
                RecordSource::Device(feed) => Some(feed.latest()),
                RecordSource::Camera(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendor::CameraRecord;

    fn cache_with_sensor() -> DeviceCache {
        let cache = DeviceCache::new();
        let (_tx, feed) = DeviceFeed::channel(DeviceRecord::new("1", "contact-sensor", "Door"));
        let mut index = HashMap::new();
        index.insert("1-sensor".to_string(), RecordSource::Device(feed));
        cache.rebuild_index(index);
        cache
    }

    #[test]
    fn test_get_or_create_is_memoized() {
        let cache = cache_with_sensor();
        let first = cache.get_or_create("1-sensor").unwrap();
        let second = cache.get_or_create("1-sensor").unwrap();

        // Same instance, not merely an equal one.
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_suffix_selects_construction_path() {
        let cache = DeviceCache::new();
        let (_dtx, sensor_feed) =
            DeviceFeed::channel(DeviceRecord::new("1", "contact-sensor", "Door"));
        let (_ltx, lock_feed) = DeviceFeed::channel(DeviceRecord::new("2", "lock.v2", "Back"));
        let (_ctx, camera_feed) = CameraFeed::channel(CameraRecord::new("cam-1", "Porch"));

        let mut index = HashMap::new();
        index.insert("1-sensor".to_string(), RecordSource::Device(sensor_feed));
        index.insert("2-lock".to_string(), RecordSource::Device(lock_feed));
        index.insert("cam-1".to_string(), RecordSource::Camera(camera_feed));
        cache.rebuild_index(index);

        assert!(matches!(
            *cache.get_or_create("1-sensor").unwrap(),
            DeviceInstance::Sensor(_)
        ));
        assert!(matches!(
            *cache.get_or_create("2-lock").unwrap(),
            DeviceInstance::Lock(_)
        ));
        assert!(matches!(
            *cache.get_or_create("cam-1").unwrap(),
            DeviceInstance::Camera(_)
        ));
    }

    #[test]
    fn test_unknown_identifier_fails() {
        let cache = cache_with_sensor();
        assert!(matches!(
            cache.get_or_create("missing-sensor"),
            Err(DeviceError::UnknownDevice(_))
        ));
    }

    #[test]
    fn test_instance_survives_index_rebuild() {
        let cache = cache_with_sensor();
        let first = cache.get_or_create("1-sensor").unwrap();

        // Re-discovery that no longer lists the device: new lookups fail,
        // but the existing instance keeps being served.
        cache.rebuild_index(HashMap::new());
        let second = cache.get_or_create("1-sensor").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_release_is_noop() {
        let cache = cache_with_sensor();
        let first = cache.get_or_create("1-sensor").unwrap();
        cache.release("1-sensor");
        let second = cache.get_or_create("1-sensor").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_device_records_excludes_cameras() {
        let cache = DeviceCache::new();
        let (_dtx, sensor_feed) =
            DeviceFeed::channel(DeviceRecord::new("1", "contact-sensor", "Door"));
        let (_ctx, camera_feed) = CameraFeed::channel(CameraRecord::new("cam-1", "Porch"));

        let mut index = HashMap::new();
        index.insert("1-sensor".to_string(), RecordSource::Device(sensor_feed));
        index.insert("cam-1".to_string(), RecordSource::Camera(camera_feed));
        cache.rebuild_index(index);

        let records = cache.device_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "1");
    }
}
