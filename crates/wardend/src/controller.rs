//! Location controller: composition root for one vendor location.
//!
//! Owns the mode reconciler, the device cache, and the feed loop; serves
//! device lookups; forwards arm/disarm requests to the vendor with
//! night-mode bypass synthesis.

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::SecurityConfig;
use crate::devices::DeviceCache;
use crate::devices::DeviceDescriptor;
use crate::devices::DeviceError;
use crate::devices::DeviceInstance;
use crate::devices::is_contact_kind;
use crate::discovery;
use crate::registry::DeviceRegistry;
use crate::security::ModeReconciler;
use crate::security::NightMode;
use crate::security::SecurityMode;
use crate::security::SecurityState;
use crate::vendor::Location;
use crate::vendor::ModeEvent;
use crate::vendor::VendorError;

#[derive(Debug, thiserror::Error)]
pub enum ArmError {
    /// The requested mode is not in the location's supported set.
    #[error("mode {0} is not supported at this location")]
    UnsupportedMode(SecurityMode),

    #[error(transparent)]
    Vendor(#[from] VendorError),
}

pub struct LocationController {
    location: Arc<dyn Location>,
    registry: Arc<dyn DeviceRegistry>,
    cache: DeviceCache,
    reconciler: Arc<ModeReconciler>,

    /// Feed loop task, held so `stop` can abort it.
    feed_task: Mutex<Option<JoinHandle<()>>>,
}

impl LocationController {
    pub fn new(
        location: Arc<dyn Location>,
        registry: Arc<dyn DeviceRegistry>,
        config: SecurityConfig,
    ) -> Self {
        Self {
            location,
            registry,
            cache: DeviceCache::new(),
            reconciler: Arc::new(ModeReconciler::new(config.night_mode)),
            feed_task: Mutex::new(None),
        }
    }

    /// Subscribe to the vendor feeds and apply the startup mode policy.
    /// Call once.
    ///
    /// The mode feed is subscribed unconditionally. Panel resolution failing
    /// is an expected outcome (not every location has a panel); the
    /// controller falls back to mode-feed-only operation. Locations with an
    /// alarm base station do not emit mode events for panel-local arm/disarm,
    /// so their current mode is fetched once up front, and the state is
    /// forced to Disarmed if even that leaves it unknown.
    pub async fn start(&self) {
        let mode_rx = self.location.mode_events();

        let panel_rx = match self.location.resolve_panel().await {
            Ok(rx) => {
                info!("security panel resolved at {}", self.location.id());
                Some(rx)
            }
            Err(e) => {
                debug!("no panel feed at {}: {}", self.location.id(), e);
                None
            }
        };

        let task = tokio::spawn(run_feeds(
            self.location.clone(),
            self.reconciler.clone(),
            mode_rx,
            panel_rx,
        ));
        if let Ok(mut slot) = self.feed_task.lock() {
            *slot = Some(task);
        }

        if self.location.has_base_station() {
            match self.location.current_mode().await {
                Ok(raw) => {
                    let state = self.reconciler.apply(&raw);
                    info!("initial mode at {}: {}", self.location.id(), state.mode);
                }
                Err(e) => warn!("initial mode query failed: {}", e),
            }
            if self.reconciler.initialize_disarmed_if_unset() {
                debug!("forcing initial state to Disarmed");
            }
        }
    }

    /// Abort the feed loop. Instances and state stay readable afterwards.
    pub fn stop(&self) {
        if let Ok(mut slot) = self.feed_task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }

    /// Run a discovery pass: classify every vendor device, rebuild the
    /// lookup index, publish the descriptor batch to the host registry.
    pub async fn discover(&self) -> Result<Vec<DeviceDescriptor>, VendorError> {
        discovery::discover(self.location.as_ref(), &self.cache, self.registry.as_ref()).await
    }

    /// Get the live instance for `id`, constructing it on first lookup.
    pub fn get_device(&self, id: &str) -> Result<Arc<DeviceInstance>, DeviceError> {
        self.cache.get_or_create(id)
    }

    /// Accepted for interface symmetry with the host; a no-op.
    pub fn release_device(&self, id: &str) {
        self.cache.release(id);
    }

    /// Current security snapshot, or `None` before the first feed event.
    pub fn security_state(&self) -> Option<Arc<SecurityState>> {
        self.reconciler.current()
    }

    /// Forward an arm request to the vendor.
    ///
    /// Night mode is synthesized: the vendor is armed away or home (per
    /// configuration) with every currently-faulted entry sensor on the
    /// bypass list. The snapshot is not touched here; confirmation arrives
    /// asynchronously through the feeds.
    pub async fn arm(&self, mode: SecurityMode) -> Result<(), ArmError> {
        match mode {
            SecurityMode::AwayArmed => self.location.arm_away(&[]).await?,
            SecurityMode::HomeArmed => self.location.arm_home(&[]).await?,
            SecurityMode::NightArmed => {
                let bypass = self.faulted_entry_sensors();
                match self.reconciler.night_mode() {
                    NightMode::Disabled => return Err(ArmError::UnsupportedMode(mode)),
                    NightMode::Away => self.location.arm_away(&bypass).await?,
                    NightMode::Home => self.location.arm_home(&bypass).await?,
                }
            }
            SecurityMode::Disarmed => self.location.disarm().await?,
        }
        Ok(())
    }

    /// Forward a disarm request to the vendor.
    pub async fn disarm(&self) -> Result<(), VendorError> {
        self.location.disarm().await
    }

    /// Vendor ids of every currently-faulted contact-family sensor known to
    /// the controller. Other kinds, including unknown ones, do not match.
    fn faulted_entry_sensors(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .cache
            .device_records()
            .into_iter()
            .filter(|record| is_contact_kind(&record.kind) && record.faulted)
            .map(|record| record.id)
            .collect();
        ids.sort();
        ids
    }
}

impl Drop for LocationController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Feed loop: one event at a time, in arrival order per feed.
///
/// Mode events carry the new raw mode; panel events carry nothing, so the
/// current mode is re-queried from the vendor. There is no ordering between
/// the two feeds; the reconciler's last-writer-wins policy is the
/// mitigation.
async fn run_feeds(
    location: Arc<dyn Location>,
    reconciler: Arc<ModeReconciler>,
    mut mode_rx: broadcast::Receiver<ModeEvent>,
    mut panel_rx: Option<broadcast::Receiver<()>>,
) {
    loop {
        tokio::select! {
            event = mode_rx.recv() => match event {
                Ok(raw) => {
                    let state = reconciler.apply(&raw);
                    info!("mode feed: '{}' -> {}", raw, state.mode);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("mode feed lagged, skipped {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            event = recv_panel(&mut panel_rx) => match event {
                Ok(()) => match location.current_mode().await {
                    Ok(raw) => {
                        let state = reconciler.apply(&raw);
                        info!("panel feed: re-queried mode '{}' -> {}", raw, state.mode);
                    }
                    Err(e) => warn!("panel-driven mode query failed: {}", e),
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("panel feed lagged, skipped {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    panel_rx = None;
                }
            },
        }
    }
    debug!("feed loop for {} finished", location.id());
}

/// Await the next panel event, or never resolve when there is no panel.
async fn recv_panel(
    panel_rx: &mut Option<broadcast::Receiver<()>>,
) -> Result<(), broadcast::error::RecvError> {
    match panel_rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
