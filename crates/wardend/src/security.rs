//! Security-mode reconciliation.
//!
//! Two independent vendor feeds report security changes: the account-level
//! mode feed and the security-panel telemetry feed. Neither is guaranteed to
//! exist for a given location, and there is no ordering between them when
//! both do. The reconciler collapses whatever arrives into one snapshot with
//! last-writer-wins semantics; a stale panel-driven mode query can therefore
//! overwrite a newer mode-feed event, which is accepted behavior.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde::Deserialize;
use serde::Serialize;

/// Arming mode of a location's security system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum SecurityMode {
    Disarmed,
    HomeArmed,
    AwayArmed,
    NightArmed,
}

/// How the synthesized night mode behaves.
///
/// The vendor has no native night mode; an enabled night mode is one of the
/// two real armed modes plus a bypass list of faulted entry sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NightMode {
    #[default]
    Disabled,
    /// Night arms as away.
    Away,
    /// Night arms as home.
    Home,
}

/// One consistent view of the security system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityState {
    pub mode: SecurityMode,

    /// No upstream feed carries an alarm-trigger signal, so this is always
    /// false. The field is kept so the host-facing shape is stable.
    pub triggered: bool,

    /// Modes the host may request, in a fixed order.
    pub supported_modes: Vec<SecurityMode>,
}

/// Merges the mode feed and the panel feed into one snapshot.
///
/// "Unknown/uninitialized" is the absence of a snapshot; locations with a
/// base station are force-initialized at startup so the state never stays
/// unknown indefinitely.
pub struct ModeReconciler {
    snapshot: ArcSwapOption<SecurityState>,

    /// Configuration snapshot taken at construction; never re-read from
    /// ambient state.
    night_mode: NightMode,
}

impl ModeReconciler {
    pub fn new(night_mode: NightMode) -> Self {
        Self {
            snapshot: ArcSwapOption::empty(),
            night_mode,
        }
    }

    /// Map a raw vendor mode onto a fresh snapshot and store it
    /// unconditionally (last writer wins).
    pub fn apply(&self, raw_mode: &str) -> Arc<SecurityState> {
        let mode = match raw_mode {
            "away" => SecurityMode::AwayArmed,
            "home" => SecurityMode::HomeArmed,
            _ => SecurityMode::Disarmed,
        };

        let state = Arc::new(SecurityState {
            mode,
            triggered: false,
            supported_modes: self.supported_modes(),
        });
        self.snapshot.store(Some(state.clone()));
        state
    }

    /// Current snapshot, or `None` before the first feed event.
    pub fn current(&self) -> Option<Arc<SecurityState>> {
        self.snapshot.load_full()
    }

    /// Startup fallback for base-station locations: if nothing has set a
    /// snapshot yet, store Disarmed. Returns whether it did.
    pub fn initialize_disarmed_if_unset(&self) -> bool {
        if self.snapshot.load().is_none() {
            self.apply("disarmed");
            true
        } else {
            false
        }
    }

    pub fn night_mode(&self) -> NightMode {
        self.night_mode
    }

    fn supported_modes(&self) -> Vec<SecurityMode> {
        let mut modes = vec![
            SecurityMode::Disarmed,
            SecurityMode::AwayArmed,
            SecurityMode::HomeArmed,
        ];
        if self.night_mode != NightMode::Disabled {
            modes.push(SecurityMode::NightArmed);
        }
        modes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unknown() {
        let reconciler = ModeReconciler::new(NightMode::Disabled);
        assert!(reconciler.current().is_none());
    }

    #[test]
    fn test_apply_maps_known_modes() {
        let reconciler = ModeReconciler::new(NightMode::Disabled);

        assert_eq!(reconciler.apply("away").mode, SecurityMode::AwayArmed);
        assert_eq!(reconciler.apply("home").mode, SecurityMode::HomeArmed);
        assert_eq!(reconciler.apply("disarmed").mode, SecurityMode::Disarmed);
        // Anything unrecognized means disarmed.
        assert_eq!(reconciler.apply("vacation").mode, SecurityMode::Disarmed);
    }

    #[test]
    fn test_triggered_is_always_false() {
        let reconciler = ModeReconciler::new(NightMode::Away);
        assert!(!reconciler.apply("away").triggered);
        assert!(!reconciler.apply("weird").triggered);
    }

    #[test]
    fn test_supported_modes_without_night() {
        let reconciler = ModeReconciler::new(NightMode::Disabled);
        let state = reconciler.apply("away");
        assert_eq!(
            state.supported_modes,
            vec![
                SecurityMode::Disarmed,
                SecurityMode::AwayArmed,
                SecurityMode::HomeArmed,
            ]
        );
        assert!(!state.supported_modes.contains(&SecurityMode::NightArmed));
    }

    #[test]
    fn test_supported_modes_with_night() {
        for night in [NightMode::Away, NightMode::Home] {
            let reconciler = ModeReconciler::new(night);
            let state = reconciler.apply("home");
            assert!(state.supported_modes.contains(&SecurityMode::NightArmed));
        }
    }

    #[test]
    fn test_last_writer_wins() {
        let reconciler = ModeReconciler::new(NightMode::Disabled);
        reconciler.apply("away");
        reconciler.apply("home");
        assert_eq!(reconciler.current().unwrap().mode, SecurityMode::HomeArmed);
    }

    #[test]
    fn test_initialize_disarmed_only_when_unset() {
        let reconciler = ModeReconciler::new(NightMode::Disabled);
        assert!(reconciler.initialize_disarmed_if_unset());
        assert_eq!(reconciler.current().unwrap().mode, SecurityMode::Disarmed);

        reconciler.apply("away");
        assert!(!reconciler.initialize_disarmed_if_unset());
        assert_eq!(reconciler.current().unwrap().mode, SecurityMode::AwayArmed);
    }
}
