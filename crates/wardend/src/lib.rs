//! wardend bridges one location of a remote home-security account into a
//! local capability-typed device tree, and reconciles the account's two
//! independent security feeds into a single state snapshot.

pub mod config;
pub mod controller;
pub mod devices;
pub mod discovery;
pub mod registry;
pub mod security;
pub mod vendor;

pub use config::Config;
pub use config::ConfigError;
pub use config::LogLevel;
pub use controller::ArmError;
pub use controller::LocationController;
pub use devices::Capability;
pub use devices::DeviceDescriptor;
pub use devices::DeviceKind;
pub use security::NightMode;
pub use security::SecurityMode;
pub use security::SecurityState;
