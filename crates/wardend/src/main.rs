use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use wardend::Config;
use wardend::LocationController;
use wardend::SecurityMode;
use wardend::registry::LoggingRegistry;
use wardend::vendor::CameraRecord;
use wardend::vendor::DeviceRecord;
use wardend::vendor::sim::SimLocation;

#[derive(Debug, Parser)]
#[command(name = "wardend", about = "Home-security location bridge")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "wardend.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_file(&args.config)?;

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(config.logging.level))
        .init();

    tracing::info!("wardend starting");
    tracing::info!(
        "Bridging location: {} ({})",
        config.location.name,
        config.location.id
    );

    // The real cloud transport lives in the vendor client; this binary runs
    // against the simulated location until one is wired in.
    let location = Arc::new(demo_location(&config));
    let registry = Arc::new(LoggingRegistry);
    let controller =
        LocationController::new(location.clone(), registry, config.security.clone());

    controller.start().await;

    let devices = controller.discover().await?;
    for descriptor in &devices {
        // Instantiate eagerly so the demo has live devices to report on.
        match controller.get_device(&descriptor.id) {
            Ok(device) => tracing::info!("{}: {}", descriptor.id, device.state_json()),
            Err(e) => tracing::warn!("failed to build {}: {}", descriptor.id, e),
        }
    }

    // Demo arm cycle: issue the command, then let the simulated cloud
    // confirm it through the mode feed.
    controller.arm(SecurityMode::AwayArmed).await?;
    location.push_mode_event("away");

    tracing::info!("Press Ctrl+C to exit");
    tokio::signal::ctrl_c().await?;

    if let Some(state) = controller.security_state() {
        tracing::info!("final security state: {}", state.mode);
    }
    controller.stop();
    tracing::info!("wardend shutdown complete");

    Ok(())
}

/// Simulated location with one of everything the classifier recognizes.
fn demo_location(config: &Config) -> SimLocation {
    let sim = SimLocation::new(config.location.id.clone(), config.location.name.clone())
        .with_base_station()
        .with_panel();

    let mut doorbell = CameraRecord::new("cam-front", "Front Door");
    doorbell.doorbell = true;
    doorbell.battery_operated = true;
    doorbell.battery_level = Some(82);
    sim.add_camera(doorbell);

    let mut floodlight = CameraRecord::new("cam-drive", "Driveway");
    floodlight.has_light = true;
    floodlight.has_siren = true;
    sim.add_camera(floodlight);

    let mut contact = DeviceRecord::new("dev-door", "contact-sensor", "Back Door");
    contact.battery_status = "full".to_string();
    sim.add_device(contact);

    let mut motion = DeviceRecord::new("dev-hall", "motion-sensor", "Hallway");
    motion.battery_status = "full".to_string();
    sim.add_device(motion);

    let mut lock = DeviceRecord::new("dev-lock", "lock.v2", "Back Door Lock");
    lock.battery_status = "low".to_string();
    lock.locked = Some("locked".to_string());
    sim.add_device(lock);

    sim
}
