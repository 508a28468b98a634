//! murmur: press-to-record appliance that plays recordings back at random

mod config;

use anyhow::Context;
use murmur_core::{
    ApplianceConfig, CaptureEngine, CaptureSession, DeviceCatalog, Direction, RecordingStore,
    resolve_device,
};
use murmur_services::{CpalCatalog, CpalInput, CpalOutput, EvdevButton, Player, RecordingCodec};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("murmur=info".parse()?))
        .init();

    info!("Starting murmur");

    let settings = config::load_settings(&config::config_path());
    settings.validate().context("Invalid settings")?;

    let catalog = CpalCatalog;
    for (index, device) in catalog.devices()?.iter().enumerate() {
        debug!(
            index,
            name = %device.name,
            inputs = device.max_input_channels,
            outputs = device.max_output_channels,
            "Audio device"
        );
    }
    let input = resolve_device(&catalog, &settings.devices.input_keywords, Direction::Input)
        .context("No usable input device")?;
    let output = resolve_device(&catalog, &settings.devices.output_keywords, Direction::Output)
        .context("No usable output device")?;
    let config = ApplianceConfig { settings, input, output };

    let codec = RecordingCodec::from(config.settings.format);
    let store = RecordingStore::open(&config.settings.recordings_dir, codec).with_context(|| {
        format!("Failed to create {}", config.settings.recordings_dir.display())
    })?;
    let existing = store.list()?.len();
    info!(
        dir = %store.dir().display(),
        format = ?config.settings.format,
        existing,
        "Recordings directory ready"
    );

    let mut button = EvdevButton::open(&config.settings.button)?;

    Player::new(
        store.dir(),
        *store.codec(),
        CpalOutput,
        config.output.clone(),
        &config.settings.playback,
    )
    .spawn()
    .context("Failed to start player thread")?;

    let engine = CaptureEngine::new(config.settings.capture.clone());
    let mut session = CaptureSession::new(engine, CpalInput, config.input.clone(), store);
    session.run(&mut button)
}
