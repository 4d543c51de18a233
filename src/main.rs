//! contpad - poll monitor for the legacy controller pad adapter
//!
//! Runs the configured input backends at the legacy frame rate and logs every
//! change of pad or camera state.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contpad::config::{AppConfig, ConfigWatcher};
use contpad::input::gamepad::{print_gamepad_diagnostics, PlatformQuirks};
use contpad::monitor::format_frame;
use contpad::{CameraInput, ContPad, ControllerSet, InputFeeds};

/// contpad - map gamepad and mouse input onto a legacy controller pad
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "contpad.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Print detected gamepads and exit
    #[arg(long)]
    list_devices: bool,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Starting contpad...");

    let (config_watcher, config) = if Path::new(&args.config).exists() {
        let (watcher, config) = ConfigWatcher::new(args.config.clone()).await?;
        info!("Configuration loaded from {} with hot-reload enabled", args.config);
        (Some(watcher), config)
    } else {
        info!("No configuration file at {}, using defaults", args.config);
        (None, AppConfig::default())
    };

    if args.list_devices {
        print_gamepad_diagnostics(&PlatformQuirks::from_config(&config.input));
        return Ok(());
    }

    run_poll_loop(config, config_watcher, args.frames, shutdown_signal()).await;

    info!("contpad shutdown complete");
    Ok(())
}

async fn run_poll_loop(
    config: AppConfig,
    mut config_watcher: Option<ConfigWatcher>,
    max_frames: Option<u64>,
    shutdown: impl std::future::Future<Output = ()>,
) {
    let feeds = InputFeeds::from_config(&config);
    let mut controllers = ControllerSet::from_config(&config, &feeds);

    let mut camera = CameraInput::new(config.input.mouse_look);
    controllers.init(&camera);

    let frame = Duration::from_secs_f64(1.0 / f64::from(config.poll.rate_hz));
    let mut ticker = tokio::time::interval(frame);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("Polling at {} Hz", config.poll.rate_hz);

    let mut pad = ContPad::default();
    let mut last: Option<(ContPad, CameraInput)> = None;
    let mut frames = 0u64;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                controllers.read(&mut pad, &mut camera);
                frames += 1;

                if last != Some((pad, camera)) {
                    info!("{}", format_frame(&pad, &camera));
                    last = Some((pad, camera));
                }

                if max_frames.is_some_and(|max| frames >= max) {
                    info!("Reached {} frame(s)", frames);
                    break;
                }
            }
            Some(new_config) = next_config(&mut config_watcher) => {
                debug!("Applying reloaded configuration");
                camera.mouse_look = new_config.input.mouse_look;
                controllers.apply_config(&new_config);
            }
            _ = &mut shutdown => {
                break;
            }
        }
    }

    controllers.shutdown();
}

/// Next reloaded config, or pending forever without a watcher
async fn next_config(watcher: &mut Option<ConfigWatcher>) -> Option<AppConfig> {
    match watcher {
        Some(watcher) => watcher.next_config().await,
        None => std::future::pending().await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
