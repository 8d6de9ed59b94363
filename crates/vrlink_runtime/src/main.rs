//! VRLink driver
//!
//! Starts a VR session against a native runtime installation and runs the
//! blocking step loop until a handler asks to stop.
//!
//! Run with: cargo run -p vrlink_runtime -- -d /path/to/vrlink
//!       or: VRLINK_DIR=/path/to/vrlink cargo run -p vrlink_runtime

mod app;
mod config;

use app::{App, EventTracePlugin};
use config::LaunchConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vrlink_core::prelude::*;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = match LaunchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("usage: vrlink -d <dir> [-c <configName>] [-f <configFile>] [-s <key=value>]");
            std::process::exit(1);
        }
    };

    log::info!("runtime root: {}", config.root.display());

    if let Err(e) = run(&config) {
        log::error!("session failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &LaunchConfig) -> Result<()> {
    // Plugins the native runtime may request by name.
    let mut plugins = PluginRegistry::new();
    plugins.add(Arc::new(EventTracePlugin));

    let running = Arc::new(AtomicBool::new(true));
    let app = App::new(running.clone());

    let mut session = VrSession::create(&config.root, &config.passthrough, plugins)?;
    session.add_event_handler(app.clone())?;
    session.add_render_handler(app)?;

    while running.load(Ordering::Relaxed) {
        session.step()?;
    }

    session.shutdown()
}
