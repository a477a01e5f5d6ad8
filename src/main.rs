/*
 * This file is part of Sensorloop.
 *
 * Copyright (C) 2025 Sensorloop contributors
 *
 * Sensorloop is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Sensorloop is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Sensorloop. If not, see <https://www.gnu.org/licenses/>.
 */

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use sensorloop::config::load_config;
use sensorloop::constants::{operator, paths};
use sensorloop::{Service, Shutdown};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    eprintln!("sensorloop {} - concurrent sensor monitoring loop", VERSION);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    sensorloop [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config PATH   Config file (JSON)");
    eprintln!("    -v, --version       Print version");
    eprintln!("    -h, --help          Print this help");
    eprintln!();
    eprintln!("ENVIRONMENT:");
    eprintln!("    {:<19} Config file path", paths::CONFIG_ENV);
    eprintln!("    {:<19} Log filter (trace, debug, info, warn, error)", paths::LOG_LEVEL_ENV);
    eprintln!();
    eprintln!("While running, enter <SensorName> <NewThreshold> to change a threshold.");
    eprintln!("End input (Ctrl-D) or press Ctrl-C to stop.");
}

fn init_tracing() {
    let log_level = std::env::var(paths::LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(io::stderr)
        .with_env_filter(&log_level)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-v" | "--version" => {
                println!("sensorloop {}", VERSION);
                return Ok(());
            }
            "-c" | "--config" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                };
                config_path = Some(PathBuf::from(path));
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    init_tracing();

    let config = load_config(config_path.as_deref()).context("loading configuration")?;

    println!("Starting sensor system...");
    println!("Available sensors:");
    for s in &config.sensors {
        println!(" - {} ({}, threshold {})", s.name, s.kind, s.threshold);
    }

    let shutdown = Shutdown::new();
    let handles = Service::from_config(config)
        .context("building sensor service")?
        .start(shutdown.clone())
        .context("starting tasks")?;

    let on_signal = handles.shutdown();
    let channel = handles.channel();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received interrupt, shutting down");
        on_signal.trigger();
        channel.close();
    }) {
        warn!("Failed to set signal handler: {}. Stop with end of input instead.", e);
    }

    // Not joined: the thread may be parked in a blocking read at shutdown.
    handles
        .spawn_input(io::BufReader::new(io::stdin()), io::stdout())
        .context("starting input capture")?;

    println!("Threads started.");
    println!("{}", operator::USAGE);

    handles.join();
    println!("Sensor system terminated.");
    Ok(())
}
