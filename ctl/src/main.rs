/*
 *   Copyright (c) 2025 twinax-ctl contributors
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! `twinax-ctl`: wires the `wire`/`link`/`term`/`pty` crates into a running
//! daemon. Owns configuration loading, tracing setup, and the optional
//! operator debug consoles — everything the distilled spec scopes out as
//! "external collaborators" but that a complete binary still needs.

mod config;
mod console;
mod error;
mod log;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use miette::IntoDiagnostic;

use config::Config;
use console::ConsoleTerminal;
use error::DaemonError;
use twinax_link::Terminal;
use twinax_pty::ChildSpec;
use twinax_term::{ScancodeDictionary, SessionConfig};

/// Multi-terminal twinax-to-shell controller daemon.
#[derive(Debug, Parser)]
#[command(name = "twinax-ctl", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "/etc/twinax-ctl.toml")]
    config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config).map_err(DaemonError::from)?;

    let _log_guard = log::init(config.debug, config.log_dir.as_deref().map(std::path::Path::new))?;

    tracing::info!(device = %config.serial_device, terminals = config.terminals.len(), "starting twinax-ctl");

    let dictionaries = build_dictionaries(&config)?;
    let child_spec = ChildSpec {
        program: config.shell.clone(),
        args: Vec::new(),
    };

    let mut terminals = Vec::with_capacity(config.terminals.len());
    let mut console_terminals = Vec::with_capacity(config.terminals.len());
    let mut bridge_handles = Vec::new();

    for terminal_config in &config.terminals {
        if terminal_config.station > 6 {
            return Err(DaemonError::BadStation(terminal_config.station).into());
        }
        let dictionary = dictionaries
            .get(&terminal_config.station)
            .expect("dictionary resolved for every configured station")
            .clone();

        let session_config = SessionConfig {
            poll_delay_us: terminal_config.poll_delay_us,
            clicker_enabled: config.clicker_default,
            advanced_features: terminal_config.advanced_features,
            codepage: terminal_config.codepage.clone(),
        };

        let (terminal, stdin_rx, control_rx) =
            Terminal::new(terminal_config.station, dictionary, session_config);

        console_terminals.push(ConsoleTerminal {
            station: terminal.station,
            session: terminal.session.clone(),
            stdin_tx: terminal.stdin_tx.clone(),
        });

        let bridge_handle = tokio::spawn(twinax_pty::run(
            terminal.station,
            terminal.session.clone(),
            child_spec.clone(),
            stdin_rx,
            control_rx,
        ));
        bridge_handles.push(bridge_handle);

        terminals.push(terminal);
    }

    if let Some(console_config) = config.console {
        console::spawn(console_config, Arc::new(console_terminals))?;
    }

    let device = twinax_link::open_device(&config.serial_device).map_err(DaemonError::from)?;
    let shutdown = Arc::new(AtomicBool::new(false));

    let link_handle = {
        let shutdown = shutdown.clone();
        tokio::task::spawn_blocking(move || {
            twinax_link::run(&device, &mut terminals, &shutdown);
        })
    };

    tokio::signal::ctrl_c().await.into_diagnostic()?;
    tracing::info!("shutdown requested, stopping link driver");
    shutdown.store(true, Ordering::Relaxed);

    let _ = link_handle.await;
    for handle in bridge_handles {
        let _ = handle.await;
    }

    tracing::info!("twinax-ctl stopped");
    Ok(())
}

/// Resolves every configured terminal's dictionary name to a shared,
/// immutable [`ScancodeDictionary`], one `Arc` per distinct name so
/// identical dictionaries aren't rebuilt per station.
fn build_dictionaries(
    config: &Config,
) -> Result<std::collections::HashMap<u8, Arc<ScancodeDictionary>>, DaemonError> {
    let mut built: std::collections::HashMap<String, Arc<ScancodeDictionary>> =
        std::collections::HashMap::new();
    let mut by_station = std::collections::HashMap::new();

    for terminal in &config.terminals {
        let dictionary = match built.get(&terminal.dictionary) {
            Some(dict) => dict.clone(),
            None => {
                let dict = twinax_term::builtin_dictionaries::by_name(&terminal.dictionary).ok_or_else(|| {
                    DaemonError::UnknownDictionary {
                        station: terminal.station,
                        dictionary: terminal.dictionary.clone(),
                    }
                })?;
                let dict = Arc::new(dict);
                built.insert(terminal.dictionary.clone(), dict.clone());
                dict
            }
        };
        by_station.insert(terminal.station, dictionary);
    }

    Ok(by_station)
}
