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

//! Tracing setup: an `EnvFilter`-driven `fmt` layer on stderr, plus an
//! optional daily-rolling file layer, mirroring the grounding codebase's
//! `core::log::tracing_init` module.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, prelude::*};

use crate::error::DaemonError;

/// Initializes the global tracing subscriber. `debug` lowers the default
/// filter from `info` to `debug` when `RUST_LOG` isn't set. `log_dir`, if
/// given, adds a non-blocking rolling-file layer; its returned guard must
/// be held for the process lifetime or buffered lines are lost on exit.
pub fn init(debug: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, DaemonError> {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("twinax_ctl={default_level},twinax_link={default_level},twinax_term={default_level},twinax_pty={default_level},twinax_wire={default_level}")));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(env_filter).with(stderr_layer);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(DaemonError::Logging)?;
            let appender = tracing_appender::rolling::daily(dir, "twinax-ctl.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false);
            registry.with(file_layer).init();
            Ok(Some(guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}
