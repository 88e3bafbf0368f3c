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

//! The daemon's top-level error type. Everything that can abort startup
//! (§6's "unrecoverable startup failure") is collected here so `main` can
//! render one `miette::Report` and exit non-zero, matching the grounding
//! codebase's `miette::Result` convention for its own binaries.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error, Diagnostic)]
pub enum DaemonError {
    #[error("configuration error")]
    #[diagnostic(code(twinax_ctl::config))]
    Config(#[from] ConfigError),

    #[error("failed to bring up the serial link")]
    #[diagnostic(
        code(twinax_ctl::link),
        help("check that the serial device path in the config exists and is readable")
    )]
    Link(#[from] twinax_link::LinkError),

    #[error("terminal {station} names an unknown scancode dictionary {dictionary:?}")]
    #[diagnostic(
        code(twinax_ctl::unknown_dictionary),
        help("known dictionaries are \"5250_us\" and \"5250_es\"")
    )]
    UnknownDictionary { station: u8, dictionary: String },

    #[error("terminal station address {0} is out of range (must be 0..=6)")]
    #[diagnostic(code(twinax_ctl::bad_station))]
    BadStation(u8),

    #[error("failed to set up logging")]
    #[diagnostic(code(twinax_ctl::logging))]
    Logging(#[source] std::io::Error),

    #[error("failed to bind operator console listener {addr}")]
    #[diagnostic(code(twinax_ctl::console_bind))]
    ConsoleBind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
