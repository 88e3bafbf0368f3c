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

//! TOML configuration for the controller daemon: one `[[terminal]]` table
//! per configured station, global serial/clicker/debug settings, and an
//! optional `[console]` section enabling the operator debug consoles.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

fn default_poll_delay_us() -> u64 {
    2_000
}

fn default_codepage() -> String {
    "cp037".to_string()
}

fn default_dictionary() -> String {
    "5250_us".to_string()
}

fn default_true() -> bool {
    true
}

fn default_shell() -> String {
    "/bin/sh".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub serial_device: String,
    #[serde(default = "default_true")]
    pub clicker_default: bool,
    #[serde(default)]
    pub debug: bool,
    /// Directory for the rolling daemon log file. No file layer if unset.
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Program spawned as the child for every terminal's pseudo-terminal.
    #[serde(default = "default_shell")]
    pub shell: String,
    #[serde(rename = "terminal", default)]
    pub terminals: Vec<TerminalConfig>,
    #[serde(default)]
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Deserialize)]
pub struct TerminalConfig {
    pub station: u8,
    #[serde(default = "default_dictionary")]
    pub dictionary: String,
    #[serde(default = "default_poll_delay_us")]
    pub poll_delay_us: u64,
    #[serde(default = "default_codepage")]
    pub codepage: String,
    #[serde(default)]
    pub advanced_features: bool,
}

/// Binds the operator debug console can listen on. At least one of
/// `tcp_bind`/`unix_socket` should be set for the section to do anything.
#[derive(Debug, Deserialize, Default)]
pub struct ConsoleConfig {
    pub tcp_bind: Option<String>,
    pub unix_socket: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: Box<toml::de::Error>,
    },
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_the_documented_shape() {
        let toml = r#"
            serial_device = "/dev/ttyUSB0"
            clicker_default = true
            debug = false

            [[terminal]]
            station = 0
            dictionary = "5250_us"
            poll_delay_us = 2000
            codepage = "cp037"
            advanced_features = false

            [console]
            tcp_bind = "127.0.0.1:7632"
            unix_socket = "/run/twinax-ctl.sock"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.serial_device, "/dev/ttyUSB0");
        assert_eq!(config.terminals.len(), 1);
        assert_eq!(config.terminals[0].station, 0);
        let console = config.console.unwrap();
        assert_eq!(console.tcp_bind.as_deref(), Some("127.0.0.1:7632"));
    }

    #[test]
    fn missing_optional_fields_fall_back_to_documented_defaults() {
        let toml = r#"
            serial_device = "/dev/ttyUSB0"

            [[terminal]]
            station = 1
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.clicker_default);
        assert!(!config.debug);
        assert!(config.console.is_none());
        let terminal = &config.terminals[0];
        assert_eq!(terminal.poll_delay_us, 2_000);
        assert_eq!(terminal.codepage, "cp037");
        assert_eq!(terminal.dictionary, "5250_us");
        assert!(!terminal.advanced_features);
        assert_eq!(config.shell, "/bin/sh");
        assert!(config.log_dir.is_none());
    }
}
