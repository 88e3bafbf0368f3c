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

//! Errors from the pty bridge's child-process lifecycle. Per the
//! error-handling taxonomy, spawn/child I/O errors trigger a session reset
//! in the caller (the link driver); they are never fatal to the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PtyError {
    #[error("failed to open pseudo-terminal: {0}")]
    OpenPty(String),

    #[error("failed to spawn child {program:?}: {source}")]
    SpawnChild {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to clone pty reader: {0}")]
    CloneReader(String),

    #[error("failed to take pty writer: {0}")]
    TakeWriter(String),
}
