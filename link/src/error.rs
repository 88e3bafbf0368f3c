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

//! Errors surfaced by the link driver's setup path. Per-cycle protocol
//! hiccups (bad frames, missing EOTX) are not represented here — they are
//! handled in place by retrying, per the error-handling taxonomy's
//! "transient link errors" category.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to open serial device {path}: {source}")]
    OpenDevice {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to configure serial device {path}: {source}")]
    Configure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serial write did not complete: wrote {written} of {total} bytes")]
    ShortWrite { written: usize, total: usize },

    #[error("serial write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("serial device closed unexpectedly")]
    DeviceClosed,

    #[error("no response within timeout")]
    ResponseTimeout,

    #[error("polling the serial device failed: {0}")]
    Poll(#[from] std::io::Error),
}
