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

//! Wire-level errors. Every variant here is a transient link error in the
//! error-handling taxonomy: logged and retried by resending the last frame,
//! never propagated as a hard failure.

/// Something went wrong turning a raw serial line into status/data words.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("line truncated before EOTX: {0:?}")]
    IncompleteLine(Vec<u8>),

    #[error("response line missing EOTX terminator")]
    MissingEotx,

    #[error("malformed status/data word pair: {0:?}")]
    MalformedWord(Vec<u8>),
}
