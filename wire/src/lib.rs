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

//! Bit-packed twinax wire framing: the codec that turns display controller
//! opcodes and 8-bit payload bytes into the 6-bit-clean nibble stream the
//! USB-to-twinax converter expects, and back.
//!
//! This crate has no knowledge of terminals, scancodes, or VT52 escapes — it
//! is the leaf of the dependency graph, matching how the grounding codebase
//! keeps its `core::osc` and `core::pty::pty_types` modules free of anything
//! above the wire format they describe.

pub mod codec;
pub mod error;
pub mod opcodes;
pub mod queue;
pub mod response;
pub mod status;

pub use codec::{
    decode_data, decode_status, encode_ack, encode_command, encode_data, encode_poll,
    encode_status, reverse_bits,
};
pub use error::WireError;
pub use queue::{BoundedFifo, FifoSender};
pub use response::ResponseWord;
pub use status::StatusWord;
