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

//! The decoded half of one request/response cycle: a status word, optionally
//! followed by a data (scancode) word.
//!
//! This is the element type of a terminal's inbound-response FIFO (see
//! [`crate::queue::BoundedFifo`]) — the link driver pushes what it decoded
//! off the wire, then immediately drains it in delivery order, per the
//! "responses... consumed in the order received per terminal" invariant.

use crate::status::StatusWord;

/// One decoded word pulled from a response line, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseWord {
    Status(StatusWord),
    Data(u16),
}
