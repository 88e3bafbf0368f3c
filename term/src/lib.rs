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

//! Per-terminal state: the session state machine, the VT52-to-display
//! translator, and the scancode-to-child-input decoder.
//!
//! Sits directly above `twinax_wire` — it knows how to turn display
//! operations and scancodes into wire frames, but nothing about how those
//! frames reach the serial port or how a terminal's queues get drained.
//! That's `twinax_link`'s job.

pub mod builtin_dictionaries;
pub mod codepage;
pub mod cursor;
pub mod dictionary;
pub mod display_ops;
pub mod modifier;
pub mod scancode;
pub mod session;
pub mod translator;

pub use cursor::{Cursor, SavedCursor};
pub use dictionary::{KeyEntry, ScancodeDictionary, ScancodeDictionaryBuilder, SpecialGroups};
pub use display_ops::DisplayOp;
pub use modifier::{KeySlot, ModifierState};
pub use scancode::{KeyboardState, ScancodeOutcome};
pub use session::{
    COMMAND_QUEUE_MAX_PENDING, INACTIVITY_TIMEOUT, SessionConfig, SessionEvent, SessionState,
    TerminalSession,
};
