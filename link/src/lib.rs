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

//! The serial link: opens and configures the USB-to-twinax converter,
//! speaks the request/response cycle over it, and round-robins across every
//! configured station.
//!
//! Deliberately synchronous end to end — [`driver::run`] is meant to be
//! driven from inside `tokio::task::spawn_blocking` rather than made async,
//! since every I/O call here blocks on real serial hardware timing that an
//! `.await` point wouldn't make any cheaper.

pub mod driver;
pub mod error;
pub mod line_reader;
pub mod serial;
pub mod terminal;

pub use driver::{RESPONSE_TIMEOUT, open_device, run};
pub use error::LinkError;
pub use line_reader::{Line, LineReader};
pub use terminal::{ControlReceiver, ControlSender, StdinReceiver, StdinSender, Terminal};
