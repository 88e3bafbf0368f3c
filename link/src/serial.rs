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

//! Opens and configures the twinax converter's serial device: 57600 8-N-1,
//! raw mode, non-blocking reads.
//!
//! Uses `rustix::termios` the way the grounding codebase uses it for its
//! own raw-mode terminal handling, with one exception: `TIOCMBIS` (assert
//! modem control lines) has no rustix wrapper, so it goes through
//! `libc::ioctl` directly, exactly as the grounding codebase's PTY layer
//! does for the one ioctl it can't reach through a safe wrapper.

use std::fs::File;
use std::os::fd::{AsFd, AsRawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::time::Duration;

use rustix::termios::{self, OptionalAction};

use crate::error::LinkError;

/// How long to wait after opening the device for the converter firmware to
/// settle, per §4.2 step 1.
pub const FIRMWARE_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Opens `path`, puts it into raw mode at 57600 8-N-1, and asserts modem
/// control lines (tolerating `EINVAL` on virtual/pseudo serial ports).
pub fn open(path: &str) -> Result<File, LinkError> {
    let file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
        .map_err(|source| LinkError::OpenDevice {
            path: path.to_string(),
            source,
        })?;

    configure(&file, path)?;
    assert_modem_control(&file);
    Ok(file)
}

fn configure(file: &File, path: &str) -> Result<(), LinkError> {
    let fd = file.as_fd();
    let mut tio = termios::tcgetattr(fd).map_err(|source| LinkError::Configure {
        path: path.to_string(),
        source: source.into(),
    })?;

    termios::cfmakeraw(&mut tio);
    tio.control_modes.insert(termios::ControlModes::CREAD | termios::ControlModes::CLOCAL);
    tio.control_modes.remove(termios::ControlModes::CSIZE | termios::ControlModes::PARENB | termios::ControlModes::CSTOPB);
    tio.control_modes.insert(termios::ControlModes::CS8);
    tio.special_codes[termios::SpecialCodeIndex::VMIN] = 0;
    tio.special_codes[termios::SpecialCodeIndex::VTIME] = 1;

    tio.set_speed(termios::Speed::B57600)
        .map_err(|source| LinkError::Configure {
            path: path.to_string(),
            source: source.into(),
        })?;

    termios::tcsetattr(fd, OptionalAction::Now, &tio).map_err(|source| LinkError::Configure {
        path: path.to_string(),
        source: source.into(),
    })
}

/// Asserts DTR/RTS via `TIOCMBIS`. `EINVAL` means the device is a virtual
/// port (common in development and CI) and is treated as benign, per §4.2.
fn assert_modem_control(file: &File) {
    let bits: libc::c_int = libc::TIOCM_DTR | libc::TIOCM_RTS;
    let rc = unsafe { libc::ioctl(file.as_raw_fd(), libc::TIOCMBIS, &bits) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::EINVAL) {
            tracing::warn!(error = %err, "failed to assert modem control lines");
        }
    }
}
