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

//! Turns the raw serial byte stream into the inbound lines the wire
//! protocol exchanges: a request/response cycle is zero or two data-word
//! lines followed by a line containing the literal `EOTX`, with `DEBUG`
//! lines interleaved and forwarded straight to the log.

use std::fs::File;
use std::io::Read;
use std::os::fd::AsFd;
use std::time::{Duration, Instant};

use crate::error::LinkError;

/// One parsed inbound line, classified by what it means to the protocol.
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    /// Two wire characters making up a status or data word.
    Word(u8, u8),
    /// End of this request/response cycle.
    Eotx,
    /// Converter firmware diagnostic output, not part of the protocol.
    Debug(String),
}

/// Reads and classifies lines off `file`, retaining a small buffer of
/// not-yet-terminated bytes across calls.
pub struct LineReader<'a> {
    file: &'a File,
    buf: Vec<u8>,
}

impl<'a> LineReader<'a> {
    pub fn new(file: &'a File) -> Self {
        Self { file, buf: Vec::new() }
    }

    /// Reads and classifies the next complete line, waiting up to
    /// `timeout` in total. Returns `Ok(None)` on timeout with no line.
    pub fn read_line(&mut self, timeout: Duration) -> Result<Option<Line>, LinkError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n' || b == b'\r') {
                let line: Vec<u8> = self.buf.drain(..=pos).collect();
                let line = &line[..line.len() - 1];
                if line.is_empty() {
                    continue;
                }
                return Ok(Some(classify(line)));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            if !self.wait_readable(remaining)? {
                return Ok(None);
            }
            self.fill()?;
        }
    }

    fn wait_readable(&self, timeout: Duration) -> Result<bool, LinkError> {
        let mut fds = [rustix::event::PollFd::new(&self.file.as_fd(), rustix::event::PollFlags::IN)];
        let millis = timeout.as_millis().min(i32::MAX as u128) as i32;
        let n = rustix::event::poll(&mut fds, millis).map_err(std::io::Error::from)?;
        Ok(n > 0)
    }

    fn fill(&mut self) -> Result<(), LinkError> {
        let mut chunk = [0u8; 256];
        match (&mut &*self.file).read(&mut chunk) {
            Ok(0) => Err(LinkError::DeviceClosed),
            Ok(n) => {
                self.buf.extend_from_slice(&chunk[..n]);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(LinkError::Configure {
                path: "<serial>".to_string(),
                source: e,
            }),
        }
    }
}

fn classify(line: &[u8]) -> Line {
    let text = String::from_utf8_lossy(line);
    if text.contains("EOTX") {
        return Line::Eotx;
    }
    if text.contains("DEBUG") {
        return Line::Debug(text.into_owned());
    }
    if line.len() >= 2 {
        Line::Word(line[0], line[1])
    } else {
        Line::Debug(text.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_eotx_debug_and_word_lines() {
        assert_eq!(classify(b"EOTX"), Line::Eotx);
        assert!(matches!(classify(b"DEBUG hello"), Line::Debug(_)));
        assert_eq!(classify(b"\x5C\x47"), Line::Word(0x5C, 0x47));
    }
}
