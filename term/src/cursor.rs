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

//! Cursor position and the save/restore stack used by `ESC j` / `ESC k`.

pub const ROWS: u8 = 24;
pub const COLS: u8 = 80;

/// A display position, always kept in range by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: u8,
    pub col: u8,
}

impl Cursor {
    pub fn new(row: u8, col: u8) -> Self {
        Self {
            row: row.min(ROWS - 1),
            col: col.min(COLS - 1),
        }
    }

    pub fn home() -> Self {
        Self { row: 0, col: 0 }
    }

    /// 16-bit display offset, `row * 80 + col`, as used by the address and
    /// reference counter commands.
    pub fn offset(self) -> u16 {
        self.row as u16 * COLS as u16 + self.col as u16
    }
}

/// A saved cursor plus the two line-fill quirk flags, restored together by
/// `ESC k` so that a restore reproduces the exact state `ESC j` captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SavedCursor {
    pub cursor: Cursor,
    pub newline_pending: bool,
    pub cursor_in_previous_line: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cursor_clamps_on_construction() {
        assert_eq!(Cursor::new(30, 90), Cursor::new(23, 79));
    }

    #[test]
    fn offset_is_row_major() {
        assert_eq!(Cursor::new(1, 0).offset(), 80);
        assert_eq!(Cursor::new(23, 79).offset(), 1919);
    }
}
