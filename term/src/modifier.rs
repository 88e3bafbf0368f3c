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

//! Keyboard modifier state: shift/ctrl/alt/caps as held/toggled by the
//! special scancode groups, plus the one-shot `extra` flag.

/// Which dictionary slot a non-special scancode should resolve through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySlot {
    Normal,
    Shift,
    Alt,
    Ctrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierState {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub caps_lock: bool,
    extra: bool,
}

impl ModifierState {
    /// Arms the one-shot `extra` flag; consumed by the next non-modifier key.
    pub fn arm_extra(&mut self) {
        self.extra = true;
    }

    pub fn extra_armed(&self) -> bool {
        self.extra
    }

    /// Consumes and clears the `extra` flag, returning whether it was armed.
    pub fn take_extra(&mut self) -> bool {
        std::mem::take(&mut self.extra)
    }

    /// Slot precedence per the scancode processor: caps XOR shift, then
    /// ctrl, then alt, then plain. `extra` is handled by the caller before
    /// this is consulted, since it takes a different code path entirely.
    pub fn slot(&self) -> KeySlot {
        if self.caps_lock ^ self.shift {
            KeySlot::Shift
        } else if self.ctrl {
            KeySlot::Ctrl
        } else if self.alt {
            KeySlot::Alt
        } else {
            KeySlot::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn caps_and_shift_cancel_out() {
        let mut m = ModifierState {
            caps_lock: true,
            shift: true,
            ..Default::default()
        };
        assert_eq!(m.slot(), KeySlot::Normal);
        m.shift = false;
        assert_eq!(m.slot(), KeySlot::Shift);
    }

    #[test]
    fn extra_is_one_shot() {
        let mut m = ModifierState::default();
        assert!(!m.take_extra());
        m.arm_extra();
        assert!(m.extra_armed());
        assert!(m.take_extra());
        assert!(!m.extra_armed());
    }

    #[test]
    fn ctrl_outranks_alt() {
        let m = ModifierState {
            ctrl: true,
            alt: true,
            ..Default::default()
        };
        assert_eq!(m.slot(), KeySlot::Ctrl);
    }
}
