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

//! Keyboard scancode processing: groups, modifier state, and dictionary
//! lookup feeding bytes to the child's stdin and control-data frames to the
//! display controller.

use crate::dictionary::ScancodeDictionary;
use crate::modifier::{KeySlot, ModifierState};
use twinax_wire::opcodes::op;
use twinax_wire::opcodes::{IndicatorByte, StatusByte};

/// Everything a scancode can produce: bytes for the child's stdin, and
/// zero or more already-encoded control/indicator frames for the link.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScancodeOutcome {
    pub pty_bytes: Vec<u8>,
    pub frames: Vec<Vec<u8>>,
}

/// Mutable keyboard-side state a scancode can update in place: modifiers,
/// the software indicator lamp byte, and the status byte (clicker toggle
/// lives there too).
pub struct KeyboardState<'a> {
    pub modifiers: &'a mut ModifierState,
    pub indicator_byte: &'a mut IndicatorByte,
    pub status_byte: &'a mut StatusByte,
    pub advanced_features: bool,
}

/// Runs the five-step scancode algorithm, mutating `state` and returning
/// what should reach the child and the wire.
pub fn process(
    dict: &ScancodeDictionary,
    state: &mut KeyboardState<'_>,
    station: u8,
    code: u16,
) -> ScancodeOutcome {
    let mut out = ScancodeOutcome::default();
    let specials = &dict.specials;

    if specials.extra.contains(&code) {
        state.modifiers.arm_extra();
        return out;
    }

    if specials.ctrl_press.contains(&code) {
        state.modifiers.ctrl = if specials.ctrl_release.is_empty() {
            !state.modifiers.ctrl
        } else {
            true
        };
        return out;
    }
    if specials.ctrl_release.contains(&code) {
        state.modifiers.ctrl = false;
        return out;
    }
    if specials.alt_press.contains(&code) {
        state.modifiers.alt = if specials.alt_release.is_empty() {
            !state.modifiers.alt
        } else {
            true
        };
        return out;
    }
    if specials.alt_release.contains(&code) {
        state.modifiers.alt = false;
        return out;
    }
    if specials.shift_press.contains(&code) {
        state.modifiers.shift = true;
        return out;
    }
    if specials.shift_release.contains(&code) {
        state.modifiers.shift = false;
        return out;
    }
    if specials.caps_lock.contains(&code) {
        state.modifiers.caps_lock = !state.modifiers.caps_lock;
        if state.advanced_features {
            let bit = if state.modifiers.caps_lock { 0x80 } else { 0x00 };
            out.frames.push(twinax_wire::encode_command(
                op::WRITE_CONTROL_DATA_INDICATORS,
                station,
                &[bit],
            ));
        } else {
            state.indicator_byte.set(IndicatorByte::from_bits_retain(0x20), state.modifiers.caps_lock);
            out.frames.push(twinax_wire::encode_command(
                op::WRITE_DATA_LOAD_CURSOR_INDICATORS,
                station,
                &[state.indicator_byte.bits()],
            ));
        }
        return out;
    }

    let Some(entry) = dict.keys.get(&code) else {
        // unknown scancode: drop, but still consume any armed extra flag
        state.modifiers.take_extra();
        return out;
    };

    let slot = state.modifiers.slot();
    // `extra` is one-shot: any key consumes it, but it only takes effect
    // below caps/shift/ctrl/alt in the slot precedence — a held modifier
    // wins and the armed flag is simply dropped.
    let extra_was_armed = state.modifiers.take_extra();
    if slot == KeySlot::Normal && extra_was_armed {
        if let Some(suffix) = &entry.extra_suffix {
            out.pty_bytes.push(0x1B);
            out.pty_bytes.extend_from_slice(suffix.as_bytes());
        }
        return out;
    }

    if slot == KeySlot::Alt && entry.normal == "s" {
        state.status_byte.toggle(StatusByte::DISABLE_CLICKER);
        out.frames.push(twinax_wire::encode_command(
            op::WRITE_CONTROL_DATA,
            station,
            &[state.status_byte.bits()],
        ));
        return out;
    }

    let chosen = match slot {
        KeySlot::Shift => &entry.shift,
        KeySlot::Ctrl => &entry.ctrl,
        KeySlot::Alt => &entry.alt,
        KeySlot::Normal => &entry.normal,
    };
    out.pty_bytes.extend_from_slice(chosen.as_bytes());
    if chosen.as_bytes() == [0x1B] {
        if let Some(suffix) = &entry.esc_suffix {
            out.pty_bytes.extend_from_slice(suffix.as_bytes());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{KeyEntry, SpecialGroups};
    use pretty_assertions::assert_eq;

    fn basic_dict() -> ScancodeDictionary {
        ScancodeDictionary::builder("test")
            .specials(SpecialGroups {
                extra: [0x90].into_iter().collect(),
                ctrl_press: [0x1D].into_iter().collect(),
                ..Default::default()
            })
            .key(0x1E, KeyEntry::normal("a").with_shift("A").with_alt("\u{1b}"))
            .key(
                0x48,
                KeyEntry::normal("\u{1b}").with_esc_suffix("A"),
            )
            .key(0x20, KeyEntry::normal("d").with_extra_suffix("X"))
            .build()
    }

    #[test]
    fn plain_key_emits_normal_slot() {
        let dict = basic_dict();
        let mut modifiers = ModifierState::default();
        let mut indicator_byte = IndicatorByte::empty();
        let mut status_byte = StatusByte::empty();
        let mut state = KeyboardState {
            modifiers: &mut modifiers,
            indicator_byte: &mut indicator_byte,
            status_byte: &mut status_byte,
            advanced_features: false,
        };
        let outcome = process(&dict, &mut state, 0, 0x1E);
        assert_eq!(outcome.pty_bytes, b"a");
    }

    #[test]
    fn extra_group_arms_one_shot_flag_and_consumes_next_key() {
        let dict = basic_dict();
        let mut modifiers = ModifierState::default();
        let mut indicator_byte = IndicatorByte::empty();
        let mut status_byte = StatusByte::empty();
        let mut state = KeyboardState {
            modifiers: &mut modifiers,
            indicator_byte: &mut indicator_byte,
            status_byte: &mut status_byte,
            advanced_features: false,
        };
        let armed = process(&dict, &mut state, 0, 0x90);
        assert!(armed.pty_bytes.is_empty());
        let outcome = process(&dict, &mut state, 0, 0x20);
        assert_eq!(outcome.pty_bytes, b"\x1bX");
        assert!(!state.modifiers.extra_armed());
    }

    #[test]
    fn extra_does_not_override_a_held_shift_slot() {
        let dict = basic_dict();
        let mut modifiers = ModifierState::default();
        let mut indicator_byte = IndicatorByte::empty();
        let mut status_byte = StatusByte::empty();
        let mut state = KeyboardState {
            modifiers: &mut modifiers,
            indicator_byte: &mut indicator_byte,
            status_byte: &mut status_byte,
            advanced_features: false,
        };
        process(&dict, &mut state, 0, 0x90); // arm extra
        state.modifiers.shift = true;
        let outcome = process(&dict, &mut state, 0, 0x1E); // key 'a', shift slot is "A"
        assert_eq!(outcome.pty_bytes, b"A");
        assert!(!state.modifiers.extra_armed());
    }

    #[test]
    fn esc_slot_appends_suffix() {
        let dict = basic_dict();
        let mut modifiers = ModifierState::default();
        let mut indicator_byte = IndicatorByte::empty();
        let mut status_byte = StatusByte::empty();
        let mut state = KeyboardState {
            modifiers: &mut modifiers,
            indicator_byte: &mut indicator_byte,
            status_byte: &mut status_byte,
            advanced_features: false,
        };
        let outcome = process(&dict, &mut state, 0, 0x48);
        assert_eq!(outcome.pty_bytes, b"\x1bA");
    }

    #[test]
    fn ctrl_press_toggles_when_no_release_group() {
        let dict = basic_dict();
        let mut modifiers = ModifierState::default();
        let mut indicator_byte = IndicatorByte::empty();
        let mut status_byte = StatusByte::empty();
        let mut state = KeyboardState {
            modifiers: &mut modifiers,
            indicator_byte: &mut indicator_byte,
            status_byte: &mut status_byte,
            advanced_features: false,
        };
        process(&dict, &mut state, 0, 0x1D);
        assert!(state.modifiers.ctrl);
        process(&dict, &mut state, 0, 0x1D);
        assert!(!state.modifiers.ctrl);
    }
}
