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

//! Named opcodes and status-byte bit flags for the twinax command set.
//!
//! Values are taken from the external interface table; nothing here is
//! inferred or renumbered.

/// Display controller command opcodes (the 7-bit `C` value in [`crate::codec::encode_command`]).
pub mod op {
    pub const RESET: u8 = 0x02;
    pub const WRITE_CONTROL_DATA: u8 = 0x05;
    pub const MOVE_DATA: u8 = 0x06;
    pub const LOAD_REFERENCE_COUNTER: u8 = 0x07;
    pub const POLL: u8 = 0x10;
    pub const WRITE_DATA_LOAD_CURSOR: u8 = 0x11;
    pub const CLEAR: u8 = 0x12;
    pub const SET_MODE: u8 = 0x13;
    pub const LOAD_ADDRESS_COUNTER: u8 = 0x15;
    pub const LOAD_CURSOR_REGISTER: u8 = 0x17;
    pub const ACK: u8 = 0x30;
    pub const WRITE_CONTROL_DATA_INDICATORS: u8 = 0x45;
    pub const WRITE_DATA_LOAD_CURSOR_INDICATORS: u8 = 0x51;
    pub const EOQ: u8 = 0x62;
}

bitflags::bitflags! {
    /// Control-data status byte, written with [`op::WRITE_CONTROL_DATA`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StatusByte: u8 {
        const BELL              = 0x01;
        const DISABLE_CLICKER   = 0x02;
        const RESET_EXCEPTION   = 0x04;
        const REVERSE           = 0x08;
        const TEXT_BLINK        = 0x10;
        const BLINK             = 0x20;
        /// Undocumented in the source material; never set or read by this build.
        const UNKNOWN_0X40      = 0x40;
        const HIDE_CURSOR       = 0x80;
    }
}

bitflags::bitflags! {
    /// Indicator lamp byte, written with [`op::WRITE_CONTROL_DATA_INDICATORS`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct IndicatorByte: u8 {
        const INSERT   = 0x01;
        const MESSAGE  = 0x02;
        const SYSTEM   = 0x04;
        const KEYBOARD = 0x08;
    }
}
