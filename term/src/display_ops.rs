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

//! The five display-controller primitives the VT52 translator composes,
//! plus the EOQ boundary marker, rendered to wire frames.

use twinax_wire::opcodes::op;

/// A position expressed as the 16-bit row-major offset `row * 80 + col`.
pub type Position = u16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    LoadAddressCounter(Position),
    LoadReferenceCounter(Position),
    LoadCursorRegister(Position),
    /// Clears the interval `[address, reference]` previously loaded.
    Clear,
    /// Copies data within the interval previously loaded.
    MoveData,
    /// Writes one chunk (at most ten bytes) and moves the cursor.
    WriteDataLoadCursor(Vec<u8>),
    /// Marks the end of a logically related group of primitives; also a
    /// queue boundary for back-pressure.
    Eoq,
}

fn position_bytes(pos: Position) -> [u8; 2] {
    [(pos >> 8) as u8, (pos & 0xFF) as u8]
}

/// Renders one [`DisplayOp`] to its outbound wire frame for `station`.
pub fn render(op: &DisplayOp, station: u8) -> Vec<u8> {
    match op {
        DisplayOp::LoadAddressCounter(pos) => {
            twinax_wire::encode_command(op::LOAD_ADDRESS_COUNTER, station, &position_bytes(*pos))
        }
        DisplayOp::LoadReferenceCounter(pos) => twinax_wire::encode_command(
            op::LOAD_REFERENCE_COUNTER,
            station,
            &position_bytes(*pos),
        ),
        DisplayOp::LoadCursorRegister(pos) => {
            twinax_wire::encode_command(op::LOAD_CURSOR_REGISTER, station, &position_bytes(*pos))
        }
        DisplayOp::Clear => twinax_wire::encode_command(op::CLEAR, station, &[]),
        DisplayOp::MoveData => twinax_wire::encode_command(op::MOVE_DATA, station, &[]),
        DisplayOp::WriteDataLoadCursor(data) => {
            // The payload always leads with a length byte: the controller's
            // write command is variable-length and the display firmware
            // needs to know where the chunk ends.
            let mut payload = Vec::with_capacity(data.len() + 1);
            payload.push(data.len() as u8);
            payload.extend_from_slice(data);
            twinax_wire::encode_command(op::WRITE_DATA_LOAD_CURSOR, station, &payload)
        }
        DisplayOp::Eoq => twinax_wire::encode_command(op::EOQ, station, &[]),
    }
}

/// Renders a whole group of ops to their wire frames, in order.
pub fn render_all(ops: &[DisplayOp], station: u8) -> Vec<Vec<u8>> {
    ops.iter().map(|op| render(op, station)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clear_then_eoq_produces_two_frames() {
        let frames = render_all(&[DisplayOp::Clear, DisplayOp::Eoq], 0);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], vec![0x52, 0x40, 0x0A]);
    }

    #[test]
    fn position_splits_into_two_bytes() {
        assert_eq!(position_bytes(1919), [0x07, 0x7F]);
    }
}
